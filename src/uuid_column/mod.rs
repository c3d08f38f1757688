//! UUID binary-column codec
//!
//! Some schemas pack UUIDs into 16-byte binary columns. This mixin
//! decodes those columns to canonical hyphenated text, encodes text
//! back to the packed form, and builds `"col" IN (UNHEX('..'), ..)`
//! predicates for lookups against the packed representation.

use uuid::Uuid;

use crate::core::{ModelError, Result, Value};
use crate::model::Model;
use crate::query::{Expr, QueryBuilder, quote_ident, validate_identifier};

/// Decode a packed 16-byte column value.
pub fn decode_binary(bytes: &[u8]) -> Result<Uuid> {
    Uuid::from_slice(bytes).map_err(|_| {
        ModelError::InvalidUuid(format!(
            "Packed UUID must be 16 bytes, got {}",
            bytes.len()
        ))
    })
}

/// Encode canonical (or bare 32-hex) text into the packed form.
pub fn encode_binary(text: &str) -> Result<[u8; 16]> {
    let parsed = Uuid::parse_str(text.trim())
        .map_err(|e| ModelError::InvalidUuid(format!("'{}': {}", text, e)))?;
    Ok(parsed.into_bytes())
}

/// Build the `IN (UNHEX(..))` predicate for one or more UUIDs.
///
/// An empty list yields a never-matching predicate: an unconstrained
/// lookup is never what a caller passing zero keys meant.
pub fn unhex_predicate(column: &str, uuids: &[Uuid]) -> Result<Expr> {
    validate_identifier(column)?;

    if uuids.is_empty() {
        return Ok(Expr::Raw("1 = 0".to_string()));
    }

    let terms: Vec<String> = uuids
        .iter()
        .map(|u| format!("UNHEX('{}')", u.simple()))
        .collect();

    Ok(Expr::Raw(format!(
        "{} IN ({})",
        quote_ident(column),
        terms.join(", ")
    )))
}

/// Lookup helpers for models with packed UUID columns.
pub trait UuidColumns: Model {
    /// Columns stored in the packed binary form.
    fn uuid_columns() -> &'static [&'static str] {
        &[]
    }

    /// Read an attribute through the UUID codec. Accepts the packed
    /// bytes, canonical or bare-hex text, or an already-decoded UUID.
    fn uuid_attribute(&self, name: &str) -> Result<Option<Uuid>> {
        match self.attribute(name) {
            None => Err(ModelError::UnknownAttribute(name.to_string())),
            Some(Value::Null) => Ok(None),
            Some(Value::Uuid(u)) => Ok(Some(u)),
            Some(Value::Bytes(bytes)) => decode_binary(&bytes).map(Some),
            Some(Value::Text(text)) => Uuid::parse_str(text.trim())
                .map(Some)
                .map_err(|e| ModelError::InvalidUuid(format!("'{}': {}", text, e))),
            Some(other) => Err(ModelError::TypeMismatch(format!(
                "Attribute '{}' is {}, not a UUID column",
                name,
                other.type_name()
            ))),
        }
    }

    /// Constrain the query to one UUID key.
    fn where_uuid(query: QueryBuilder, column: &str, value: &str) -> Result<QueryBuilder> {
        Self::where_uuid_in(query, column, &[value])
    }

    /// Constrain the query to a set of UUID keys.
    fn where_uuid_in(query: QueryBuilder, column: &str, values: &[&str]) -> Result<QueryBuilder> {
        let uuids: Vec<Uuid> = values
            .iter()
            .map(|v| {
                Uuid::parse_str(v.trim())
                    .map_err(|e| ModelError::InvalidUuid(format!("'{}': {}", v, e)))
            })
            .collect::<Result<_>>()?;

        Ok(query.where_expr(unhex_predicate(column, &uuids)?))
    }
}
