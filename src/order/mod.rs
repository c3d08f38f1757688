//! Order-by helper
//!
//! Resolves a requested or default sort column and direction onto the
//! query. A column written as `relation.column` (one level) resolves to
//! a qualified identifier; both segments are validated before rendering.

use crate::core::{ModelError, Result};
use crate::model::Model;
use crate::query::{Direction, Expr, OrderByExpr, QueryBuilder, validate_identifier};

/// Standard ordering behavior for a model.
pub trait Orderable: Model {
    /// Column used when the caller does not name one.
    fn default_order_column() -> Option<&'static str> {
        None
    }

    /// Direction used when the caller does not name one.
    fn default_order_direction() -> Option<Direction> {
        None
    }

    /// Order the query by the requested column/direction, falling back
    /// to the model defaults. With no column at all the query is
    /// returned unchanged.
    fn scope_order(
        query: QueryBuilder,
        column: Option<&str>,
        direction: Option<Direction>,
    ) -> Result<QueryBuilder>
    where
        Self: Sized,
    {
        let column = match column.filter(|c| !c.is_empty()) {
            Some(column) => Some(column),
            None => Self::default_order_column(),
        };

        let Some(column) = column else {
            return Ok(query);
        };

        let direction = direction
            .or_else(Self::default_order_direction)
            .unwrap_or_default();

        Ok(query.order_by(OrderByExpr {
            expr: resolve_order_column(column)?,
            direction,
        }))
    }
}

/// Resolve a plain or one-level relation-qualified column reference.
pub fn resolve_order_column(column: &str) -> Result<Expr> {
    let segments: Vec<&str> = column.split('.').collect();

    match segments.as_slice() {
        [plain] => {
            validate_identifier(plain)?;
            Ok(Expr::Column(plain.to_string()))
        }
        [relation, attribute] => {
            validate_identifier(relation)?;
            validate_identifier(attribute)?;
            Ok(Expr::Qualified(vec![
                relation.to_string(),
                attribute.to_string(),
            ]))
        }
        _ => Err(ModelError::InvalidIdentifier(format!(
            "Order column '{}' may qualify at most one relation",
            column
        ))),
    }
}
