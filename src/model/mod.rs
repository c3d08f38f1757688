//! Active-record abstraction the behavior mixins are expressed against.
//!
//! A [`Model`] is one persisted row: named attributes with typed values,
//! a table name and a primary key. Persistence itself stays with the
//! host through the one-method [`Persist`] trait.

use std::collections::BTreeMap;

use crate::core::{Result, Value};
use crate::query::QueryBuilder;

/// Named attribute values, ordered for deterministic iteration.
pub type AttributeMap = BTreeMap<String, Value>;

pub trait Model {
    /// Table backing this model.
    fn table() -> &'static str;

    /// Primary key column.
    fn primary_key() -> &'static str {
        "id"
    }

    /// Declared attribute names, in field order.
    fn attribute_names() -> &'static [&'static str];

    /// Read one attribute. `None` for undeclared names.
    fn attribute(&self, name: &str) -> Option<Value>;

    /// Write one attribute, converting out of [`Value`].
    fn set_attribute(&mut self, name: &str, value: Value) -> Result<()>;

    /// Whether this record is already persisted. Defaults to "the
    /// primary-key attribute is present and non-null"; hosts tracking
    /// persistence another way override this.
    fn exists(&self) -> bool {
        self.attribute(Self::primary_key())
            .map(|v| !v.is_null())
            .unwrap_or(false)
    }

    /// Fresh query builder over this model's table.
    fn query() -> QueryBuilder
    where
        Self: Sized,
    {
        QueryBuilder::new(Self::table())
    }

    /// Bulk-assign attributes. Stops at the first conversion error.
    fn fill(&mut self, attributes: AttributeMap) -> Result<()> {
        for (name, value) in attributes {
            self.set_attribute(&name, value)?;
        }
        Ok(())
    }

    /// Snapshot of all declared attributes.
    fn attributes(&self) -> AttributeMap {
        Self::attribute_names()
            .iter()
            .filter_map(|name| self.attribute(name).map(|v| (name.to_string(), v)))
            .collect()
    }
}

/// Host-supplied persistence. The mixins orchestrate around it but
/// never implement it; storage is out of scope for this crate.
pub trait Persist {
    fn save(&mut self) -> Result<()>;
}
