//! Record lifecycle state manager
//!
//! Three-state (active/archived/deleted) soft-delete semantics over two
//! timestamp columns. Queries against a stateful model carry a
//! soft-delete global scope; every state scope removes it first so
//! archived and deleted rows stay reachable on request.

pub mod scope;

use std::fmt;

use chrono::{DateTime, Utc};

use crate::core::{Result, Value};
use crate::model::Model;
use crate::query::QueryBuilder;

pub use scope::{SOFT_DELETE_SCOPE, apply_soft_delete_scope, remove_soft_delete_scope};

/// Lifecycle state of a record. Deletion wins over archival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelState {
    #[default]
    Active,
    Archived,
    Deleted,
}

impl ModelState {
    /// Wire code used by search forms and route parameters.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Active => "0",
            Self::Archived => "1",
            Self::Deleted => "2",
        }
    }

    /// Decode a wire code. Unknown codes fall back to Active.
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "1" => Self::Archived,
            "2" => Self::Deleted,
            _ => Self::Active,
        }
    }
}

impl fmt::Display for ModelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Archived => write!(f, "archived"),
            Self::Deleted => write!(f, "deleted"),
        }
    }
}

/// Soft-delete/archive behavior for a model.
pub trait Stateful: Model {
    /// Column holding the archival timestamp.
    const ARCHIVED_AT: &'static str = "archived_at";
    /// Column holding the soft-deletion timestamp.
    const DELETED_AT: &'static str = "deleted_at";

    /// Query over this model's table with the soft-delete scope installed.
    fn scoped_query() -> QueryBuilder
    where
        Self: Sized,
    {
        apply_soft_delete_scope(Self::query(), Self::DELETED_AT)
    }

    /// Scope a query to one lifecycle state by wire code semantics.
    fn scope_mode(query: QueryBuilder, mode: ModelState) -> QueryBuilder {
        match mode {
            ModelState::Archived => Self::scope_archived(query, true),
            ModelState::Deleted => Self::scope_deleted(query, true),
            ModelState::Active => Self::scope_active(query, true),
        }
    }

    /// Scope to active records (`true`), or to archived ones (`false`).
    fn scope_active(query: QueryBuilder, active: bool) -> QueryBuilder {
        Self::scope_archived(query, !active)
    }

    /// Scope to not-deleted records that are archived (`true`) or not
    /// (`false`).
    fn scope_archived(query: QueryBuilder, archived: bool) -> QueryBuilder {
        let query = remove_soft_delete_scope(query).where_null(Self::DELETED_AT);
        if archived {
            query.where_not_null(Self::ARCHIVED_AT)
        } else {
            query.where_null(Self::ARCHIVED_AT)
        }
    }

    /// Scope to deleted (`true`) or not-deleted (`false`) records.
    fn scope_deleted(query: QueryBuilder, deleted: bool) -> QueryBuilder {
        let query = remove_soft_delete_scope(query);
        if deleted {
            query.where_not_null(Self::DELETED_AT)
        } else {
            query.where_null(Self::DELETED_AT)
        }
    }

    /// Current state computed from the timestamp attributes.
    fn state(&self) -> ModelState {
        let is_set = |column: &str| {
            self.attribute(column)
                .map(|v| !v.is_null())
                .unwrap_or(false)
        };

        if is_set(Self::DELETED_AT) {
            ModelState::Deleted
        } else if is_set(Self::ARCHIVED_AT) {
            ModelState::Archived
        } else {
            ModelState::Active
        }
    }

    fn archive(&mut self) -> Result<()> {
        self.archive_at(Utc::now())
    }

    fn archive_at(&mut self, at: DateTime<Utc>) -> Result<()> {
        self.set_attribute(Self::ARCHIVED_AT, Value::Timestamp(at))
    }

    fn unarchive(&mut self) -> Result<()> {
        self.set_attribute(Self::ARCHIVED_AT, Value::Null)
    }

    fn trash(&mut self) -> Result<()> {
        self.trash_at(Utc::now())
    }

    fn trash_at(&mut self, at: DateTime<Utc>) -> Result<()> {
        self.set_attribute(Self::DELETED_AT, Value::Timestamp(at))
    }

    fn restore(&mut self) -> Result<()> {
        self.set_attribute(Self::DELETED_AT, Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FromValue, ModelError};

    #[derive(Default)]
    struct Task {
        archived_at: Option<DateTime<Utc>>,
        deleted_at: Option<DateTime<Utc>>,
    }

    impl Model for Task {
        fn table() -> &'static str {
            "tasks"
        }

        fn attribute_names() -> &'static [&'static str] {
            &["archived_at", "deleted_at"]
        }

        fn attribute(&self, name: &str) -> Option<Value> {
            match name {
                "archived_at" => Some(Value::from(self.archived_at)),
                "deleted_at" => Some(Value::from(self.deleted_at)),
                _ => None,
            }
        }

        fn set_attribute(&mut self, name: &str, value: Value) -> Result<()> {
            match name {
                "archived_at" => self.archived_at = FromValue::from_value(value)?,
                "deleted_at" => self.deleted_at = FromValue::from_value(value)?,
                other => return Err(ModelError::UnknownAttribute(other.to_string())),
            }
            Ok(())
        }
    }

    impl Stateful for Task {}

    #[test]
    fn test_code_round_trip() {
        assert_eq!(ModelState::from_code("0"), ModelState::Active);
        assert_eq!(ModelState::from_code("1"), ModelState::Archived);
        assert_eq!(ModelState::from_code("2"), ModelState::Deleted);
        assert_eq!(ModelState::from_code("9"), ModelState::Active);
        assert_eq!(ModelState::Archived.code(), "1");
    }

    #[test]
    fn test_scope_archived() {
        let sql = Task::scope_archived(Task::scoped_query(), true).to_sql();
        assert_eq!(
            sql,
            "SELECT * FROM \"tasks\" WHERE \"deleted_at\" IS NULL AND \"archived_at\" IS NOT NULL"
        );
    }

    #[test]
    fn test_scope_active_is_not_archived() {
        let sql = Task::scope_active(Task::scoped_query(), true).to_sql();
        assert_eq!(
            sql,
            "SELECT * FROM \"tasks\" WHERE \"deleted_at\" IS NULL AND \"archived_at\" IS NULL"
        );
    }

    #[test]
    fn test_scope_deleted_sees_trashed_rows() {
        let sql = Task::scope_deleted(Task::scoped_query(), true).to_sql();
        assert_eq!(
            sql,
            "SELECT * FROM \"tasks\" WHERE \"deleted_at\" IS NOT NULL"
        );
    }

    #[test]
    fn test_scope_mode_dispatch() {
        let deleted = Task::scope_mode(Task::scoped_query(), ModelState::Deleted).to_sql();
        assert!(deleted.contains("\"deleted_at\" IS NOT NULL"));

        let active = Task::scope_mode(Task::scoped_query(), ModelState::Active).to_sql();
        assert!(active.contains("\"archived_at\" IS NULL"));
    }

    #[test]
    fn test_state_transitions() {
        let mut task = Task::default();
        assert_eq!(task.state(), ModelState::Active);

        task.archive().unwrap();
        assert_eq!(task.state(), ModelState::Archived);

        // Deletion wins over archival
        task.trash().unwrap();
        assert_eq!(task.state(), ModelState::Deleted);

        task.restore().unwrap();
        assert_eq!(task.state(), ModelState::Archived);

        task.unarchive().unwrap();
        assert_eq!(task.state(), ModelState::Active);
    }
}
