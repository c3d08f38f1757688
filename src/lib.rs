// ============================================================================
// modelkit Library
// ============================================================================

//! Reusable behavior mixins for SQL-backed active-record models.
//!
//! Five independent behaviors layered over a small [`Model`] trait:
//! declarative attribute filtering, three-state soft-delete lifecycle,
//! input validation with casting, order-by resolution, and a packed
//! UUID column codec. Every query operation receives and returns a
//! [`QueryBuilder`]; executing the rendered SQL is the host's job.
//!
//! # Examples
//!
//! ```
//! use modelkit::prelude::*;
//! use modelkit::{FilterDef, FilterSet, SearchRequest};
//!
//! #[derive(modelkit::Model, Default)]
//! #[model(table = "users")]
//! struct User {
//!     id: Option<i64>,
//!     name: String,
//!     age: Option<i64>,
//! }
//!
//! impl Filterable for User {
//!     fn attribute_filters() -> FilterSet {
//!         FilterSet::new()
//!             .with("name", FilterDef::string("Name", "name"))
//!             .with("age", FilterDef::number("Age", "age"))
//!     }
//! }
//!
//! # fn main() -> Result<(), modelkit::ModelError> {
//! let search = SearchRequest::new()
//!     .with("name", "ali", Some("*=*"))
//!     .with("age", "18", Some(">="));
//!
//! let query = User::apply_attribute_filters(User::query(), &search)?;
//! assert_eq!(
//!     query.to_sql(),
//!     "SELECT * FROM \"users\" WHERE \"name\" LIKE '%ali%' AND \"age\" >= 18"
//! );
//! # Ok(())
//! # }
//! ```

// The derive generates `::modelkit::..` paths; make them resolve inside
// this crate as well.
extern crate self as modelkit;

pub mod core;
pub mod events;
pub mod filter;
pub mod model;
pub mod order;
pub mod prelude;
pub mod query;
pub mod state;
pub mod uuid_column;
pub mod validate;

// Re-export main types for convenience
pub use crate::core::{FromValue, ModelError, Result, Value};
pub use crate::events::{EventHooks, ModelEvent};
pub use crate::filter::{
    FilterDef, FilterKind, FilterOperator, FilterSet, Filterable, SearchRequest,
};
pub use crate::model::{AttributeMap, Model, Persist};
pub use crate::order::Orderable;
pub use crate::query::{BinaryOp, Direction, Expr, GlobalScope, OrderByExpr, QueryBuilder};
pub use crate::state::{ModelState, Stateful};
pub use crate::uuid_column::UuidColumns;
pub use crate::validate::{
    AttributeRules, JsonMap, RuleSpec, SaveOptions, SaveOutcome, SaveStatus, Validates,
    ValidationErrors, ValidationFailure, save_with_feedback,
};

// Derive macro for the Model trait
pub use modelkit_derive::Model;
