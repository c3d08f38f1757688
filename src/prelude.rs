//! One-line import for the behavior traits.
//!
//! ```
//! use modelkit::prelude::*;
//! ```

pub use crate::filter::Filterable;
pub use crate::model::{Model, Persist};
pub use crate::order::Orderable;
pub use crate::state::Stateful;
pub use crate::uuid_column::UuidColumns;
pub use crate::validate::Validates;
