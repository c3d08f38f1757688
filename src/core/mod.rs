pub mod error;
pub mod value;

pub use error::{ModelError, Result};
pub use value::{FromValue, Value, escape_sql_string};
