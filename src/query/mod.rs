pub mod builder;
pub mod expr;
pub mod ident;

pub use builder::{GlobalScope, QueryBuilder};
pub use expr::{BinaryOp, Direction, Expr, OrderByExpr};
pub use ident::{quote_ident, validate_identifier};
