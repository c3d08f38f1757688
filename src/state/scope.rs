use crate::query::{Expr, QueryBuilder};

/// Name of the soft-delete global scope installed on stateful queries.
pub const SOFT_DELETE_SCOPE: &str = "soft_delete";

/// Install the soft-delete scope: rows with a deletion timestamp are
/// hidden from every query until the scope is removed.
pub fn apply_soft_delete_scope(query: QueryBuilder, deleted_column: &str) -> QueryBuilder {
    query.with_global_scope(
        SOFT_DELETE_SCOPE,
        Expr::is_null(Expr::column(deleted_column), false),
    )
}

/// Remove the soft-delete scope so state scopes can see every row.
pub fn remove_soft_delete_scope(query: QueryBuilder) -> QueryBuilder {
    query.without_global_scope(SOFT_DELETE_SCOPE)
}
