use crate::query::expr::{Expr, OrderByExpr};
use crate::query::ident::quote_ident;

/// A named predicate automatically applied to every rendered query
/// unless explicitly removed (see the crate glossary: "global scope").
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalScope {
    pub name: String,
    pub expr: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conjunction {
    And,
    Or,
}

/// Fluent SELECT builder the mixins receive and return.
///
/// Mirrors the surface a host ORM's query builder exposes to model
/// scopes: conjunct/disjunct predicates, nested groups, global scopes,
/// ordering and paging. Rendering happens in [`QueryBuilder::to_sql`];
/// execution is the host's business.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    table: String,
    projection: Vec<String>,
    wheres: Vec<(Conjunction, Expr)>,
    global_scopes: Vec<GlobalScope>,
    removed_scopes: Vec<String>,
    order_by: Vec<OrderByExpr>,
    limit: Option<usize>,
    offset: Option<usize>,
}

impl QueryBuilder {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            projection: Vec::new(),
            wheres: Vec::new(),
            global_scopes: Vec::new(),
            removed_scopes: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn select(mut self, columns: Vec<String>) -> Self {
        self.projection = columns;
        self
    }

    /// Add a predicate joined with AND.
    pub fn where_expr(mut self, expr: Expr) -> Self {
        self.wheres.push((Conjunction::And, expr));
        self
    }

    /// Add a predicate joined with OR.
    pub fn or_where_expr(mut self, expr: Expr) -> Self {
        self.wheres.push((Conjunction::Or, expr));
        self
    }

    pub fn where_null(self, column: impl Into<String>) -> Self {
        let expr = Expr::is_null(Expr::Column(column.into()), false);
        self.where_expr(expr)
    }

    pub fn where_not_null(self, column: impl Into<String>) -> Self {
        let expr = Expr::is_null(Expr::Column(column.into()), true);
        self.where_expr(expr)
    }

    pub fn where_raw(self, sql: impl Into<String>) -> Self {
        self.where_expr(Expr::Raw(sql.into()))
    }

    /// Add a parenthesized sub-group built by the closure, joined with AND.
    ///
    /// The closure receives a fresh builder for the same table; only its
    /// where-clauses are kept.
    pub fn where_group<F>(mut self, build: F) -> Self
    where
        F: FnOnce(QueryBuilder) -> QueryBuilder,
    {
        let sub = build(QueryBuilder::new(self.table.clone()));
        if let Some(expr) = sub.collapse_wheres() {
            self.wheres
                .push((Conjunction::And, Expr::Nested(Box::new(expr))));
        }
        self
    }

    pub fn with_global_scope(mut self, name: impl Into<String>, expr: Expr) -> Self {
        let name = name.into();
        if !self.global_scopes.iter().any(|s| s.name == name) {
            self.global_scopes.push(GlobalScope { name, expr });
        }
        self
    }

    /// Remove a global scope by name for this query.
    pub fn without_global_scope(mut self, name: &str) -> Self {
        if !self.removed_scopes.iter().any(|n| n == name) {
            self.removed_scopes.push(name.to_string());
        }
        self
    }

    pub fn has_global_scope(&self, name: &str) -> bool {
        self.global_scopes.iter().any(|s| s.name == name)
            && !self.removed_scopes.iter().any(|n| n == name)
    }

    pub fn order_by(mut self, order: OrderByExpr) -> Self {
        self.order_by.push(order);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn is_filtered(&self) -> bool {
        !self.wheres.is_empty()
    }

    /// Fold the builder's own where-clauses into a single expression,
    /// respecting AND/OR placement. `None` when no clauses were added.
    fn collapse_wheres(&self) -> Option<Expr> {
        let mut iter = self.wheres.iter();
        let (_, first) = iter.next()?;
        let mut acc = first.clone();
        for (conj, expr) in iter {
            let op = match conj {
                Conjunction::And => crate::query::expr::BinaryOp::And,
                Conjunction::Or => crate::query::expr::BinaryOp::Or,
            };
            acc = Expr::binary(acc, op, expr.clone());
        }
        Some(acc)
    }

    fn effective_scopes(&self) -> Vec<&GlobalScope> {
        self.global_scopes
            .iter()
            .filter(|s| !self.removed_scopes.iter().any(|n| *n == s.name))
            .collect()
    }

    /// Render the complete SELECT statement.
    pub fn to_sql(&self) -> String {
        let projection = if self.projection.is_empty() {
            "*".to_string()
        } else {
            let cols: Vec<String> = self.projection.iter().map(|c| quote_ident(c)).collect();
            cols.join(", ")
        };

        let mut sql = format!("SELECT {} FROM {}", projection, quote_ident(&self.table));

        let mut predicates: Vec<String> = self
            .effective_scopes()
            .iter()
            .map(|s| s.expr.to_string())
            .collect();
        if let Some(own) = self.collapse_wheres() {
            predicates.push(own.to_string());
        }
        if !predicates.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&predicates.join(" AND "));
        }

        if !self.order_by.is_empty() {
            let orders: Vec<String> = self.order_by.iter().map(|o| o.to_string()).collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&orders.join(", "));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {}", offset));
        }

        sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Value;
    use crate::query::expr::{BinaryOp, Direction};

    fn eq(column: &str, value: impl Into<Value>) -> Expr {
        Expr::binary(Expr::column(column), BinaryOp::Eq, Expr::literal(value))
    }

    #[test]
    fn test_bare_select() {
        let sql = QueryBuilder::new("users").to_sql();
        assert_eq!(sql, "SELECT * FROM \"users\"");
    }

    #[test]
    fn test_where_and_or() {
        let sql = QueryBuilder::new("users")
            .where_expr(eq("name", "Alice"))
            .or_where_expr(eq("name", "Bob"))
            .to_sql();
        assert_eq!(
            sql,
            "SELECT * FROM \"users\" WHERE \"name\" = 'Alice' OR \"name\" = 'Bob'"
        );
    }

    #[test]
    fn test_where_group() {
        let sql = QueryBuilder::new("users")
            .where_expr(eq("active", true))
            .where_group(|g| g.where_expr(eq("role", "admin")).or_where_expr(eq("role", "owner")))
            .to_sql();
        assert_eq!(
            sql,
            "SELECT * FROM \"users\" WHERE \"active\" = true AND (\"role\" = 'admin' OR \"role\" = 'owner')"
        );
    }

    #[test]
    fn test_empty_group_is_dropped() {
        let sql = QueryBuilder::new("users").where_group(|g| g).to_sql();
        assert_eq!(sql, "SELECT * FROM \"users\"");
    }

    #[test]
    fn test_global_scope_applies_and_removes() {
        let scoped = QueryBuilder::new("users").with_global_scope(
            "soft_delete",
            Expr::is_null(Expr::column("deleted_at"), false),
        );
        assert!(scoped.has_global_scope("soft_delete"));
        assert_eq!(
            scoped.clone().to_sql(),
            "SELECT * FROM \"users\" WHERE \"deleted_at\" IS NULL"
        );

        let unscoped = scoped.without_global_scope("soft_delete");
        assert!(!unscoped.has_global_scope("soft_delete"));
        assert_eq!(unscoped.to_sql(), "SELECT * FROM \"users\"");
    }

    #[test]
    fn test_order_limit_offset() {
        let sql = QueryBuilder::new("users")
            .order_by(OrderByExpr {
                expr: Expr::column("created_at"),
                direction: Direction::Desc,
            })
            .limit(10)
            .offset(20)
            .to_sql();
        assert_eq!(
            sql,
            "SELECT * FROM \"users\" ORDER BY \"created_at\" DESC LIMIT 10 OFFSET 20"
        );
    }

    #[test]
    fn test_projection() {
        let sql = QueryBuilder::new("users")
            .select(vec!["id".to_string(), "name".to_string()])
            .to_sql();
        assert_eq!(sql, "SELECT \"id\", \"name\" FROM \"users\"");
    }
}
