use log::debug;

use super::{FilterDef, FilterKind, FilterRule, apply_to_attributes};
use crate::core::Result;
use crate::filter::ops::FilterOperator;
use crate::query::{BinaryOp, Expr, QueryBuilder};

/// Equality and LIKE-family predicates over text attributes.
pub struct StringFilterRule;

impl FilterRule for StringFilterRule {
    fn name(&self) -> &'static str {
        "STRING"
    }

    fn can_apply(&self, kind: &FilterKind) -> bool {
        matches!(kind, FilterKind::String)
    }

    fn apply(
        &self,
        query: QueryBuilder,
        def: &FilterDef,
        value: &str,
        op: FilterOperator,
    ) -> Result<QueryBuilder> {
        if op.is_equality() {
            let binary = if op.negated() {
                BinaryOp::NotEq
            } else {
                BinaryOp::Eq
            };
            return Ok(apply_to_attributes(query, def, op.negated(), |attr| {
                Expr::binary(Expr::column(attr), binary, Expr::literal(value))
            }));
        }

        if let Some(pattern) = op.like_pattern(value) {
            let negated = op.negated();
            return Ok(apply_to_attributes(query, def, negated, |attr| Expr::Like {
                expr: Box::new(Expr::column(attr)),
                pattern: Box::new(Expr::literal(pattern.clone())),
                negated,
                case_insensitive: false,
            }));
        }

        // Ordered comparisons are not defined for string filters
        debug!(
            "Skipping filter '{}': operator '{}' not valid for string filters",
            def.label, op
        );
        Ok(query)
    }
}
