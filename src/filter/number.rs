use log::debug;

use super::{FilterDef, FilterKind, FilterRule, apply_to_attributes};
use crate::core::{Result, Value};
use crate::filter::ops::FilterOperator;
use crate::query::{Expr, QueryBuilder};

/// Ordered and equality comparisons over numeric attributes.
pub struct NumberFilterRule;

impl FilterRule for NumberFilterRule {
    fn name(&self) -> &'static str {
        "NUMBER"
    }

    fn can_apply(&self, kind: &FilterKind) -> bool {
        matches!(kind, FilterKind::Number)
    }

    fn apply(
        &self,
        query: QueryBuilder,
        def: &FilterDef,
        value: &str,
        op: FilterOperator,
    ) -> Result<QueryBuilder> {
        let Some(binary) = op.comparison_op() else {
            debug!(
                "Skipping filter '{}': operator '{}' not valid for number filters",
                def.label, op
            );
            return Ok(query);
        };

        let parsed = parse_number(value);
        let Some(number) = parsed else {
            debug!(
                "Skipping filter '{}': value '{}' is not numeric",
                def.label, value
            );
            return Ok(query);
        };

        Ok(apply_to_attributes(query, def, op.negated(), |attr| {
            Expr::binary(Expr::column(attr), binary, Expr::Literal(number.clone()))
        }))
    }
}

fn parse_number(value: &str) -> Option<Value> {
    let trimmed = value.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(Value::Integer(i));
    }
    trimmed.parse::<f64>().ok().map(Value::Float)
}
