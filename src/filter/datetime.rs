use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use log::debug;

use super::{FilterDef, FilterKind, FilterRule, apply_to_attributes};
use crate::core::{Result, Value};
use crate::filter::ops::FilterOperator;
use crate::query::{Expr, QueryBuilder};

/// Ordered and equality comparisons over timestamp/date attributes.
pub struct DateTimeFilterRule;

impl FilterRule for DateTimeFilterRule {
    fn name(&self) -> &'static str {
        "DATETIME"
    }

    fn can_apply(&self, kind: &FilterKind) -> bool {
        matches!(kind, FilterKind::DateTime)
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
                "Skipping filter '{}': operator '{}' not valid for datetime filters",
                def.label, op
            );
            return Ok(query);
        };

        let Some(moment) = parse_datetime(value) else {
            debug!(
                "Skipping filter '{}': value '{}' is not a datetime",
                def.label, value
            );
            return Ok(query);
        };

        Ok(apply_to_attributes(query, def, op.negated(), |attr| {
            Expr::binary(Expr::column(attr), binary, Expr::Literal(moment.clone()))
        }))
    }
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` (treated as UTC), or a bare
/// `YYYY-MM-DD` date.
fn parse_datetime(value: &str) -> Option<Value> {
    let trimmed = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(Value::Timestamp(dt.with_timezone(&Utc)));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(Value::Timestamp(naive.and_utc()));
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(Value::Date(date));
    }

    None
}
