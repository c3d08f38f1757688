//! Attribute filter interpreter
//!
//! Translates a declarative map of filter definitions plus user-supplied
//! (value, operator) pairs into query predicates. Each filter kind is
//! handled by a [`FilterRule`] plugin looked up through a registry.

pub mod datetime;
pub mod number;
pub mod ops;
pub mod string;

use log::debug;

use crate::core::Result;
use crate::model::Model;
use crate::query::{Expr, QueryBuilder};

pub use ops::FilterOperator;

/// Which rule interprets a filter's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    String,
    Number,
    DateTime,
}

/// One declared filter: a display label, the attribute(s) it searches,
/// and the kind that decides which operators apply.
#[derive(Debug, Clone)]
pub struct FilterDef {
    pub label: String,
    pub attributes: Vec<String>,
    pub kind: FilterKind,
}

impl FilterDef {
    pub fn new(label: impl Into<String>, attribute: impl Into<String>, kind: FilterKind) -> Self {
        Self {
            label: label.into(),
            attributes: vec![attribute.into()],
            kind,
        }
    }

    pub fn string(label: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::new(label, attribute, FilterKind::String)
    }

    pub fn number(label: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::new(label, attribute, FilterKind::Number)
    }

    pub fn datetime(label: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::new(label, attribute, FilterKind::DateTime)
    }

    /// Add another attribute this filter searches. Positive operators
    /// match any of them, negated operators must miss all of them.
    pub fn or_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attributes.push(attribute.into());
        self
    }
}

/// Ordered filter-name -> definition map declared on a model.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    entries: Vec<(String, FilterDef)>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, def: FilterDef) -> Self {
        self.entries.push((name.into(), def));
        self
    }

    pub fn get(&self, name: &str) -> Option<&FilterDef> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, def)| def)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterDef)> {
        self.entries.iter().map(|(n, d)| (n.as_str(), d))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One user-supplied filter input: a raw value plus an optional
/// operator token (`None` falls back to the model default).
#[derive(Debug, Clone)]
pub struct FilterInput {
    pub value: String,
    pub operator: Option<String>,
}

/// User-supplied search: filter name -> list of inputs. Names with no
/// matching declared filter are ignored.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    entries: Vec<(String, Vec<FilterInput>)>,
}

impl SearchRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
        operator: Option<&str>,
    ) -> Self {
        let name = name.into();
        let input = FilterInput {
            value: value.into(),
            operator: operator.map(|s| s.to_string()),
        };
        if let Some((_, inputs)) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            inputs.push(input);
        } else {
            self.entries.push((name, vec![input]));
        }
        self
    }

    pub fn get(&self, name: &str) -> &[FilterInput] {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, inputs)| inputs.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Interprets one filter kind into query predicates.
pub trait FilterRule: Send + Sync {
    /// Name of the rule for diagnostics
    fn name(&self) -> &'static str;

    /// Can the rule handle this filter kind?
    fn can_apply(&self, kind: &FilterKind) -> bool;

    /// Apply one (value, operator) input to the query. Inputs the rule
    /// considers invalid return the query unchanged.
    fn apply(
        &self,
        query: QueryBuilder,
        def: &FilterDef,
        value: &str,
        op: FilterOperator,
    ) -> Result<QueryBuilder>;
}

/// Registry of filter rules
pub struct FilterRegistry {
    rules: Vec<Box<dyn FilterRule>>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn register(&mut self, rule: Box<dyn FilterRule>) {
        debug!("Registered filter rule: {}", rule.name());
        self.rules.push(rule);
    }

    pub fn with_default_rules() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(string::StringFilterRule));
        registry.register(Box::new(number::NumberFilterRule));
        registry.register(Box::new(datetime::DateTimeFilterRule));
        registry
    }

    pub fn find_rule(&self, kind: &FilterKind) -> Option<&dyn FilterRule> {
        self.rules
            .iter()
            .find(|rule| rule.can_apply(kind))
            .map(|boxed| &**boxed)
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::with_default_rules()
    }
}

/// Build one predicate per attribute and attach the group to the query.
/// A single attribute attaches directly; several attributes become a
/// parenthesized group, OR-joined for positive operators and AND-joined
/// for negated ones.
pub(crate) fn apply_to_attributes<F>(
    query: QueryBuilder,
    def: &FilterDef,
    negated: bool,
    make: F,
) -> QueryBuilder
where
    F: Fn(&str) -> Expr,
{
    if def.attributes.len() == 1 {
        return query.where_expr(make(&def.attributes[0]));
    }

    query.where_group(|mut group| {
        for attribute in &def.attributes {
            let expr = make(attribute);
            group = if negated {
                group.where_expr(expr)
            } else {
                group.or_where_expr(expr)
            };
        }
        group
    })
}

/// Apply every matching search input to the query using the default
/// rule registry.
pub fn apply_filters(
    filters: &FilterSet,
    default_operator: FilterOperator,
    mut query: QueryBuilder,
    search: &SearchRequest,
) -> Result<QueryBuilder> {
    if filters.is_empty() || search.is_empty() {
        return Ok(query);
    }

    let registry = FilterRegistry::with_default_rules();

    for (name, def) in filters.iter() {
        let inputs = search.get(name);
        if inputs.is_empty() {
            continue;
        }

        let Some(rule) = registry.find_rule(&def.kind) else {
            debug!("No filter rule registered for kind {:?}", def.kind);
            continue;
        };

        for input in inputs {
            let op = match input.operator.as_deref() {
                None | Some("") => default_operator,
                Some(token) => match token.parse::<FilterOperator>() {
                    Ok(op) => op,
                    Err(_) => {
                        debug!(
                            "Skipping filter '{}': unknown operator '{}'",
                            name, token
                        );
                        continue;
                    }
                },
            };

            query = rule.apply(query, def, &input.value, op)?;
        }
    }

    Ok(query)
}

/// Declarative attribute filtering for a model.
pub trait Filterable: Model {
    /// The filters this model exposes. Empty by default.
    fn attribute_filters() -> FilterSet {
        FilterSet::new()
    }

    /// Operator used when a search input does not name one.
    fn default_filter_operator() -> FilterOperator {
        FilterOperator::Equals
    }

    /// Translate a search request into predicates on the query.
    fn apply_attribute_filters(query: QueryBuilder, search: &SearchRequest) -> Result<QueryBuilder>
    where
        Self: Sized,
    {
        apply_filters(
            &Self::attribute_filters(),
            Self::default_filter_operator(),
            query,
            search,
        )
    }
}
