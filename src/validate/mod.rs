//! Validation/casting pipeline
//!
//! A model declares, per attribute, which rule applies when the record
//! is being created, which when it is being updated, and an optional
//! type rule that doubles as a cast. Resolution picks the context rule
//! set, coerces the incoming values, restricts the input to declared
//! attributes, and runs the checks; on success the cast values are
//! assigned onto the model.

pub mod cast;
pub mod feedback;
pub mod rules;

use log::debug;
use serde_json::{Map as JsonMapInner, Value as JsonValue};
use thiserror::Error;

use crate::core::{ModelError, Value};
use crate::model::{AttributeMap, Model};

pub use cast::{CastType, cast_value, json_to_value, value_to_json};
pub use feedback::{Flash, FlashLevel, SaveOptions, SaveOutcome, SaveStatus, save_with_feedback};
pub use rules::{Rule, ValidationError, ValidationErrors, check_attribute, parse_rule_line};

/// Raw request input: a JSON object map.
pub type JsonMap = JsonMapInner<String, JsonValue>;

/// What a context (create or update) does with an attribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RulePolicy {
    /// No context rule; on update this degrades to `sometimes`.
    #[default]
    Unset,
    /// Validate with this `|`-joined rule line.
    Apply(String),
    /// The attribute may not be supplied in this context at all; it is
    /// stripped from the input.
    Forbid,
}

impl RulePolicy {
    fn rule_line(&self) -> Option<&str> {
        match self {
            Self::Apply(line) if !line.is_empty() => Some(line),
            _ => None,
        }
    }
}

/// Per-attribute validation declaration: create rule, update rule,
/// shared type rule.
#[derive(Debug, Clone, Default)]
pub struct RuleSpec {
    on_create: RulePolicy,
    on_update: RulePolicy,
    type_rule: Option<String>,
}

impl RuleSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_create(mut self, rule: impl Into<String>) -> Self {
        self.on_create = RulePolicy::Apply(rule.into());
        self
    }

    pub fn on_update(mut self, rule: impl Into<String>) -> Self {
        self.on_update = RulePolicy::Apply(rule.into());
        self
    }

    pub fn forbid_on_create(mut self) -> Self {
        self.on_create = RulePolicy::Forbid;
        self
    }

    pub fn forbid_on_update(mut self) -> Self {
        self.on_update = RulePolicy::Forbid;
        self
    }

    /// Type rule appended in both contexts; also selects the cast.
    pub fn typed(mut self, rule: impl Into<String>) -> Self {
        self.type_rule = Some(rule.into());
        self
    }

    fn policy_for(&self, existing: bool) -> &RulePolicy {
        if existing {
            &self.on_update
        } else {
            &self.on_create
        }
    }
}

/// Ordered attribute -> rule-spec map declared on a model.
#[derive(Debug, Clone, Default)]
pub struct AttributeRules {
    entries: Vec<(String, RuleSpec)>,
}

impl AttributeRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, attribute: impl Into<String>, spec: RuleSpec) -> Self {
        self.entries.push((attribute.into(), spec));
        self
    }

    pub fn get(&self, attribute: &str) -> Option<&RuleSpec> {
        self.entries
            .iter()
            .find(|(name, _)| name == attribute)
            .map(|(_, spec)| spec)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RuleSpec)> {
        self.entries.iter().map(|(n, s)| (n.as_str(), s))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Output of rule resolution: parsed rule lines per attribute and the
/// cast input restricted to attributes that have rules.
#[derive(Debug)]
pub struct ResolvedValidation {
    pub attributes: Vec<(String, Vec<Rule>)>,
    pub input: AttributeMap,
}

/// Resolve the rule map for one context and coerce the input.
pub fn resolve_rules(
    rule_map: &AttributeRules,
    existing: bool,
    input: &JsonMap,
) -> Result<ResolvedValidation, ModelError> {
    let mut attributes = Vec::new();
    let mut resolved_input = AttributeMap::new();

    for (name, spec) in rule_map.iter() {
        let policy = spec.policy_for(existing);

        // Forbidden in this context: no rules, and the value is dropped
        if matches!(policy, RulePolicy::Forbid) {
            continue;
        }

        let mut parts: Vec<&str> = Vec::new();
        match policy.rule_line() {
            Some(line) => parts.push(line),
            None => {
                if existing {
                    parts.push("sometimes");
                }
            }
        }
        if let Some(type_rule) = spec.type_rule.as_deref() {
            if !type_rule.is_empty() {
                parts.push(type_rule);
            }
        }

        let line = parts.join("|");
        let rules = parse_rule_line(&line)?;
        let cast = CastType::from_rule_line(&line);

        if let Some(raw) = input.get(name) {
            resolved_input.insert(name.to_string(), coerce(name, raw, cast));
        } else if !existing
            && policy.rule_line().is_some()
            && spec.type_rule.as_deref().is_some_and(|t| !t.is_empty())
        {
            // Absent on create but ruled and typed: cast an empty-string
            // default in, so e.g. an unticked checkbox lands as false.
            // On update an absent attribute stays absent; defaulting it
            // would clobber the stored value.
            let raw = JsonValue::String(String::new());
            resolved_input.insert(name.to_string(), coerce(name, &raw, cast));
        }

        attributes.push((name.to_string(), rules));
    }

    Ok(ResolvedValidation {
        attributes,
        input: resolved_input,
    })
}

/// Cast with fallback: a value that refuses the cast stays uncast so
/// the type rule can report it.
fn coerce(name: &str, raw: &JsonValue, cast: Option<CastType>) -> Value {
    match cast {
        Some(cast) => cast_value(raw, cast).unwrap_or_else(|e| {
            debug!("Cast of '{}' failed ({}), keeping raw value", name, e);
            json_to_value(raw)
        }),
        None => json_to_value(raw),
    }
}

/// Why a validation pass did not assign.
#[derive(Error, Debug)]
pub enum ValidationFailure {
    /// User input failed the checks.
    #[error("Validation failed: {0}")]
    Invalid(ValidationErrors),

    /// Developer error: bad rule line or an assignment mismatch.
    #[error(transparent)]
    Error(#[from] ModelError),
}

/// Declarative input validation for a model.
pub trait Validates: Model {
    /// The rule map this model validates against. Empty by default.
    fn attribute_rules() -> AttributeRules {
        AttributeRules::new()
    }

    /// Validate and assign, picking the context from [`Model::exists`].
    fn validate_input(&mut self, input: &JsonMap) -> Result<(), ValidationFailure>
    where
        Self: Sized,
    {
        let existing = self.exists();
        self.validate_input_for(input, existing)
    }

    /// Validate and assign for an explicit context.
    fn validate_input_for(
        &mut self,
        input: &JsonMap,
        existing: bool,
    ) -> Result<(), ValidationFailure>
    where
        Self: Sized,
    {
        let resolved = resolve_rules(&Self::attribute_rules(), existing, input)?;

        let mut errors = ValidationErrors::new();
        for (name, rules) in &resolved.attributes {
            errors.merge(check_attribute(name, rules, resolved.input.get(name)));
        }
        if !errors.is_empty() {
            return Err(ValidationFailure::Invalid(errors));
        }

        for (name, _) in &resolved.attributes {
            if let Some(value) = resolved.input.get(name) {
                self.set_attribute(name, value.clone())?;
            }
        }
        Ok(())
    }

    /// Build a fresh record from create-context input.
    fn create_from(input: &JsonMap) -> Result<Self, ValidationFailure>
    where
        Self: Default + Sized,
    {
        let mut model = Self::default();
        model.validate_input_for(input, false)?;
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FromValue, Value};
    use serde_json::json;

    fn input(value: JsonValue) -> JsonMap {
        value.as_object().cloned().expect("object fixture")
    }

    #[derive(Default, Debug)]
    struct Account {
        id: Option<i64>,
        email: String,
        active: bool,
        age: Option<i64>,
    }

    impl Model for Account {
        fn table() -> &'static str {
            "accounts"
        }

        fn attribute_names() -> &'static [&'static str] {
            &["id", "email", "active", "age"]
        }

        fn attribute(&self, name: &str) -> Option<Value> {
            match name {
                "id" => Some(Value::from(self.id)),
                "email" => Some(Value::from(self.email.clone())),
                "active" => Some(Value::from(self.active)),
                "age" => Some(Value::from(self.age)),
                _ => None,
            }
        }

        fn set_attribute(&mut self, name: &str, value: Value) -> Result<(), ModelError> {
            match name {
                "id" => self.id = FromValue::from_value(value)?,
                "email" => self.email = FromValue::from_value(value)?,
                "active" => self.active = FromValue::from_value(value)?,
                "age" => self.age = FromValue::from_value(value)?,
                other => return Err(ModelError::UnknownAttribute(other.to_string())),
            }
            Ok(())
        }
    }

    impl Validates for Account {
        fn attribute_rules() -> AttributeRules {
            AttributeRules::new()
                .with(
                    "email",
                    RuleSpec::new()
                        .on_create("required")
                        .on_update("sometimes")
                        .typed("email|string|max:80"),
                )
                .with("active", RuleSpec::new().typed("boolean"))
                .with(
                    "age",
                    RuleSpec::new().on_update("sometimes").typed("integer"),
                )
                .with("id", RuleSpec::new().forbid_on_create().forbid_on_update())
        }
    }

    #[test]
    fn test_create_assigns_cast_values() {
        let payload = input(json!({
            "email": "alice@example.com",
            "active": "1",
            "age": "33"
        }));

        let account = Account::create_from(&payload).unwrap();
        assert_eq!(account.email, "alice@example.com");
        assert!(account.active);
        assert_eq!(account.age, Some(33));
    }

    #[test]
    fn test_create_requires_email() {
        let payload = input(json!({ "active": true }));
        let failure = Account::create_from(&payload).unwrap_err();
        match failure {
            ValidationFailure::Invalid(errors) => {
                assert_eq!(errors.len(), 1);
                assert!(errors.all()[0].contains("email"));
            }
            other => panic!("Expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn test_update_tolerates_missing_email() {
        let mut account = Account {
            id: Some(1),
            email: "old@example.com".into(),
            active: false,
            age: None,
        };
        let payload = input(json!({ "active": 1 }));
        account.validate_input(&payload).unwrap();
        assert!(account.active);
        assert_eq!(account.email, "old@example.com");
    }

    #[test]
    fn test_forbidden_attribute_is_stripped() {
        let payload = input(json!({
            "email": "alice@example.com",
            "id": 999
        }));
        let account = Account::create_from(&payload).unwrap();
        assert_eq!(account.id, None);
    }

    #[test]
    fn test_invalid_email_rejected() {
        let payload = input(json!({ "email": "nope" }));
        let failure = Account::create_from(&payload).unwrap_err();
        assert!(matches!(failure, ValidationFailure::Invalid(_)));
    }

    #[test]
    fn test_uncastable_boolean_reported_not_crashed() {
        let payload = input(json!({
            "email": "alice@example.com",
            "active": "maybe"
        }));
        let failure = Account::create_from(&payload).unwrap_err();
        match failure {
            ValidationFailure::Invalid(errors) => {
                assert!(errors.all()[0].contains("active"));
            }
            other => panic!("Expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn test_undeclared_input_is_ignored() {
        let payload = input(json!({
            "email": "alice@example.com",
            "is_admin": true
        }));
        // "is_admin" has no rules; it must not reach set_attribute
        let account = Account::create_from(&payload).unwrap();
        assert_eq!(account.email, "alice@example.com");
    }

    #[test]
    fn test_bad_rule_line_is_developer_error() {
        #[derive(Default, Debug)]
        struct Broken;
        impl Model for Broken {
            fn table() -> &'static str {
                "broken"
            }
            fn attribute_names() -> &'static [&'static str] {
                &["x"]
            }
            fn attribute(&self, _: &str) -> Option<Value> {
                None
            }
            fn set_attribute(&mut self, _: &str, _: Value) -> Result<(), ModelError> {
                Ok(())
            }
        }
        impl Validates for Broken {
            fn attribute_rules() -> AttributeRules {
                AttributeRules::new().with("x", RuleSpec::new().on_create("sparkly"))
            }
        }

        let failure = Broken::create_from(&input(json!({"x": 1}))).unwrap_err();
        assert!(matches!(
            failure,
            ValidationFailure::Error(ModelError::InvalidRule(_))
        ));
    }
}
