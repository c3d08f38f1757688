//! Rule language
//!
//! Rules are written as `|`-joined tokens, e.g. `required|string|max:80`.
//! Parsing happens when a model's rule map is resolved; an unknown token
//! is a developer error, not a validation failure.

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::core::{ModelError, Value};

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Required,
    Sometimes,
    Nullable,
    Boolean,
    Str,
    Numeric,
    Integer,
    Uuid,
    Json,
    Email,
    Max(u64),
    Min(u64),
    In(Vec<String>),
}

impl FromStr for Rule {
    type Err = ModelError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let token = token.trim();
        let (name, arg) = match token.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (token, None),
        };

        let parse_limit = |arg: Option<&str>| {
            arg.and_then(|a| a.parse::<u64>().ok())
                .ok_or_else(|| ModelError::InvalidRule(format!("'{}' needs a numeric bound", token)))
        };

        match name {
            "required" => Ok(Self::Required),
            "sometimes" => Ok(Self::Sometimes),
            "nullable" => Ok(Self::Nullable),
            "boolean" => Ok(Self::Boolean),
            "string" => Ok(Self::Str),
            "numeric" => Ok(Self::Numeric),
            "integer" => Ok(Self::Integer),
            "uuid" => Ok(Self::Uuid),
            "json" => Ok(Self::Json),
            "email" => Ok(Self::Email),
            "max" => Ok(Self::Max(parse_limit(arg)?)),
            "min" => Ok(Self::Min(parse_limit(arg)?)),
            "in" => {
                let options = arg
                    .map(|a| a.split(',').map(|s| s.trim().to_string()).collect::<Vec<_>>())
                    .filter(|opts: &Vec<String>| !opts.is_empty())
                    .ok_or_else(|| {
                        ModelError::InvalidRule(format!("'{}' needs a value list", token))
                    })?;
                Ok(Self::In(options))
            }
            other => Err(ModelError::InvalidRule(format!("Unknown rule '{}'", other))),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "required"),
            Self::Sometimes => write!(f, "sometimes"),
            Self::Nullable => write!(f, "nullable"),
            Self::Boolean => write!(f, "boolean"),
            Self::Str => write!(f, "string"),
            Self::Numeric => write!(f, "numeric"),
            Self::Integer => write!(f, "integer"),
            Self::Uuid => write!(f, "uuid"),
            Self::Json => write!(f, "json"),
            Self::Email => write!(f, "email"),
            Self::Max(n) => write!(f, "max:{}", n),
            Self::Min(n) => write!(f, "min:{}", n),
            Self::In(options) => write!(f, "in:{}", options.join(",")),
        }
    }
}

/// Parse a `|`-joined rule line. Empty lines parse to no rules.
pub fn parse_rule_line(line: &str) -> crate::core::Result<Vec<Rule>> {
    line.split('|')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::parse)
        .collect()
}

/// One failed check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    pub attribute: String,
    pub rule: String,
    pub message: String,
}

/// Every failed check for one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, attribute: &str, rule: &Rule, message: String) {
        self.errors.push(ValidationError {
            attribute: attribute.to_string(),
            rule: rule.to_string(),
            message,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// All failure messages, in check order.
    pub fn all(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.message.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter()
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.all().join("; "))
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Text(s) => s.is_empty(),
        _ => false,
    }
}

/// Check one attribute's rules against its (possibly absent) value.
pub fn check_attribute(
    attribute: &str,
    rules: &[Rule],
    value: Option<&Value>,
) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if rules.contains(&Rule::Sometimes) && value.is_none() {
        return errors;
    }

    if rules.contains(&Rule::Required) && value.map(is_blank).unwrap_or(true) {
        errors.push(
            attribute,
            &Rule::Required,
            format!("The {} field is required.", attribute),
        );
        return errors;
    }

    let Some(value) = value else {
        return errors;
    };

    // Blank non-required values validate vacuously; format and type
    // rules only apply to a real value.
    if is_blank(value) {
        return errors;
    }

    for rule in rules {
        match rule {
            Rule::Boolean => {
                if !matches!(value, Value::Boolean(_)) {
                    errors.push(
                        attribute,
                        rule,
                        format!("The {} field must be true or false.", attribute),
                    );
                }
            }
            Rule::Str => {
                if !matches!(value, Value::Text(_)) {
                    errors.push(
                        attribute,
                        rule,
                        format!("The {} field must be a string.", attribute),
                    );
                }
            }
            Rule::Numeric => {
                if !value.is_numeric() {
                    errors.push(
                        attribute,
                        rule,
                        format!("The {} field must be a number.", attribute),
                    );
                }
            }
            Rule::Integer => {
                if !matches!(value, Value::Integer(_)) {
                    errors.push(
                        attribute,
                        rule,
                        format!("The {} field must be an integer.", attribute),
                    );
                }
            }
            Rule::Uuid => {
                if !matches!(value, Value::Uuid(_)) {
                    errors.push(
                        attribute,
                        rule,
                        format!("The {} field must be a valid UUID.", attribute),
                    );
                }
            }
            Rule::Json => {
                if !matches!(value, Value::Json(_)) {
                    errors.push(
                        attribute,
                        rule,
                        format!("The {} field must be valid JSON.", attribute),
                    );
                }
            }
            Rule::Email => {
                let ok = value
                    .as_str()
                    .map(|s| EMAIL_RE.is_match(s))
                    .unwrap_or(false);
                if !ok {
                    errors.push(
                        attribute,
                        rule,
                        format!("The {} field must be a valid email address.", attribute),
                    );
                }
            }
            Rule::Max(limit) => {
                if exceeds_max(value, *limit) {
                    errors.push(
                        attribute,
                        rule,
                        format!("The {} field may not be greater than {}.", attribute, limit),
                    );
                }
            }
            Rule::Min(limit) => {
                if below_min(value, *limit) {
                    errors.push(
                        attribute,
                        rule,
                        format!("The {} field must be at least {}.", attribute, limit),
                    );
                }
            }
            Rule::In(options) => {
                let text = value.to_string();
                if !options.iter().any(|opt| *opt == text) {
                    errors.push(
                        attribute,
                        rule,
                        format!("The selected {} is invalid.", attribute),
                    );
                }
            }
            Rule::Required | Rule::Sometimes | Rule::Nullable => {}
        }
    }

    errors
}

/// `max` bounds string length for text and magnitude for numbers.
fn exceeds_max(value: &Value, limit: u64) -> bool {
    match value {
        Value::Text(s) => s.chars().count() as u64 > limit,
        Value::Integer(i) => *i > limit as i64,
        Value::Float(f) => *f > limit as f64,
        _ => false,
    }
}

fn below_min(value: &Value, limit: u64) -> bool {
    match value {
        Value::Text(s) => (s.chars().count() as u64) < limit,
        Value::Integer(i) => *i < limit as i64,
        Value::Float(f) => *f < limit as f64,
        _ => false,
    }
}
