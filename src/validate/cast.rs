//! Input casting
//!
//! Request input arrives as JSON; attribute values live as [`Value`].
//! The cast applied to each attribute is chosen from its resolved rule
//! line, so a `boolean` rule both validates and coerces.

use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::core::{ModelError, Result, Value};

/// Coercion target detected from a rule line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastType {
    Boolean,
    Text,
    Numeric,
    Integer,
    Uuid,
    Json,
}

impl CastType {
    /// Detect the cast a rule line implies. When several type tokens
    /// appear, the more specific coercion wins.
    pub fn from_rule_line(line: &str) -> Option<Self> {
        let has = |token: &str| {
            line.split('|')
                .any(|part| part.split(':').next() == Some(token))
        };

        if has("json") {
            Some(Self::Json)
        } else if has("boolean") {
            Some(Self::Boolean)
        } else if has("integer") {
            Some(Self::Integer)
        } else if has("numeric") {
            Some(Self::Numeric)
        } else if has("uuid") {
            Some(Self::Uuid)
        } else if has("string") || has("email") {
            Some(Self::Text)
        } else {
            None
        }
    }
}

/// Convert a raw JSON value into a [`Value`] under the given cast.
pub fn cast_value(raw: &JsonValue, cast: CastType) -> Result<Value> {
    match (raw, cast) {
        (JsonValue::Null, _) => Ok(Value::Null),

        (JsonValue::Bool(b), CastType::Boolean) => Ok(Value::Boolean(*b)),
        (JsonValue::Number(n), CastType::Boolean) => match n.as_i64() {
            Some(0) => Ok(Value::Boolean(false)),
            Some(1) => Ok(Value::Boolean(true)),
            _ => Err(ModelError::TypeMismatch(format!(
                "Cannot cast {} to BOOLEAN",
                n
            ))),
        },
        (JsonValue::String(s), CastType::Boolean) => match s.trim() {
            "" | "0" | "false" => Ok(Value::Boolean(false)),
            "1" | "true" => Ok(Value::Boolean(true)),
            other => Err(ModelError::TypeMismatch(format!(
                "Cannot cast '{}' to BOOLEAN",
                other
            ))),
        },

        (JsonValue::String(s), CastType::Text) => Ok(Value::Text(s.clone())),
        (JsonValue::Number(n), CastType::Text) => Ok(Value::Text(n.to_string())),
        (JsonValue::Bool(b), CastType::Text) => Ok(Value::Text(b.to_string())),

        (JsonValue::Number(n), CastType::Integer) => n
            .as_i64()
            .map(Value::Integer)
            .ok_or_else(|| ModelError::TypeMismatch(format!("Cannot cast {} to INTEGER", n))),
        (JsonValue::String(s), CastType::Integer) => {
            if s.trim().is_empty() {
                return Ok(Value::Null);
            }
            s.trim()
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| ModelError::TypeMismatch(format!("Cannot cast '{}' to INTEGER", s)))
        }

        (JsonValue::Number(n), CastType::Numeric) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Integer(i))
            } else {
                n.as_f64()
                    .map(Value::Float)
                    .ok_or_else(|| ModelError::TypeMismatch(format!("Cannot cast {} to FLOAT", n)))
            }
        }
        (JsonValue::String(s), CastType::Numeric) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(Value::Null);
            }
            if let Ok(i) = trimmed.parse::<i64>() {
                Ok(Value::Integer(i))
            } else {
                trimmed.parse::<f64>().map(Value::Float).map_err(|_| {
                    ModelError::TypeMismatch(format!("Cannot cast '{}' to NUMERIC", s))
                })
            }
        }

        (JsonValue::String(s), CastType::Uuid) => {
            if s.trim().is_empty() {
                return Ok(Value::Null);
            }
            parse_uuid(s.trim()).map(Value::Uuid)
        }

        (value, CastType::Json) => Ok(Value::Json(value.clone())),

        // Complex values stringify when the target is text
        (value, CastType::Text) => Ok(Value::Text(value.to_string())),

        (value, cast) => Err(ModelError::TypeMismatch(format!(
            "Cannot cast JSON {} to {:?}",
            value, cast
        ))),
    }
}

/// Accepts canonical hyphenated form or a bare 32-hex string.
pub fn parse_uuid(text: &str) -> Result<Uuid> {
    Uuid::parse_str(text).map_err(|e| ModelError::InvalidUuid(format!("'{}': {}", text, e)))
}

/// Uncast conversion for attributes without a type rule.
pub fn json_to_value(raw: &JsonValue) -> Value {
    match raw {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Boolean(*b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else {
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        JsonValue::String(s) => Value::Text(s.clone()),
        other => Value::Json(other.clone()),
    }
}

/// Inverse of [`json_to_value`], used for outcome payloads.
pub fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Integer(i) => JsonValue::from(*i),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::Text(s) => JsonValue::String(s.clone()),
        Value::Boolean(b) => JsonValue::Bool(*b),
        Value::Timestamp(t) => JsonValue::String(t.to_rfc3339()),
        Value::Date(d) => JsonValue::String(d.format("%Y-%m-%d").to_string()),
        Value::Uuid(u) => JsonValue::String(u.to_string()),
        Value::Bytes(b) => {
            let hex: String = b.iter().map(|byte| format!("{:02x}", byte)).collect();
            JsonValue::String(hex)
        }
        Value::Json(j) => j.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cast_detection() {
        assert_eq!(
            CastType::from_rule_line("required|string|max:80"),
            Some(CastType::Text)
        );
        assert_eq!(
            CastType::from_rule_line("sometimes|boolean"),
            Some(CastType::Boolean)
        );
        assert_eq!(CastType::from_rule_line("required|json"), Some(CastType::Json));
        assert_eq!(CastType::from_rule_line("required"), None);
    }

    #[test]
    fn test_boolean_coercions() {
        assert_eq!(
            cast_value(&json!("1"), CastType::Boolean).unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            cast_value(&json!(0), CastType::Boolean).unwrap(),
            Value::Boolean(false)
        );
        assert_eq!(
            cast_value(&json!(""), CastType::Boolean).unwrap(),
            Value::Boolean(false)
        );
        assert!(cast_value(&json!("maybe"), CastType::Boolean).is_err());
    }

    #[test]
    fn test_numeric_coercions() {
        assert_eq!(
            cast_value(&json!("42"), CastType::Numeric).unwrap(),
            Value::Integer(42)
        );
        assert_eq!(
            cast_value(&json!("4.5"), CastType::Numeric).unwrap(),
            Value::Float(4.5)
        );
        assert_eq!(cast_value(&json!(""), CastType::Numeric).unwrap(), Value::Null);
        assert!(cast_value(&json!("many"), CastType::Numeric).is_err());
    }

    #[test]
    fn test_uuid_coercions() {
        let canonical = "a1a2a3a4-b1b2-c1c2-d1d2-d3d4d5d6d7d8";
        let bare = "a1a2a3a4b1b2c1c2d1d2d3d4d5d6d7d8";
        assert_eq!(
            cast_value(&json!(canonical), CastType::Uuid).unwrap(),
            cast_value(&json!(bare), CastType::Uuid).unwrap()
        );
        assert!(cast_value(&json!("not-a-uuid"), CastType::Uuid).is_err());
    }

    #[test]
    fn test_json_cast_wraps_raw() {
        let raw = json!({"tags": ["a", "b"]});
        assert_eq!(
            cast_value(&raw, CastType::Json).unwrap(),
            Value::Json(raw.clone())
        );
    }

    #[test]
    fn test_text_cast_stringifies_complex() {
        assert_eq!(
            cast_value(&json!([1, 2]), CastType::Text).unwrap(),
            Value::Text("[1,2]".to_string())
        );
    }

    #[test]
    fn test_value_json_round_trip() {
        let value = Value::Integer(5);
        assert_eq!(json_to_value(&value_to_json(&value)), value);
    }
}
