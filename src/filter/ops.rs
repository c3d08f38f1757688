use std::fmt;
use std::str::FromStr;

use crate::core::ModelError;

/// The comparison-operator DSL accepted in search requests.
///
/// `*` marks the wildcard side of a LIKE-family operator: `*=*` means
/// "contains", `=*` means "starts with", `*=` means "ends with". A `!`
/// negates any of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    StartsWith,
    NotStartsWith,
    EndsWith,
    NotEndsWith,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl FromStr for FilterOperator {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "=" => Ok(Self::Equals),
            "!=" => Ok(Self::NotEquals),
            "*=*" => Ok(Self::Contains),
            "*!=*" => Ok(Self::NotContains),
            "=*" => Ok(Self::StartsWith),
            "!=*" => Ok(Self::NotStartsWith),
            "*=" => Ok(Self::EndsWith),
            "*!=" => Ok(Self::NotEndsWith),
            ">" => Ok(Self::Gt),
            ">=" => Ok(Self::Gte),
            "<" => Ok(Self::Lt),
            "<=" => Ok(Self::Lte),
            other => Err(ModelError::InvalidOperator(other.to_string())),
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Self::Equals => "=",
            Self::NotEquals => "!=",
            Self::Contains => "*=*",
            Self::NotContains => "*!=*",
            Self::StartsWith => "=*",
            Self::NotStartsWith => "!=*",
            Self::EndsWith => "*=",
            Self::NotEndsWith => "*!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        };
        write!(f, "{}", symbol)
    }
}

impl FilterOperator {
    pub fn negated(&self) -> bool {
        matches!(
            self,
            Self::NotEquals | Self::NotContains | Self::NotStartsWith | Self::NotEndsWith
        )
    }

    /// Plain equality, valid for every filter kind.
    pub fn is_equality(&self) -> bool {
        matches!(self, Self::Equals | Self::NotEquals)
    }

    /// LIKE-family operator, valid for string filters only.
    pub fn is_like(&self) -> bool {
        matches!(
            self,
            Self::Contains
                | Self::NotContains
                | Self::StartsWith
                | Self::NotStartsWith
                | Self::EndsWith
                | Self::NotEndsWith
        )
    }

    /// Ordered comparison, valid for number and datetime filters.
    pub fn is_ordering(&self) -> bool {
        matches!(self, Self::Gt | Self::Gte | Self::Lt | Self::Lte)
    }

    /// The SQL comparison this operator maps onto, for the kinds that
    /// compare whole values. `None` for LIKE-family operators.
    pub fn comparison_op(&self) -> Option<crate::query::BinaryOp> {
        use crate::query::BinaryOp;
        match self {
            Self::Equals => Some(BinaryOp::Eq),
            Self::NotEquals => Some(BinaryOp::NotEq),
            Self::Gt => Some(BinaryOp::Gt),
            Self::Gte => Some(BinaryOp::GtEq),
            Self::Lt => Some(BinaryOp::Lt),
            Self::Lte => Some(BinaryOp::LtEq),
            _ => None,
        }
    }

    /// Expand a user value into the LIKE pattern this operator implies.
    /// `None` for non-LIKE operators.
    pub fn like_pattern(&self, value: &str) -> Option<String> {
        let escaped = escape_like(value);
        match self {
            Self::Contains | Self::NotContains => Some(format!("%{}%", escaped)),
            Self::StartsWith | Self::NotStartsWith => Some(format!("{}%", escaped)),
            Self::EndsWith | Self::NotEndsWith => Some(format!("%{}", escaped)),
            _ => None,
        }
    }
}

/// Escape LIKE wildcards in a user-supplied value so only the
/// operator-implied wildcards match.
fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
