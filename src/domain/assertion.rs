use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// What part of the response an assertion inspects.
///
/// Unrecognised names are kept verbatim so evaluation can fail closed with a
/// useful message instead of rejecting the whole document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AssertionKind {
    StatusCode,
    ResponseTime,
    BodyContains,
    Header,
    Unsupported(String),
}

impl AssertionKind {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            AssertionKind::StatusCode => "status_code",
            AssertionKind::ResponseTime => "response_time",
            AssertionKind::BodyContains => "body_contains",
            AssertionKind::Header => "header",
            AssertionKind::Unsupported(name) => name,
        }
    }
}

impl From<String> for AssertionKind {
    fn from(value: String) -> Self {
        match normalize_name(&value).as_str() {
            "status_code" | "status" => AssertionKind::StatusCode,
            "response_time" => AssertionKind::ResponseTime,
            "body_contains" => AssertionKind::BodyContains,
            "header" => AssertionKind::Header,
            _ => AssertionKind::Unsupported(value),
        }
    }
}

impl From<AssertionKind> for String {
    fn from(value: AssertionKind) -> Self {
        match value {
            AssertionKind::Unsupported(name) => name,
            known @ (AssertionKind::StatusCode
            | AssertionKind::ResponseTime
            | AssertionKind::BodyContains
            | AssertionKind::Header) => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for AssertionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    Contains,
    NotContains,
    Unsupported(String),
}

impl Operator {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "not_equals",
            Operator::GreaterThan => "greater_than",
            Operator::LessThan => "less_than",
            Operator::Contains => "contains",
            Operator::NotContains => "not_contains",
            Operator::Unsupported(name) => name,
        }
    }

    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Operator::GreaterThan | Operator::LessThan)
    }
}

impl From<String> for Operator {
    fn from(value: String) -> Self {
        match normalize_name(&value).as_str() {
            "equals" | "eq" => Operator::Equals,
            "not_equals" | "ne" => Operator::NotEquals,
            "greater_than" | "gt" => Operator::GreaterThan,
            "less_than" | "lt" => Operator::LessThan,
            "contains" => Operator::Contains,
            "not_contains" => Operator::NotContains,
            _ => Operator::Unsupported(value),
        }
    }
}

impl From<Operator> for String {
    fn from(value: Operator) -> Self {
        match value {
            Operator::Unsupported(name) => name,
            known @ (Operator::Equals
            | Operator::NotEquals
            | Operator::GreaterThan
            | Operator::LessThan
            | Operator::Contains
            | Operator::NotContains) => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize_name(value: &str) -> String {
    value.trim().to_ascii_lowercase().replace('-', "_")
}

/// Expected or observed value of an assertion: a number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssertionValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl AssertionValue {
    /// Numeric view of the value; numeric strings such as `"200"` count.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AssertionValue::Integer(value) => Some(*value as f64),
            AssertionValue::Float(value) => Some(*value),
            AssertionValue::Text(text) => text.trim().parse::<f64>().ok(),
        }
    }

    fn as_integer(&self) -> Option<i64> {
        match self {
            AssertionValue::Integer(value) => Some(*value),
            AssertionValue::Float(_) => None,
            AssertionValue::Text(text) => text.trim().parse::<i64>().ok(),
        }
    }

    /// Orders two values numerically, or `None` when either side is not a number.
    #[must_use]
    pub fn numeric_cmp(&self, other: &AssertionValue) -> Option<Ordering> {
        if let (Some(left), Some(right)) = (self.as_integer(), other.as_integer()) {
            return Some(left.cmp(&right));
        }
        let left = self.as_number()?;
        let right = other.as_number()?;
        left.partial_cmp(&right)
    }

    /// Exact equality: numerically when both sides are numbers, textually otherwise.
    #[must_use]
    pub fn matches(&self, other: &AssertionValue) -> bool {
        match self.numeric_cmp(other) {
            Some(ordering) => ordering == Ordering::Equal,
            None => self.to_string() == other.to_string(),
        }
    }
}

impl fmt::Display for AssertionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssertionValue::Integer(value) => write!(f, "{}", value),
            AssertionValue::Float(value) => write!(f, "{}", value),
            AssertionValue::Text(text) => f.write_str(text),
        }
    }
}

impl From<i64> for AssertionValue {
    fn from(value: i64) -> Self {
        AssertionValue::Integer(value)
    }
}

impl From<&str> for AssertionValue {
    fn from(value: &str) -> Self {
        AssertionValue::Text(value.to_owned())
    }
}

impl From<String> for AssertionValue {
    fn from(value: String) -> Self {
        AssertionValue::Text(value)
    }
}

const fn enabled_by_default() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assertion {
    #[serde(rename = "type")]
    pub kind: AssertionKind,
    #[serde(default)]
    pub property: String,
    pub operator: Operator,
    pub value: AssertionValue,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

impl Assertion {
    #[must_use]
    pub fn new(kind: AssertionKind, operator: Operator, value: impl Into<AssertionValue>) -> Self {
        Self {
            kind,
            property: String::new(),
            operator,
            value: value.into(),
            enabled: true,
        }
    }

    #[must_use]
    pub fn status_equals(code: u16) -> Self {
        Self::new(AssertionKind::StatusCode, Operator::Equals, i64::from(code))
    }

    #[must_use]
    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = property.into();
        self
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssertionResult {
    pub assertion: Assertion,
    pub passed: bool,
    pub message: String,
    pub actual: Option<AssertionValue>,
    pub expected: AssertionValue,
}
