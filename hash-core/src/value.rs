//! Typed values and the default string mapping.
//!
//! | raw string          | value         |
//! |---------------------|---------------|
//! | `""` or `"true"`    | `Bool(true)`  |
//! | `"false"`           | `Bool(false)` |
//! | `"null"`            | `Null`        |
//! | anything else       | `Str(..)`     |
//!
//! Going back, `false` has no string form at all: the key is left out of
//! the fragment. `true` becomes the bare key.

use std::fmt;

use crate::error::ParseError;

/// A typed fragment value. "Not set" is `Option<Value>::None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// A flag.
    Bool(bool),
    /// Explicit null.
    Null,
    /// Any other string.
    Str(String),
}

impl Value {
    /// The string payload, if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The flag, if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Check for `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Null => f.write_str("null"),
            Value::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

/// Parser from a raw fragment string to a value.
pub type ParseFn = Box<dyn Fn(&str) -> Result<Value, ParseError>>;

/// Stringifier from a value to its raw form; `None` omits the key.
pub type StringifyFn = Box<dyn Fn(&Value) -> Option<String>>;

/// Default parser. Total over strings, but shaped like any other parser.
pub fn parse_value(raw: &str) -> Result<Value, ParseError> {
    Ok(match raw {
        "" | "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        other => Value::Str(other.to_string()),
    })
}

/// Default stringifier.
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Bool(false) => None,
        Value::Bool(true) => Some(String::new()),
        other => Some(other.to_string()),
    }
}

pub(crate) fn default_parse() -> ParseFn {
    Box::new(parse_value)
}

pub(crate) fn default_stringify() -> StringifyFn {
    Box::new(value_to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_keywords() {
        assert_eq!(parse_value(""), Ok(Value::Bool(true)));
        assert_eq!(parse_value("true"), Ok(Value::Bool(true)));
        assert_eq!(parse_value("false"), Ok(Value::Bool(false)));
        assert_eq!(parse_value("null"), Ok(Value::Null));
        assert_eq!(parse_value("1"), Ok(Value::Str("1".into())));
        assert_eq!(parse_value("TRUE"), Ok(Value::Str("TRUE".into())));
    }

    #[test]
    fn false_has_no_string_form() {
        assert_eq!(value_to_string(&Value::Bool(false)), None);
        assert_eq!(value_to_string(&Value::Bool(true)), Some(String::new()));
        assert_eq!(value_to_string(&Value::Null), Some("null".into()));
        assert_eq!(value_to_string(&"x".into()), Some("x".into()));
    }

    #[test]
    fn stringify_then_parse_is_stable() {
        for value in [Value::Bool(true), Value::Null, Value::from("abc")] {
            let raw = value_to_string(&value).unwrap();
            assert_eq!(parse_value(&raw), Ok(value));
        }
    }

    #[test]
    fn accessors() {
        assert_eq!(Value::from("a").as_str(), Some("a"));
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert!(Value::Null.is_null());
        assert_eq!(Value::Null.as_str(), None);
    }
}
