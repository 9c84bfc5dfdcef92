//! Label types declared by the operator and the labels coerced to them.

use std::fmt;

use super::error::LabelError;
use crate::table::{RowId, Value};

/// Type every label collected in a session is coerced to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelType {
    String,
    Integer,
    Float,
}

impl LabelType {
    /// Every supported type, in the order offered to the operator.
    pub const ALL: [LabelType; 3] = [LabelType::String, LabelType::Integer, LabelType::Float];

    pub fn as_str(self) -> &'static str {
        match self {
            LabelType::String => "string",
            LabelType::Integer => "integer",
            LabelType::Float => "float",
        }
    }

    /// Type names accepted from the operator.
    pub fn allowed_names() -> Vec<&'static str> {
        Self::ALL.iter().map(|label_type| label_type.as_str()).collect()
    }

    /// Parse an operator response. Surrounding whitespace is ignored; names are case-sensitive.
    pub fn parse(response: &str) -> Result<Self, LabelError> {
        let trimmed = response.trim();
        Self::ALL
            .into_iter()
            .find(|label_type| label_type.as_str() == trimmed)
            .ok_or_else(|| LabelError::InvalidLabelType {
                given: trimmed.to_string(),
                allowed: Self::allowed_names(),
            })
    }

    /// Coerce a raw response for `row` into a label of this type.
    pub fn coerce(self, row: RowId, response: &str) -> Result<Label, LabelError> {
        let trimmed = response.trim();
        let invalid = || LabelError::InvalidLabelValue {
            row,
            response: response.to_string(),
            label_type: self,
        };
        if trimmed.is_empty() {
            return Err(invalid());
        }
        match self {
            LabelType::String => Ok(Label::Text(trimmed.to_string())),
            LabelType::Integer => parse_integer(trimmed).map(Label::Integer).ok_or_else(invalid),
            LabelType::Float => trimmed
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .map(Label::Float)
                .ok_or_else(invalid),
        }
    }
}

impl fmt::Display for LabelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts plain integers and integral decimals such as `5.0`.
fn parse_integer(text: &str) -> Option<i64> {
    if let Ok(value) = text.parse::<i64>() {
        return Some(value);
    }
    let value = text.parse::<f64>().ok()?;
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

/// A collected label.
#[derive(Debug, Clone, PartialEq)]
pub enum Label {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl Label {
    /// Whether this label denotes the same value as a recorded cell.
    ///
    /// Numbers compare numerically across integer and float cells.
    pub fn agrees_with(&self, recorded: &Value) -> bool {
        match (self, recorded) {
            (Label::Text(label), Value::Text(value)) => label == value,
            (Label::Text(_), _) => false,
            (Label::Integer(label), Value::Integer(value)) => label == value,
            (Label::Integer(label), other) => other.as_f64() == Some(*label as f64),
            (Label::Float(label), other) => other.as_f64() == Some(*label),
        }
    }
}

impl From<Label> for Value {
    fn from(label: Label) -> Self {
        match label {
            Label::Text(v) => Value::Text(v),
            Label::Integer(v) => Value::Integer(v),
            Label::Float(v) => Value::Float(v),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Text(v) => f.write_str(v),
            Label::Integer(v) => write!(f, "{v}"),
            Label::Float(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_type_names() {
        assert_eq!(LabelType::parse("string").unwrap(), LabelType::String);
        assert_eq!(LabelType::parse(" integer\n").unwrap(), LabelType::Integer);
        assert_eq!(LabelType::parse("float").unwrap(), LabelType::Float);
    }

    #[test]
    fn rejects_unknown_type_names_with_allowed_set() {
        for response in ["", "int", "Float", "str", "double", "strings"] {
            match LabelType::parse(response) {
                Err(LabelError::InvalidLabelType { given, allowed }) => {
                    assert_eq!(given, response.trim());
                    assert_eq!(allowed, vec!["string", "integer", "float"]);
                }
                other => panic!("expected InvalidLabelType for {response:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn invalid_type_message_lists_alternatives() {
        let err = LabelType::parse("bool").unwrap_err();
        assert_eq!(
            err.to_string(),
            "\"bool\" is not a supported label type; please provide one of: string, integer, float"
        );
    }

    #[test]
    fn coerces_numeric_responses() {
        assert_eq!(LabelType::Integer.coerce(0, "5").unwrap(), Label::Integer(5));
        assert_eq!(LabelType::Integer.coerce(0, " 7.0 ").unwrap(), Label::Integer(7));
        assert_eq!(LabelType::Float.coerce(0, "0.25").unwrap(), Label::Float(0.25));
        assert_eq!(
            LabelType::String.coerce(0, " kick ").unwrap(),
            Label::Text("kick".into())
        );
    }

    #[test]
    fn rejects_uncoercible_responses() {
        for (label_type, response) in [
            (LabelType::Integer, "5.5"),
            (LabelType::Integer, "five"),
            (LabelType::Float, "nan"),
            (LabelType::Float, "inf"),
            (LabelType::String, "   "),
        ] {
            let err = label_type.coerce(3, response).unwrap_err();
            assert!(
                matches!(err, LabelError::InvalidLabelValue { row: 3, .. }),
                "{label_type} {response:?}: {err}"
            );
        }
    }

    #[test]
    fn agreement_compares_numbers_across_types() {
        assert!(Label::Integer(1).agrees_with(&Value::Integer(1)));
        assert!(Label::Integer(1).agrees_with(&Value::Float(1.0)));
        assert!(Label::Float(2.0).agrees_with(&Value::Integer(2)));
        assert!(!Label::Float(2.5).agrees_with(&Value::Integer(2)));
        assert!(Label::Text("a".into()).agrees_with(&Value::Text("a".into())));
        assert!(!Label::Text("1".into()).agrees_with(&Value::Integer(1)));
        assert!(!Label::Integer(1).agrees_with(&Value::Null));
    }
}
