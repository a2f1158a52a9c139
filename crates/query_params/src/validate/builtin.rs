//! Built-in `parse`-style field validators with coercion, defaults, and optional handling.

use serde_json::{Number, Value};

use super::{ParseSchema, Validator};
use crate::error::ValidationError;

/// Target shape of a [`FieldParser`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Any single string.
    String,
    /// A finite number coerced from its string form.
    Number,
    /// A whole number coerced from its string form.
    Integer,
    /// `true`/`false` (also `1`/`0` and `on`/`off`).
    Boolean,
    /// One or more strings; a single occurrence becomes a one-element list.
    StringList,
}

/// Field validator exposing the parser capability.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldParser {
    kind: FieldKind,
    default: Option<Value>,
    optional: bool,
}

/// String field.
pub fn string() -> FieldParser {
    FieldParser::new(FieldKind::String)
}

/// Number field coerced from the raw string.
pub fn number() -> FieldParser {
    FieldParser::new(FieldKind::Number)
}

/// Integer field coerced from the raw string.
pub fn integer() -> FieldParser {
    FieldParser::new(FieldKind::Integer)
}

/// Boolean field coerced from the raw string.
pub fn boolean() -> FieldParser {
    FieldParser::new(FieldKind::Boolean)
}

/// Multi-valued string field.
pub fn string_list() -> FieldParser {
    FieldParser::new(FieldKind::StringList)
}

impl FieldParser {
    /// Creates a required parser for `kind`.
    pub const fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            default: None,
            optional: false,
        }
    }

    /// Value used when the parameter is absent.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Absent parameters parse to `null` instead of failing.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Target shape.
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    fn parse_present(&self, value: &Value) -> Result<Value, ValidationError> {
        if self.kind == FieldKind::StringList {
            return parse_list(value);
        }
        let text = match value {
            Value::String(text) => text.as_str(),
            Value::Array(items) => {
                return Err(ValidationError::new(format!(
                    "Expected a single value, received {} values",
                    items.len()
                )))
            }
            other if self.accepts_typed(other) => return Ok(other.clone()),
            other => {
                return Err(ValidationError::new(format!(
                    "Expected {}, received {other}",
                    self.expected()
                )))
            }
        };
        match self.kind {
            FieldKind::String => Ok(Value::String(text.to_string())),
            FieldKind::Number => parse_number(text).map(number_value),
            FieldKind::Integer => {
                let number = parse_number(text)?;
                if number.fract() == 0.0 {
                    Ok(number_value(number))
                } else {
                    Err(ValidationError::new("Expected integer, received float"))
                }
            }
            FieldKind::Boolean => match text.trim() {
                "true" | "1" | "on" => Ok(Value::Bool(true)),
                "false" | "0" | "off" => Ok(Value::Bool(false)),
                _ => Err(ValidationError::new(format!(
                    "Expected boolean, received \"{text}\""
                ))),
            },
            FieldKind::StringList => parse_list(value),
        }
    }

    fn accepts_typed(&self, value: &Value) -> bool {
        match self.kind {
            FieldKind::Number => value.is_number(),
            FieldKind::Integer => value.is_i64() || value.is_u64(),
            FieldKind::Boolean => value.is_boolean(),
            FieldKind::String | FieldKind::StringList => false,
        }
    }

    fn expected(&self) -> &'static str {
        match self.kind {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Integer => "integer",
            FieldKind::Boolean => "boolean",
            FieldKind::StringList => "string list",
        }
    }
}

impl ParseSchema for FieldParser {
    fn parse(&self, input: Option<&Value>) -> Result<Value, ValidationError> {
        match input {
            None | Some(Value::Null) => match &self.default {
                Some(default) => Ok(default.clone()),
                None if self.optional => Ok(Value::Null),
                None => Err(ValidationError::new("Required")),
            },
            Some(value) => self.parse_present(value),
        }
    }
}

impl Validator for FieldParser {
    fn as_parser(&self) -> Option<&dyn ParseSchema> {
        Some(self)
    }

    fn kind_name(&self) -> &str {
        "FieldParser"
    }
}

fn parse_number(text: &str) -> Result<f64, ValidationError> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
        .ok_or_else(|| ValidationError::new("Expected number, received nan"))
}

/// Whole numbers become JSON integers so they serialize without a trailing `.0`.
fn number_value(number: f64) -> Value {
    if number.fract() == 0.0 && number.abs() < i64::MAX as f64 {
        Value::from(number as i64)
    } else {
        Number::from_f64(number).map_or(Value::Null, Value::Number)
    }
}

fn parse_list(value: &Value) -> Result<Value, ValidationError> {
    match value {
        Value::String(text) => Ok(Value::Array(vec![Value::String(text.clone())])),
        Value::Array(items) if items.iter().all(Value::is_string) => Ok(value.clone()),
        other => Err(ValidationError::new(format!(
            "Expected string list, received {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn number_coerces_strings_and_rejects_garbage() {
        let parser = number();
        assert_eq!(parser.parse(Some(&json!("5"))), Ok(json!(5)));
        assert_eq!(parser.parse(Some(&json!("2.5"))), Ok(json!(2.5)));
        assert_eq!(
            parser.parse(Some(&json!("abc"))),
            Err(ValidationError::new("Expected number, received nan"))
        );
        assert_eq!(
            parser.parse(None),
            Err(ValidationError::new("Required"))
        );
    }

    #[test]
    fn defaults_and_optional_apply_only_to_absent_values() {
        assert_eq!(number().with_default(0).parse(None), Ok(json!(0)));
        assert_eq!(string().optional().parse(None), Ok(Value::Null));
        assert_eq!(
            number().with_default(0).parse(Some(&json!("7"))),
            Ok(json!(7))
        );
    }

    #[test]
    fn integer_rejects_fractions() {
        assert_eq!(integer().parse(Some(&json!("12"))), Ok(json!(12)));
        assert!(integer().parse(Some(&json!("1.5"))).is_err());
    }

    #[test]
    fn boolean_accepts_common_spellings() {
        assert_eq!(boolean().parse(Some(&json!("true"))), Ok(json!(true)));
        assert_eq!(boolean().parse(Some(&json!("0"))), Ok(json!(false)));
        assert!(boolean().parse(Some(&json!("maybe"))).is_err());
    }

    #[test]
    fn string_list_promotes_single_values() {
        let parser = string_list().with_default(json!([]));
        assert_eq!(parser.parse(Some(&json!("a"))), Ok(json!(["a"])));
        assert_eq!(parser.parse(Some(&json!(["a", "b"]))), Ok(json!(["a", "b"])));
        assert_eq!(parser.parse(None), Ok(json!([])));
    }

    #[test]
    fn scalar_parsers_reject_repeated_values() {
        assert_eq!(
            string().parse(Some(&json!(["a", "b"]))),
            Err(ValidationError::new(
                "Expected a single value, received 2 values"
            ))
        );
    }
}
