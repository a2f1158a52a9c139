//! Validator dispatch from raw query values into the typed view.
//!
//! Validators come in unrelated shapes: plain transform functions, schema objects with a
//! `parse` entry point, and run-style schemas that report issues. Instead of a nominal registry,
//! every validator implements [`Validator`] and answers capability queries; dispatch tries the
//! queries in a fixed order (transform, parser, run-schema) and fails closed with
//! [`QueryParamsError::UnknownValidatorKind`] when nothing matches.
//!
//! Parsing is pure: the same raw map and schema always produce the same typed view.

mod builtin;

use std::rc::Rc;

use serde_json::{Map, Value};

use crate::{
    codec::QueryMap,
    error::{QueryParamsError, ValidationError},
};

pub use builtin::{boolean, integer, number, string, string_list, FieldKind, FieldParser};

/// Parsed view of the raw parameters: schema fields parsed, unknown keys passed through.
pub type TypedParams = Map<String, Value>;

/// Field name reported when a whole-object validator cannot be dispatched.
const WHOLE_SCHEMA_FIELD: &str = "*";

/// Schema object exposing a throwing-style `parse` entry point.
pub trait ParseSchema {
    /// Parses `input` (`None` when the parameter is absent).
    fn parse(&self, input: Option<&Value>) -> Result<Value, ValidationError>;
}

/// Result of running a [`RunSchema`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaOutput {
    /// Parsed value when the run succeeded.
    pub value: Option<Value>,
    /// Issues found during the run; non-empty means failure.
    pub issues: Vec<String>,
}

impl SchemaOutput {
    /// Successful output.
    pub fn ok(value: Value) -> Self {
        Self {
            value: Some(value),
            issues: Vec::new(),
        }
    }

    /// Failed output with one issue.
    pub fn issue(issue: impl Into<String>) -> Self {
        Self {
            value: None,
            issues: vec![issue.into()],
        }
    }
}

/// Schema object recognized by an async flag plus a run function that reports issues.
pub trait RunSchema {
    /// Whether the schema only supports asynchronous runs.
    fn is_async(&self) -> bool;

    /// Runs the schema against `input` without throwing.
    fn run(&self, input: Option<&Value>) -> SchemaOutput;
}

/// Capability queries used by dispatch.
///
/// Implementors override whichever query matches their shape and leave the others at `None`.
pub trait Validator {
    /// Plain transform callable. Must tolerate `None` and apply its own defaulting.
    fn as_transform(&self) -> Option<&dyn Fn(Option<&Value>) -> Result<Value, ValidationError>> {
        None
    }

    /// `parse`-style schema object.
    fn as_parser(&self) -> Option<&dyn ParseSchema> {
        None
    }

    /// Run-style schema object.
    fn as_schema(&self) -> Option<&dyn RunSchema> {
        None
    }

    /// Type descriptor used in dispatch errors.
    fn kind_name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }
}

/// Shape resolved for a validator.
#[derive(Clone, Copy)]
pub enum ValidatorKind<'a> {
    /// Plain transform callable.
    Transform(&'a dyn Fn(Option<&Value>) -> Result<Value, ValidationError>),
    /// `parse`-style schema.
    Parser(&'a dyn ParseSchema),
    /// Run-style schema.
    Schema(&'a dyn RunSchema),
}

/// Resolves the validator's shape by probing capabilities in priority order.
pub fn resolve(validator: &dyn Validator) -> Option<ValidatorKind<'_>> {
    if let Some(transform) = validator.as_transform() {
        return Some(ValidatorKind::Transform(transform));
    }
    if let Some(parser) = validator.as_parser() {
        return Some(ValidatorKind::Parser(parser));
    }
    validator.as_schema().map(ValidatorKind::Schema)
}

/// Adapter turning a closure into a transform validator.
pub struct FnValidator<F> {
    transform: F,
}

impl<F> Validator for FnValidator<F>
where
    F: Fn(Option<&Value>) -> Result<Value, ValidationError>,
{
    fn as_transform(&self) -> Option<&dyn Fn(Option<&Value>) -> Result<Value, ValidationError>> {
        Some(&self.transform)
    }

    fn kind_name(&self) -> &str {
        "Function"
    }
}

/// Wraps a plain transform function as a validator.
pub fn from_fn<F>(transform: F) -> FnValidator<F>
where
    F: Fn(Option<&Value>) -> Result<Value, ValidationError>,
{
    FnValidator { transform }
}

/// Validator schema accepted by the store.
#[derive(Clone)]
pub enum QuerySchema {
    /// One validator over the whole raw object; its result is the typed view.
    Whole(Rc<dyn Validator>),
    /// Per-field validators in declaration order.
    Fields(Vec<(String, Rc<dyn Validator>)>),
}

impl Default for QuerySchema {
    fn default() -> Self {
        Self::Fields(Vec::new())
    }
}

impl QuerySchema {
    /// Schema validated by a single whole-object validator.
    pub fn whole(validator: impl Validator + 'static) -> Self {
        Self::Whole(Rc::new(validator))
    }

    /// Empty per-field schema.
    pub fn fields() -> Self {
        Self::Fields(Vec::new())
    }

    /// Adds (or replaces) a per-field validator.
    ///
    /// Adding a field to a whole-object schema turns it into a per-field schema.
    pub fn field(self, key: impl Into<String>, validator: impl Validator + 'static) -> Self {
        let key = key.into();
        let validator: Rc<dyn Validator> = Rc::new(validator);
        let mut fields = match self {
            Self::Fields(fields) => fields,
            Self::Whole(_) => Vec::new(),
        };
        match fields.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = validator,
            None => fields.push((key, validator)),
        }
        Self::Fields(fields)
    }

    /// Declared field names; empty for whole-object schemas.
    pub fn keys(&self) -> Vec<String> {
        match self {
            Self::Whole(_) => Vec::new(),
            Self::Fields(fields) => fields.iter().map(|(key, _)| key.clone()).collect(),
        }
    }

    fn validator(&self, key: &str) -> Option<&Rc<dyn Validator>> {
        match self {
            Self::Whole(_) => None,
            Self::Fields(fields) => fields
                .iter()
                .find(|(existing, _)| existing == key)
                .map(|(_, validator)| validator),
        }
    }
}

/// Parses the raw map through `schema`.
///
/// Whole-object schemas receive the entire raw map and their object result is returned as-is.
/// Per-field schemas parse every declared field (absent ones receive `None`) and pass unknown
/// raw keys through unchanged. Keys keep URL order, followed by schema-only fields.
///
/// # Errors
///
/// Returns [`QueryParamsError::UnknownValidatorKind`] for unrecognized validator shapes and
/// propagates validator failures as [`QueryParamsError::Validation`].
pub fn parse_all(raw: &QueryMap, schema: &QuerySchema) -> Result<TypedParams, QueryParamsError> {
    match schema {
        QuerySchema::Whole(validator) => {
            let input = raw.to_json();
            match parse_value(WHOLE_SCHEMA_FIELD, validator.as_ref(), Some(&input))? {
                Value::Object(typed) => Ok(typed),
                other => Err(ValidationError::new(format!(
                    "whole-object validator returned {} instead of an object",
                    json_kind(&other)
                ))
                .into()),
            }
        }
        QuerySchema::Fields(fields) => {
            let mut typed = TypedParams::new();
            for (key, value) in raw.iter() {
                let input = value.to_json();
                let parsed = match schema.validator(key) {
                    Some(validator) => parse_value(key, validator.as_ref(), Some(&input))?,
                    None => input,
                };
                typed.insert(key.to_string(), parsed);
            }
            for (key, validator) in fields {
                if !raw.contains_key(key) {
                    typed.insert(key.clone(), parse_value(key, validator.as_ref(), None)?);
                }
            }
            Ok(typed)
        }
    }
}

/// Parses one field value through `validator`.
///
/// # Errors
///
/// Returns [`QueryParamsError::UnknownValidatorKind`] when the validator exposes no known
/// capability, otherwise whatever the validator reports.
pub fn parse_value(
    key: &str,
    validator: &dyn Validator,
    input: Option<&Value>,
) -> Result<Value, QueryParamsError> {
    match resolve(validator) {
        Some(ValidatorKind::Transform(transform)) => Ok(transform(input)?),
        Some(ValidatorKind::Parser(parser)) => Ok(parser.parse(input)?),
        Some(ValidatorKind::Schema(schema)) => Ok(run_schema(schema, input)?),
        None => Err(QueryParamsError::UnknownValidatorKind {
            field: key.to_string(),
            kind: validator.kind_name().to_string(),
            value: describe_input(input),
        }),
    }
}

/// Library-agnostic synchronous parse for run-style schemas.
///
/// # Errors
///
/// Fails for async-only schemas and when the run reports issues.
pub fn run_schema(schema: &dyn RunSchema, input: Option<&Value>) -> Result<Value, ValidationError> {
    if schema.is_async() {
        return Err(ValidationError::new(
            "async schemas cannot be used to parse query params synchronously",
        ));
    }
    let output = schema.run(input);
    if !output.issues.is_empty() {
        return Err(ValidationError::with_issues(output.issues));
    }
    Ok(output.value.unwrap_or(Value::Null))
}

fn describe_input(input: Option<&Value>) -> String {
    match input {
        None => "undefined".to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(","),
        Some(other) => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
