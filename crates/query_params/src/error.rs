//! Error types shared by validator dispatch, the store, and the accessor façade.

use thiserror::Error;

/// Failure reported by a validator when raw query input does not satisfy its constraints.
///
/// Validators own this error; the store never wraps or recovers it, so it reaches whoever reads
/// the typed view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Human-readable summary of the failure.
    pub message: String,
    /// Individual issues reported by schema-style validators, in report order.
    pub issues: Vec<String>,
}

impl ValidationError {
    /// Creates an error with a single message and no issue list.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            issues: Vec::new(),
        }
    }

    /// Creates an error from a list of schema issues.
    pub fn with_issues(issues: Vec<String>) -> Self {
        let message = if issues.is_empty() {
            "validation failed".to_string()
        } else {
            issues.join("; ")
        };
        Self { message, issues }
    }
}

/// Errors surfaced by the query-params store and accessors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryParamsError {
    /// A validator exposed none of the recognized capabilities.
    #[error("Unknown validator type ({kind}) for param \"{field}\" (value: {value})")]
    UnknownValidatorKind {
        /// Field the validator was registered under.
        field: String,
        /// Type descriptor of the unrecognized validator.
        kind: String,
        /// Raw input the validator was asked to parse.
        value: String,
    },
    /// The validator rejected its input.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A bulk operation was handed something that is not a key/value object.
    #[error("{operation} expects an object of query params")]
    NotAnObject {
        /// Operation that rejected the value (`set` or `update`).
        operation: &'static str,
    },
    /// A typed value could not be converted into JSON.
    #[error("failed to serialize query param value: {0}")]
    Serialize(String),
    /// A typed read could not convert the parsed value into the requested type.
    #[error("failed to read query param \"{field}\": {message}")]
    Deserialize {
        /// Field being read.
        field: String,
        /// Underlying serde message.
        message: String,
    },
    /// The store cannot be built from the supplied options.
    #[error("invalid query params configuration: {0}")]
    Configuration(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_validator_message_names_field_kind_and_value() {
        let err = QueryParamsError::UnknownValidatorKind {
            field: "value".to_string(),
            kind: "Error".to_string(),
            value: "123".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unknown validator type (Error) for param \"value\" (value: 123)"
        );
    }

    #[test]
    fn validation_errors_pass_through_unchanged() {
        let err: QueryParamsError = ValidationError::new("Expected number, received nan").into();
        assert_eq!(err.to_string(), "Expected number, received nan");
    }
}
