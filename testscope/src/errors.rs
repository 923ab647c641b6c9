//! Error types for the testscope crate.
//!
//! Invalid input is rejected synchronously with [`InvalidArgumentError`];
//! failures raised by a store's value creator are handed back to the caller
//! untouched, and [`TestscopeError::ComputationFailure`] exists for callers that
//! want to fold them into the crate-wide error type.

use std::collections::HashMap;
use thiserror::Error;

/// The main error type for testscope operations.
#[derive(Debug, Error)]
pub enum TestscopeError {
    /// An argument was rejected before any state was touched.
    #[error("{0}")]
    InvalidArgument(#[from] InvalidArgumentError),

    /// A stored value did not have the requested type.
    #[error("{0}")]
    TypeMismatch(#[from] TypeMismatchError),

    /// A unique id could not be parsed.
    #[error("{0}")]
    UniqueId(#[from] UniqueIdError),

    /// A value creator failed; nothing was stored.
    #[error("Computation failed for key {key}: {source}")]
    ComputationFailure {
        /// Debug rendering of the key being computed.
        key: String,
        /// The creator's error.
        #[source]
        source: anyhow::Error,
    },

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TestscopeError {
    /// Wraps a creator failure for the given key.
    #[must_use]
    pub fn computation_failure(key: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::ComputationFailure {
            key: key.into(),
            source: source.into(),
        }
    }

    /// Returns true if this error was raised for invalid input.
    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_) | Self::UniqueId(_))
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = match self {
            Self::InvalidArgument(err) => err.to_dict(),
            Self::TypeMismatch(err) => err.to_dict(),
            Self::UniqueId(err) => {
                let mut map = HashMap::new();
                map.insert("type".to_string(), serde_json::json!("UniqueIdError"));
                map.insert("input".to_string(), serde_json::json!(err.input));
                map
            }
            Self::ComputationFailure { key, .. } => {
                let mut map = HashMap::new();
                map.insert("type".to_string(), serde_json::json!("ComputationFailure"));
                map.insert("key".to_string(), serde_json::json!(key));
                map
            }
            Self::Config(_) => {
                let mut map = HashMap::new();
                map.insert("type".to_string(), serde_json::json!("ConfigError"));
                map
            }
            Self::Serialization(_) => {
                let mut map = HashMap::new();
                map.insert("type".to_string(), serde_json::json!("SerializationError"));
                map
            }
        };
        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        map
    }
}

/// Error raised when an argument violates a precondition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid argument '{argument}': {message}")]
pub struct InvalidArgumentError {
    /// Name of the offending argument.
    pub argument: String,
    /// What was wrong with it.
    pub message: String,
}

impl InvalidArgumentError {
    /// Creates a new invalid argument error.
    #[must_use]
    pub fn new(argument: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            argument: argument.into(),
            message: message.into(),
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("type".to_string(), serde_json::json!("InvalidArgument"));
        map.insert("argument".to_string(), serde_json::json!(self.argument));
        map.insert("message".to_string(), serde_json::json!(self.message));
        map
    }
}

/// Error raised when a typed store accessor finds a value of another type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Object stored under key {key} is not of required type {expected}")]
pub struct TypeMismatchError {
    /// Debug rendering of the key.
    pub key: String,
    /// The requested type name.
    pub expected: &'static str,
}

impl TypeMismatchError {
    /// Creates a new type mismatch error.
    #[must_use]
    pub fn new(key: impl Into<String>, expected: &'static str) -> Self {
        Self {
            key: key.into(),
            expected,
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("type".to_string(), serde_json::json!("TypeMismatch"));
        map.insert("key".to_string(), serde_json::json!(self.key));
        map.insert("expected".to_string(), serde_json::json!(self.expected));
        map
    }
}

/// Error raised when unique id text is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Malformed unique id '{input}': {reason}")]
pub struct UniqueIdError {
    /// The text that failed to parse.
    pub input: String,
    /// Why parsing failed.
    pub reason: String,
}

impl UniqueIdError {
    /// Creates a new unique id error.
    #[must_use]
    pub fn new(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_display() {
        let err = InvalidArgumentError::new("parts", "must not be empty");
        assert_eq!(err.to_string(), "Invalid argument 'parts': must not be empty");
    }

    #[test]
    fn test_invalid_argument_to_dict() {
        let err: TestscopeError = InvalidArgumentError::new("unique_id", "must not be blank").into();
        let dict = err.to_dict();

        assert_eq!(dict.get("type").unwrap(), "InvalidArgument");
        assert_eq!(dict.get("argument").unwrap(), "unique_id");
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_type_mismatch_message() {
        let err = TypeMismatchError::new("\"answer\"", "u32");
        assert!(err.to_string().contains("required type u32"));
        assert_eq!(err.to_dict().get("expected").unwrap(), "u32");
    }

    #[test]
    fn test_computation_failure_keeps_source() {
        let err = TestscopeError::computation_failure("\"db\"", anyhow::anyhow!("connection refused"));

        assert!(err.to_string().contains("connection refused"));
        assert!(std::error::Error::source(&err).is_some());
        assert!(!err.is_invalid_argument());
        assert_eq!(err.to_dict().get("type").unwrap(), "ComputationFailure");
    }

    #[test]
    fn test_unique_id_error_is_invalid_argument() {
        let err: TestscopeError = UniqueIdError::new("[engine", "unterminated segment").into();
        assert!(err.is_invalid_argument());
        assert_eq!(err.to_dict().get("input").unwrap(), "[engine");
    }
}
