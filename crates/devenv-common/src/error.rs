//! Error types shared across devenv crates
//!
//! Document and metadata errors carry enough context (resource kind, object
//! name) to point an operator at the offending manifest.

use thiserror::Error;

/// Main error type for devenv document handling
#[derive(Debug, Error)]
pub enum Error {
    /// A document parsed but describes something invalid
    #[error("validation error for {resource}: {message}")]
    Validation {
        /// Resource the error refers to (e.g. "Pod/dev", "document 2")
        resource: String,
        /// Description of what's invalid
        message: String,
    },

    /// Malformed YAML/JSON or a shape that doesn't match the expected type
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of what failed
        message: String,
        /// The resource kind being (de)serialized, if known
        kind: Option<String>,
    },

    /// Filesystem error reading or writing a document
    #[error("io error on {path}: {source}")]
    Io {
        /// Path that was being accessed
        path: String,
        /// Underlying io error
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a validation error for the given resource
    pub fn validation(resource: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Validation {
            resource: resource.into(),
            message: msg.into(),
        }
    }

    /// Create a serialization error without kind context
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: None,
        }
    }

    /// Create a serialization error for a specific resource kind
    pub fn serialization_for(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: Some(kind.into()),
        }
    }

    /// Create an io error for a path
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::serialization(e.to_string())
    }
}
