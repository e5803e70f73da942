//! Error types for the hanseg library.
//!
//! All errors are represented by the [`HansegError`] enum. Construction
//! failures are wrapped in [`HansegError::Construction`] so that the strategy
//! or model being built is always named in the message, while the helpers
//! [`HansegError::is_configuration`], [`HansegError::is_model_unavailable`]
//! and [`HansegError::is_isolation_violation`] classify the root cause.
//!
//! # Examples
//!
//! ```
//! use hanseg::error::{HansegError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(HansegError::configuration("unknown tokenizer type 'hanlp_fast'"))
//! }
//!
//! let err = example_operation().unwrap_err();
//! assert!(err.is_configuration());
//! ```

use std::io;

use anyhow;
use thiserror::Error;

/// The main error type for hanseg operations.
#[derive(Error, Debug)]
pub enum HansegError {
    /// I/O errors (file operations).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Unknown strategy kind, malformed setting or invalid toggle combination.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A model could not be loaded (missing or corrupt data, timeout).
    #[error("Model '{model}' unavailable: {reason}")]
    ModelUnavailable {
        /// Label of the model that failed.
        model: String,
        /// Why it failed.
        reason: String,
    },

    /// An operation outside the granted scope was attempted during construction.
    #[error("Isolation violation while constructing '{subject}': {operation}")]
    IsolationViolation {
        /// The strategy or model being constructed.
        subject: String,
        /// The rejected operation.
        operation: String,
    },

    /// Failure while constructing a strategy or model.
    #[error("Failed to construct '{subject}': {source}")]
    Construction {
        /// The strategy or model being constructed.
        subject: String,
        /// The underlying failure.
        #[source]
        source: Box<HansegError>,
    },

    /// Analysis-related errors (tokenization, filtering, etc.)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Model data could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with HansegError.
pub type Result<T> = std::result::Result<T, HansegError>;

impl HansegError {
    /// Create a new configuration error.
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        HansegError::Configuration(msg.into())
    }

    /// Create a new model-unavailable error.
    pub fn model_unavailable<M: Into<String>, R: Into<String>>(model: M, reason: R) -> Self {
        HansegError::ModelUnavailable {
            model: model.into(),
            reason: reason.into(),
        }
    }

    /// Create a new isolation violation.
    pub fn isolation_violation<S: Into<String>, O: Into<String>>(subject: S, operation: O) -> Self {
        HansegError::IsolationViolation {
            subject: subject.into(),
            operation: operation.into(),
        }
    }

    /// Wrap an error with the name of the strategy or model being built.
    pub fn construction<S: Into<String>>(subject: S, source: HansegError) -> Self {
        HansegError::Construction {
            subject: subject.into(),
            source: Box::new(source),
        }
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        HansegError::Analysis(msg.into())
    }

    /// Create a new parse error.
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        HansegError::Parse(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        HansegError::Other(msg.into())
    }

    /// The innermost error, looking through [`HansegError::Construction`] wrappers.
    pub fn root(&self) -> &HansegError {
        let mut current = self;
        while let HansegError::Construction { source, .. } = current {
            current = source;
        }
        current
    }

    /// Subjects named by the construction wrappers, outermost first.
    pub fn subjects(&self) -> Vec<&str> {
        let mut subjects = Vec::new();
        let mut current = self;
        while let HansegError::Construction { subject, source } = current {
            subjects.push(subject.as_str());
            current = source;
        }
        subjects
    }

    /// Whether the root cause is a configuration error.
    pub fn is_configuration(&self) -> bool {
        matches!(self.root(), HansegError::Configuration(_))
    }

    /// Whether the root cause is an unavailable model.
    pub fn is_model_unavailable(&self) -> bool {
        matches!(self.root(), HansegError::ModelUnavailable { .. })
    }

    /// Whether the root cause is an isolation violation.
    pub fn is_isolation_violation(&self) -> bool {
        matches!(self.root(), HansegError::IsolationViolation { .. })
    }
}
