//! Structured error types shared across yp-diagnostic crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`YpError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (offending field, sizes, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Returns the offending field recorded in the context, if any.
    pub fn field(&self) -> Option<&str> {
        self.context.get("field").map(String::as_str)
    }
}

/// Canonical error type for the diagnostic engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum YpError {
    /// Rejected inputs, labels or options. Never silently corrected.
    #[error("invalid input: {0}")]
    InvalidInput(ErrorInfo),
    /// Serialization, schema and configuration loading errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
    /// Worker pool and execution errors.
    #[error("execution error: {0}")]
    Execution(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl YpError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            YpError::InvalidInput(info) | YpError::Serde(info) | YpError::Execution(info) => info,
        }
    }

    /// Returns true when the error rejects caller supplied input.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, YpError::InvalidInput(_))
    }
}

/// Builds an [`YpError::InvalidInput`] naming the offending field.
pub fn invalid_input(code: &str, field: &str, message: impl Into<String>) -> YpError {
    YpError::InvalidInput(ErrorInfo::new(code, message.into()).with_context("field", field))
}
