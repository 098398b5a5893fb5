//! # plansweep-error
//!
//! Unified error type for the plansweep engine.
//!
//! Every error carries:
//! - A stable numeric code (PLANSWEEP-XXXX) that maps to a category
//! - A human-readable message, kept verbatim from the engine where one exists
//! - Optional structured context and a hint for the operator

mod code;
mod context;
mod convert;

pub use code::{ErrorCategory, ErrorCode};
pub use context::ErrorContext;

use serde::{Deserialize, Serialize};
use std::fmt;

/// The error type shared by every plansweep crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepError {
    /// Numeric error code (e.g., "PLANSWEEP-2001")
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Structured context for programmatic handling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ErrorContext>,

    /// Suggestion for the operator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl SweepError {
    /// Create a new error with code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            hint: None,
        }
    }

    /// A statement failed on the chosen backend (syntax, runtime, constraint violation).
    pub fn execution(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StatementFailed, message)
    }

    /// The remote proxy could not be reached or answered with a failure status.
    pub fn connectivity(code: ErrorCode, message: impl Into<String>) -> Self {
        debug_assert_eq!(code.category(), ErrorCategory::Connectivity);
        Self::new(code, message)
    }

    /// A plan document could not be decoded.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PlanDecode, message)
    }

    /// Invalid caller-supplied configuration.
    pub fn config(code: ErrorCode, message: impl Into<String>) -> Self {
        debug_assert_eq!(code.category(), ErrorCategory::Config);
        Self::new(code, message)
    }

    /// Add structured context
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Add a hint
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn category(&self) -> ErrorCategory {
        self.code.category()
    }

    /// Serialize to JSON for structured output
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            tracing::warn!("Failed to serialize SweepError: {}", e);
            format!(
                r#"{{"code":"{}","message":"Serialization failed"}}"#,
                self.code
            )
        })
    }

    /// Serialize to pretty JSON for logging
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.to_json())
    }
}

impl fmt::Display for SweepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, " (Hint: {})", hint)?;
        }
        Ok(())
    }
}

impl std::error::Error for SweepError {}

/// Result type alias for plansweep operations
pub type Result<T> = std::result::Result<T, SweepError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_error_builder() {
        let err = SweepError::new(ErrorCode::ProxyUnreachable, "connection refused")
            .with_hint("Is the proxy running on port 4000?");

        assert_eq!(err.code, ErrorCode::ProxyUnreachable);
        assert_eq!(err.message, "connection refused");
        assert_eq!(
            err.hint,
            Some("Is the proxy running on port 4000?".to_string())
        );
        assert!(err.context.is_none());
        assert_eq!(err.category(), ErrorCategory::Connectivity);
    }

    #[test]
    fn test_display_implementation() {
        let err = SweepError::execution("relation \"t\" does not exist")
            .with_hint("Run the preparation script first");

        assert_eq!(
            err.to_string(),
            "[PLANSWEEP-2001] relation \"t\" does not exist (Hint: Run the preparation script first)"
        );

        let err_no_hint = SweepError::parse("expected value at line 1 column 1");
        assert_eq!(
            err_no_hint.to_string(),
            "[PLANSWEEP-3001] expected value at line 1 column 1"
        );
    }

    #[test]
    fn test_taxonomy_constructors() {
        assert_eq!(
            SweepError::execution("boom").category(),
            ErrorCategory::Execution
        );
        assert_eq!(
            SweepError::connectivity(ErrorCode::ConnectionTimeout, "slow").category(),
            ErrorCategory::Connectivity
        );
        assert_eq!(SweepError::parse("bad").category(), ErrorCategory::Parse);
        assert_eq!(
            SweepError::config(ErrorCode::InvalidGrid, "step").category(),
            ErrorCategory::Config
        );
    }

    #[test]
    fn test_json_output() {
        let err = SweepError::new(ErrorCode::HttpStatus, "HTTP error: 502");
        let json = err.to_json();

        assert!(json.contains("\"code\":\"PLANSWEEP-1003\""));
        assert!(json.contains("\"message\":\"HTTP error: 502\""));
    }
}
