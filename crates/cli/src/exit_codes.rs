//! Structured exit codes for machine-readable error handling.
//!
//! Scripts driving sweeps can tell a broken setup from a sweep that ran
//! but hit statement errors.

use plansweep_error::{ErrorCategory, SweepError};

/// Success (standard convention)
pub const SUCCESS: i32 = 0;

/// General error (fallback for unknown errors)
pub const GENERAL_ERROR: i32 = 1;

/// CLI usage error (invalid arguments, unknown demo number)
pub const USAGE_ERROR: i32 = 2;

/// Configuration error (YAML parse failure, invalid grid or settings)
pub const CONFIG_ERROR: i32 = 3;

/// Connection error (proxy unreachable, timeout, HTTP failure status)
pub const CONNECTION_ERROR: i32 = 4;

/// Execution error (a statement failed outside of a sweep)
pub const EXECUTION_ERROR: i32 = 5;

/// A plan document could not be decoded
pub const PARSE_ERROR: i32 = 6;

/// Partial failure (the sweep completed but some statements failed)
pub const PARTIAL_FAILURE: i32 = 8;

pub fn for_category(category: ErrorCategory) -> i32 {
    match category {
        ErrorCategory::Connectivity => CONNECTION_ERROR,
        ErrorCategory::Execution => EXECUTION_ERROR,
        ErrorCategory::Parse => PARSE_ERROR,
        ErrorCategory::Config => CONFIG_ERROR,
        ErrorCategory::Internal => GENERAL_ERROR,
        _ => GENERAL_ERROR,
    }
}

/// Exit code for an error that reached `main`.
pub fn for_error(e: &anyhow::Error) -> i32 {
    if let Some(sweep_err) = e.downcast_ref::<SweepError>() {
        return for_category(sweep_err.category());
    }

    // Configuration loading reports through anyhow contexts.
    let s = format!("{e:#}").to_lowercase();
    if s.contains("usage") || s.contains("argument") {
        return USAGE_ERROR;
    }
    if s.contains("config") || s.contains("yaml") {
        return CONFIG_ERROR;
    }
    GENERAL_ERROR
}
