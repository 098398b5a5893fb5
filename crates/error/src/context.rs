//! # Error Contexts
//!
//! Structured metadata attached to errors.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ErrorContext {
    /// The statement text that was sent to the backend
    Statement { sql: String },

    /// Context for connectivity errors (PLANSWEEP-1001..1004)
    Http { url: String, status: Option<u16> },

    /// Context for PLANSWEEP-4001 (InvalidGrid)
    Grid {
        dimension: usize,
        field: String,
        value: f64,
    },

    /// Context for configuration errors
    Config {
        file_path: Option<String>,
        field: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_context_serde_roundtrip() {
        let ctx = ErrorContext::Grid {
            dimension: 1,
            field: "step".to_string(),
            value: 0.0,
        };

        let json = serde_json::to_string(&ctx).unwrap();
        assert!(json.contains("\"type\":\"grid\""));
        let de: ErrorContext = serde_json::from_str(&json).unwrap();
        assert_eq!(de, ctx);
    }
}
