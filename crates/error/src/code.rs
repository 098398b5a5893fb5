use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric error codes following PLANSWEEP-XXXX format.
///
/// ## Code Ranges
/// - **1000-1999**: Connectivity errors (remote proxy)
/// - **2000-2999**: Execution errors (statement failed on a backend)
/// - **3000-3999**: Plan parse errors
/// - **4000-4999**: Configuration errors
/// - **5000-5999**: Internal/System errors
///
/// Codes are stable across versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
#[non_exhaustive]
pub enum ErrorCode {
    // === Connectivity Errors (1000-1999) ===
    /// PLANSWEEP-1001: Proxy could not be reached
    ProxyUnreachable = 1001,
    /// PLANSWEEP-1002: Request or probe timed out
    ConnectionTimeout = 1002,
    /// PLANSWEEP-1003: Proxy answered with a non-success HTTP status
    HttpStatus = 1003,
    /// PLANSWEEP-1004: Proxy response body was not the expected JSON
    MalformedResponse = 1004,

    // === Execution Errors (2000-2999) ===
    /// PLANSWEEP-2001: Statement failed on the backend
    StatementFailed = 2001,
    /// PLANSWEEP-2002: Embedded engine is not available
    EngineUnavailable = 2002,

    // === Parse Errors (3000-3999) ===
    /// PLANSWEEP-3001: Plan document is not valid JSON
    PlanDecode = 3001,
    /// PLANSWEEP-3002: Plan document has an unexpected shape
    PlanShape = 3002,

    // === Configuration Errors (4000-4999) ===
    /// PLANSWEEP-4001: Grid bounds or step are unusable
    InvalidGrid = 4001,
    /// PLANSWEEP-4002: A setting failed validation
    InvalidSetting = 4002,
    /// PLANSWEEP-4003: Invalid YAML syntax
    InvalidYaml = 4003,
    /// PLANSWEEP-4004: Proxy URL could not be used
    InvalidProxyUrl = 4004,

    // === Internal Errors (5000-5999) ===
    /// PLANSWEEP-5001: Serialization/deserialization failed
    SerializationFailed = 5001,
    /// PLANSWEEP-5002: Unexpected internal state
    Internal = 5002,

    /// PLANSWEEP-9999: Unknown/unclassified error
    Unknown = 9999,
}

impl ErrorCode {
    /// Get the numeric code value
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Get the formatted code string (e.g., "PLANSWEEP-2001")
    pub fn as_str(&self) -> String {
        format!("PLANSWEEP-{:04}", self.as_u16())
    }

    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self.as_u16() {
            1000..=1999 => ErrorCategory::Connectivity,
            2000..=2999 => ErrorCategory::Execution,
            3000..=3999 => ErrorCategory::Parse,
            4000..=4999 => ErrorCategory::Config,
            _ => ErrorCategory::Internal,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<ErrorCode> for String {
    fn from(code: ErrorCode) -> String {
        code.as_str()
    }
}

impl TryFrom<String> for ErrorCode {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        let num: u16 = s
            .strip_prefix("PLANSWEEP-")
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| "Invalid format".to_string())?;
        Self::try_from(num).map_err(|_| "Unknown code".to_string())
    }
}

impl TryFrom<u16> for ErrorCode {
    type Error = String;

    fn try_from(n: u16) -> std::result::Result<Self, Self::Error> {
        match n {
            1001 => Ok(Self::ProxyUnreachable),
            1002 => Ok(Self::ConnectionTimeout),
            1003 => Ok(Self::HttpStatus),
            1004 => Ok(Self::MalformedResponse),
            2001 => Ok(Self::StatementFailed),
            2002 => Ok(Self::EngineUnavailable),
            3001 => Ok(Self::PlanDecode),
            3002 => Ok(Self::PlanShape),
            4001 => Ok(Self::InvalidGrid),
            4002 => Ok(Self::InvalidSetting),
            4003 => Ok(Self::InvalidYaml),
            4004 => Ok(Self::InvalidProxyUrl),
            5001 => Ok(Self::SerializationFailed),
            5002 => Ok(Self::Internal),
            9999 => Ok(Self::Unknown),
            _ => Err(format!("Unknown error code: {}", n)),
        }
    }
}

/// Error categories for grouping and exit-code mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ErrorCategory {
    Connectivity,
    Execution,
    Parse,
    Config,
    Internal,
}
