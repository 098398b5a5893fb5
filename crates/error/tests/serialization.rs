use plansweep_error::{ErrorCode, ErrorContext, SweepError};
use serde_json::Value;

#[test]
fn test_json_serialization() {
    let error = SweepError::new(ErrorCode::HttpStatus, "HTTP error: 503")
        .with_context(ErrorContext::Http {
            url: "http://localhost:4000/query".to_string(),
            status: Some(503),
        })
        .with_hint("Check that the proxy can reach the database");

    let json = error.to_json();
    let v: Value = serde_json::from_str(&json).expect("valid json");

    assert_eq!(v["code"], "PLANSWEEP-1003");
    assert_eq!(v["message"], "HTTP error: 503");
    assert_eq!(v["hint"], "Check that the proxy can reach the database");
    assert_eq!(v["context"]["type"], "http");
    assert_eq!(v["context"]["status"], 503);
}

#[test]
fn test_error_roundtrip() {
    let error = SweepError::execution("syntax error at or near \"SELEC\"").with_context(
        ErrorContext::Statement {
            sql: "SELEC 1".to_string(),
        },
    );

    let de: SweepError = serde_json::from_str(&error.to_json()).expect("valid json");
    assert_eq!(de, error);
}

#[test]
fn test_error_code_parsing() {
    let code: ErrorCode = "PLANSWEEP-1002".to_string().try_into().unwrap();
    assert_eq!(code, ErrorCode::ConnectionTimeout);
}

#[test]
fn test_yaml_error_conversion() {
    let err = serde_yaml::from_str::<Vec<u32>>("[1, 2").unwrap_err();
    let sweep_err: SweepError = err.into();
    assert_eq!(sweep_err.code, ErrorCode::InvalidYaml);
}
