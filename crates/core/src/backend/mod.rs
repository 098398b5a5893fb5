//! Statement execution backends.
//!
//! Both backends expose the same capability set through [`QueryExecutor`]:
//! run one statement, probe liveness. [`Backend`] picks one of them from
//! configuration once; callers never branch on the variant again.

use crate::plan::PlanDocument;
use crate::statement::Statement;
use async_trait::async_trait;
use plansweep_common::config::SweepSettings;
use plansweep_error::{ErrorCode, Result, SweepError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

pub mod embedded;
pub mod remote;

pub use embedded::{EmbeddedBackend, EmbeddedEngine};
pub use remote::RemoteBackend;

/// One result row, keyed by column name in column order.
pub type Row = Map<String, Value>;

/// Column descriptor as reported by the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "dataTypeID", default, skip_serializing_if = "Option::is_none")]
    pub data_type_id: Option<u32>,
}

/// Rows and column descriptors returned for a single statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementOutput {
    #[serde(default)]
    pub rows: Vec<Row>,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl StatementOutput {
    /// First value of the first row, where EXPLAIN places its document.
    pub fn first_cell(&self) -> Option<&Value> {
        self.rows.first()?.values().next()
    }
}

#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Run one statement. Engine-side failures come back as
    /// `Execution` errors, transport failures as `Connectivity` errors.
    async fn run_statement(&self, sql: &str) -> Result<StatementOutput>;

    /// Liveness probe.
    async fn ping(&self) -> Result<()>;

    fn name(&self) -> &'static str;
}

/// How plan-eligible statements are wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplainMode {
    /// Planner estimates only; the statement does not run.
    Estimate,
    /// The statement runs and the plan carries measured rows and timings.
    Analyze,
}

impl ExplainMode {
    pub fn for_execution(execute_queries: bool) -> Self {
        if execute_queries {
            Self::Analyze
        } else {
            Self::Estimate
        }
    }

    pub fn wrap(&self, sql: &str) -> String {
        match self {
            Self::Estimate => format!("EXPLAIN (FORMAT JSON) {sql}"),
            Self::Analyze => format!("EXPLAIN (ANALYZE, FORMAT JSON) {sql}"),
        }
    }
}

/// Outcome of running one statement through a backend.
#[derive(Debug)]
pub struct Executed {
    /// The text actually sent to the engine, including any EXPLAIN wrapper.
    pub query: String,
    pub output: Result<StatementOutput>,
    /// Present when the statement was wrapped, succeeded and returned a
    /// decodable document.
    pub plan: Option<PlanDocument>,
}

/// Which backend a sweep runs against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendConfig {
    Embedded,
    /// Remote proxy; `url` falls back to the configured proxy URL.
    Proxy {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::Proxy { url: None }
    }
}

/// The backend implementations available
pub enum Backend {
    Embedded(EmbeddedBackend),
    Remote(Box<RemoteBackend>),
}

impl Backend {
    /// Build the configured backend. The embedded variant needs an engine
    /// handle from the caller.
    pub fn from_config(
        config: &BackendConfig,
        settings: &SweepSettings,
        engine: Option<Arc<dyn EmbeddedEngine>>,
    ) -> Result<Self> {
        match config {
            BackendConfig::Embedded => {
                let engine = engine.ok_or_else(|| {
                    SweepError::new(
                        ErrorCode::EngineUnavailable,
                        "The embedded backend was selected but no engine was provided",
                    )
                    .with_hint("Pass an EmbeddedEngine handle or select the proxy backend")
                })?;
                Ok(Self::Embedded(EmbeddedBackend::new(engine)))
            }
            BackendConfig::Proxy { url } => {
                let mut proxy = settings.proxy.clone();
                if let Some(url) = url {
                    proxy.url = url.clone();
                }
                Ok(Self::Remote(Box::new(RemoteBackend::new(&proxy)?)))
            }
        }
    }

    fn executor(&self) -> &dyn QueryExecutor {
        match self {
            Backend::Embedded(b) => b,
            Backend::Remote(b) => b.as_ref(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.executor().name()
    }

    pub async fn run_statement(&self, sql: &str) -> Result<StatementOutput> {
        self.executor().run_statement(sql).await
    }

    pub async fn ping(&self) -> Result<()> {
        self.executor().ping().await
    }

    /// Run `statement`, wrapping it in EXPLAIN when it is plan-eligible and
    /// `explain` is given, and decode the returned plan document.
    pub async fn execute(&self, statement: &Statement<'_>, explain: Option<ExplainMode>) -> Executed {
        let wrap = explain.filter(|_| statement.is_plan_eligible());
        let query = match wrap {
            Some(mode) => mode.wrap(statement.text),
            None => statement.text.to_string(),
        };

        debug!(backend = self.name(), query = %query, "Running statement");
        let output = self.run_statement(&query).await;

        let plan = match (&output, wrap) {
            (Ok(out), Some(_)) => capture_plan(out),
            _ => None,
        };

        Executed {
            query,
            output,
            plan,
        }
    }
}

fn capture_plan(output: &StatementOutput) -> Option<PlanDocument> {
    let cell = output.first_cell().filter(|cell| is_present(cell))?;
    match PlanDocument::from_cell(cell) {
        Ok(document) => {
            if let Some(shape) = document.shape_error() {
                warn!(error = %shape, "Plan document has an unexpected shape");
            }
            Some(document)
        }
        Err(e) => {
            warn!(error = %e, "Discarding undecodable plan document");
            None
        }
    }
}

/// Null, `false`, zero and the empty string carry no plan.
fn is_present(cell: &Value) -> bool {
    match cell {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_explain_wrapping() {
        let sql = "SELECT * FROM data WHERE key > 10";
        assert_eq!(
            ExplainMode::Estimate.wrap(sql),
            "EXPLAIN (FORMAT JSON) SELECT * FROM data WHERE key > 10"
        );
        assert_eq!(
            ExplainMode::for_execution(true).wrap(sql),
            "EXPLAIN (ANALYZE, FORMAT JSON) SELECT * FROM data WHERE key > 10"
        );
    }

    #[test]
    fn test_first_cell_follows_column_order() {
        let output: StatementOutput = serde_json::from_value(json!({
            "rows": [{"QUERY PLAN": "[]", "other": 1}],
            "fields": [{"name": "QUERY PLAN", "dataTypeID": 114, "tableID": 0}]
        }))
        .unwrap();
        assert_eq!(output.first_cell(), Some(&json!("[]")));
        assert_eq!(output.fields[0].data_type_id, Some(114));
        assert!(StatementOutput::default().first_cell().is_none());
    }

    #[test]
    fn test_capture_plan_skips_empty_cells() {
        let empty: StatementOutput =
            serde_json::from_value(json!({"rows": [{"QUERY PLAN": ""}]})).unwrap();
        assert!(capture_plan(&empty).is_none());

        for falsy in [json!(null), json!(false), json!(0), json!(0.0)] {
            let output: StatementOutput =
                serde_json::from_value(json!({"rows": [{"QUERY PLAN": falsy}]})).unwrap();
            assert!(capture_plan(&output).is_none(), "{falsy} should carry no plan");
        }

        let garbage: StatementOutput =
            serde_json::from_value(json!({"rows": [{"QUERY PLAN": "not json"}]})).unwrap();
        assert!(capture_plan(&garbage).is_none());

        let shapeless: StatementOutput =
            serde_json::from_value(json!({"rows": [{"QUERY PLAN": {"x": 1}}]})).unwrap();
        let doc = capture_plan(&shapeless).unwrap();
        assert!(doc.fingerprint().is_empty());
    }

    #[test]
    fn test_embedded_requires_engine() {
        let err = Backend::from_config(&BackendConfig::Embedded, &SweepSettings::default(), None)
            .err()
            .unwrap();
        assert_eq!(err.code, ErrorCode::EngineUnavailable);
    }

    #[test]
    fn test_backend_config_serde() {
        let cfg: BackendConfig =
            serde_json::from_value(json!({"kind": "proxy", "url": "http://db:4000"})).unwrap();
        assert_eq!(
            cfg,
            BackendConfig::Proxy {
                url: Some("http://db:4000".into())
            }
        );
        let cfg: BackendConfig = serde_json::from_value(json!({"kind": "embedded"})).unwrap();
        assert_eq!(cfg, BackendConfig::Embedded);
    }
}
