use super::PlanDocument;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Cost and cardinality figures of one plan, read from the root node and
/// the document envelope. Actual-execution fields are only present when
/// the statement ran under `EXPLAIN (ANALYZE ...)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub startup_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_rows: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_rows: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_loops: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_total_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planning_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time: Option<f64>,
}

impl PlanMetrics {
    pub fn from_document(document: &PlanDocument) -> Self {
        let envelope = document.raw().as_array().and_then(|items| items.first());
        let envelope_number =
            |key: &str| envelope.and_then(|e| e.get(key)).and_then(Value::as_f64);

        let mut metrics = Self {
            planning_time: envelope_number("Planning Time"),
            execution_time: envelope_number("Execution Time"),
            ..Self::default()
        };

        if let Some(root) = document.root() {
            metrics.startup_cost = root.number("Startup Cost");
            metrics.total_cost = root.number("Total Cost");
            metrics.plan_rows = root.number("Plan Rows");
            metrics.plan_width = root.number("Plan Width");
            metrics.actual_rows = root.number("Actual Rows");
            metrics.actual_loops = root.number("Actual Loops");
            metrics.actual_total_time = root.number("Actual Total Time");
        }
        metrics
    }

    /// True when the plan carries measured (not only estimated) figures.
    pub fn is_actual(&self) -> bool {
        self.actual_rows.is_some() || self.execution_time.is_some()
    }
}
