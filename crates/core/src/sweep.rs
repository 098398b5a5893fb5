//! Sweep orchestration.
//!
//! A sweep walks `Idle → Preparing → Running → Completed`. Preparation
//! statements run once, unwrapped. Then every grid combination runs in
//! row-major order, one statement at a time, with plan-eligible statements
//! wrapped in EXPLAIN and their plans routed into the [`PlanRegistry`].
//!
//! No statement failure stops a sweep. Each failure is kept on its
//! [`QueryResult`]; the first one of the whole run is also reported as
//! [`SweepOutcome::first_error`].

use crate::backend::{Backend, Executed, ExplainMode, StatementOutput};
use crate::grid::{CombinationKey, Grid, GridPrecision, GridSpec};
use crate::plan::PlanMetrics;
use crate::registry::{PlanId, PlanRegistry};
use crate::statement::split_statements;
use plansweep_common::config::SweepSettings;
use plansweep_error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// What to sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRequest {
    pub grid: GridSpec,
    /// SQL with `%%DIMENSION0%%` / `%%DIMENSION1%%` placeholders.
    pub template: String,
    /// Statements run once before the grid, never wrapped in EXPLAIN.
    #[serde(default)]
    pub preparation: String,
    /// Wrap with `EXPLAIN (ANALYZE, ...)`, which runs the statements.
    #[serde(default)]
    pub execute_queries: bool,
}

/// Result of one executed statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    /// The text sent to the engine, including any EXPLAIN wrapper.
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<StatementOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Absent for preparation statements.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combination_key: Option<CombinationKey>,
}

impl QueryResult {
    fn from_executed(executed: Executed, combination_key: Option<CombinationKey>) -> Self {
        match executed.output {
            Ok(output) => Self {
                query: executed.query,
                result: Some(output),
                error: None,
                combination_key,
            },
            Err(e) => {
                warn!(query = %executed.query, error = %e, "Statement failed");
                Self {
                    query: executed.query,
                    result: None,
                    error: Some(e.message),
                    combination_key,
                }
            }
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// The first failing statement of a sweep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementFailure {
    pub query: String,
    /// Error message as reported by the backend.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combination_key: Option<CombinationKey>,
}

impl fmt::Display for StatementFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};\nError: {}", self.query, self.message)
    }
}

/// Plan chosen at one combination, with the figures the plan reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinationMetrics {
    pub combination_key: CombinationKey,
    pub plan_id: PlanId,
    #[serde(flatten)]
    pub metrics: PlanMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepOutcome {
    pub preparation_results: Vec<QueryResult>,
    /// Combination results in enumeration order, thinned when sampled.
    pub sql_results: Vec<QueryResult>,
    pub first_error: Option<StatementFailure>,
    /// Failed statements across preparation and every combination,
    /// including combinations left out of `sql_results` by sampling.
    pub failed_statements: usize,
    pub total_executions: usize,
    /// True when `sql_results` holds only an evenly spaced subset.
    pub sampled: bool,
    /// Number of combinations retained when sampled.
    pub sample_count: Option<usize>,
    /// One entry per combination that produced a plan, in enumeration order.
    pub metrics: Vec<CombinationMetrics>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepPhase {
    Idle,
    Preparing,
    Running,
    Completed,
}

impl SweepPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SweepPhase::Idle => "idle",
            SweepPhase::Preparing => "preparing",
            SweepPhase::Running => "running",
            SweepPhase::Completed => "completed",
        }
    }
}

impl fmt::Display for SweepPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Evenly spaced indices `floor(i * (total - 1) / (cap - 1))` for
/// `i in 0..cap`. Only meaningful for `total > cap`.
pub fn sample_indices(total: usize, cap: usize) -> Vec<usize> {
    match cap {
        0 => Vec::new(),
        1 => vec![0],
        _ => {
            let span = (total.saturating_sub(1)) as u128;
            let denominator = (cap - 1) as u128;
            (0..cap)
                .map(|i| (i as u128 * span / denominator) as usize)
                .collect()
        }
    }
}

pub struct SweepEngine {
    backend: Backend,
    settings: SweepSettings,
}

impl SweepEngine {
    pub fn new(backend: Backend, settings: SweepSettings) -> Self {
        debug!(phase = %SweepPhase::Idle, backend = backend.name(), "Sweep engine ready");
        Self { backend, settings }
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn settings(&self) -> &SweepSettings {
        &self.settings
    }

    /// Run a full sweep. `registry` is reset first and holds every plan
    /// and combination assignment afterwards, sampling notwithstanding.
    /// `on_progress(current, total)` fires once after each combination.
    ///
    /// Only an invalid grid is returned as `Err`; statement failures are
    /// reported inside the outcome.
    #[tracing::instrument(skip_all, fields(backend = self.backend.name()))]
    pub async fn run<F>(
        &self,
        request: &SweepRequest,
        registry: &mut PlanRegistry,
        mut on_progress: F,
    ) -> Result<SweepOutcome>
    where
        F: FnMut(usize, usize) + Send,
    {
        request.grid.validate()?;
        let grid = Grid::new(
            request.grid,
            request.template.as_str(),
            GridPrecision::from(&self.settings),
        );
        registry.reset();
        let mut first_error: Option<StatementFailure> = None;

        info!(phase = %SweepPhase::Preparing, "Running preparation");
        let preparation_results = self
            .prepare(&request.preparation, &mut first_error)
            .await;
        let mut failed_statements = preparation_results.iter().filter(|r| r.is_error()).count();

        let total = grid.total();
        let sample = self
            .settings
            .sample_cap
            .filter(|&cap| total > cap)
            .map(|cap| sample_indices(total, cap));
        let mode = ExplainMode::for_execution(request.execute_queries);
        info!(
            phase = %SweepPhase::Running,
            total,
            sampled = sample.is_some(),
            mode = ?mode,
            "Running combinations"
        );

        let mut sql_results = Vec::new();
        let mut metrics: Vec<CombinationMetrics> = Vec::new();

        for combination in &grid {
            let retained = sample
                .as_ref()
                .map_or(true, |s| s.binary_search(&combination.index).is_ok());

            for statement in split_statements(&combination.sql) {
                let executed = self.backend.execute(&statement, Some(mode)).await;

                if let Some(plan) = &executed.plan {
                    let plan_id = registry.get_or_create(&plan.fingerprint(), plan);
                    registry.assign(combination.key.clone(), plan_id)?;
                    record_metrics(&mut metrics, &combination.key, plan_id, plan.metrics());
                }

                let result = QueryResult::from_executed(executed, Some(combination.key.clone()));
                note_failure(&mut first_error, &result);
                if result.is_error() {
                    failed_statements += 1;
                }
                if retained {
                    sql_results.push(result);
                }
            }

            debug!(key = %combination.key, "Combination finished");
            on_progress(combination.index + 1, total);
        }

        let sample_count = sample.as_ref().map(Vec::len);
        info!(
            phase = %SweepPhase::Completed,
            total,
            plans = registry.len(),
            failed = failed_statements,
            "Sweep finished"
        );

        Ok(SweepOutcome {
            preparation_results,
            sql_results,
            first_error,
            failed_statements,
            total_executions: total,
            sampled: sample.is_some(),
            sample_count,
            metrics,
        })
    }

    async fn prepare(
        &self,
        script: &str,
        first_error: &mut Option<StatementFailure>,
    ) -> Vec<QueryResult> {
        let mut results = Vec::new();
        for statement in split_statements(script) {
            let executed = self.backend.execute(&statement, None).await;
            let result = QueryResult::from_executed(executed, None);
            note_failure(first_error, &result);
            results.push(result);
        }
        results
    }
}

fn note_failure(first_error: &mut Option<StatementFailure>, result: &QueryResult) {
    if first_error.is_some() {
        return;
    }
    if let Some(message) = &result.error {
        *first_error = Some(StatementFailure {
            query: result.query.clone(),
            message: message.clone(),
            combination_key: result.combination_key.clone(),
        });
    }
}

// The last plan of a combination wins, as it does in the registry.
fn record_metrics(
    metrics: &mut Vec<CombinationMetrics>,
    key: &CombinationKey,
    plan_id: PlanId,
    plan_metrics: PlanMetrics,
) {
    let entry = CombinationMetrics {
        combination_key: key.clone(),
        plan_id,
        metrics: plan_metrics,
    };
    match metrics.last_mut() {
        Some(last) if &last.combination_key == key => *last = entry,
        _ => metrics.push(entry),
    }
}
