//! What `plansweep run` reports, and its human rendering.

use crate::sweep_file::SweepFile;
use owo_colors::OwoColorize;
use plansweep_core::grid::format_value;
use plansweep_core::heatmap::HeatmapGrid;
use plansweep_core::registry::{PlanId, PlanRegistry, RegisteredPlan};
use plansweep_core::sweep::{CombinationMetrics, QueryResult, StatementFailure, SweepOutcome};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Assignment {
    pub combination_key: String,
    pub plan_id: PlanId,
}

#[derive(Debug, Serialize)]
pub struct RunReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub total_executions: usize,
    pub sampled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_count: Option<usize>,
    pub plan_count: usize,
    pub plans: Vec<RegisteredPlan>,
    pub assignments: Vec<Assignment>,
    pub heatmap: HeatmapGrid,
    pub metrics: Vec<CombinationMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_error: Option<StatementFailure>,
    pub failed_statements: usize,
    pub preparation_results: Vec<QueryResult>,
    pub sql_results: Vec<QueryResult>,
    #[serde(skip)]
    labels: (Option<String>, Option<String>),
}

impl RunReport {
    pub fn new(file: &SweepFile, outcome: SweepOutcome, registry: &PlanRegistry) -> Self {
        Self {
            title: file.title.clone(),
            total_executions: outcome.total_executions,
            sampled: outcome.sampled,
            sample_count: outcome.sample_count,
            plan_count: registry.len(),
            plans: registry.plans().to_vec(),
            assignments: registry
                .assignments()
                .map(|(key, plan_id)| Assignment {
                    combination_key: key.to_string(),
                    plan_id,
                })
                .collect(),
            heatmap: HeatmapGrid::from_registry(registry),
            metrics: outcome.metrics,
            first_error: outcome.first_error,
            failed_statements: outcome.failed_statements,
            preparation_results: outcome.preparation_results,
            sql_results: outcome.sql_results,
            labels: (file.dim0_label.clone(), file.dim1_label.clone()),
        }
    }

    pub fn print_human(&self) {
        if let Some(title) = &self.title {
            println!("{}", title.bold());
        }

        match self.sample_count {
            Some(kept) if self.sampled => println!(
                "{} {} {}",
                "Executions:".dimmed(),
                self.total_executions,
                format!("(results sampled: {kept} shown)").dimmed()
            ),
            _ => println!("{} {}", "Executions:".dimmed(), self.total_executions),
        }
        println!(
            "{} {}",
            "Number of different plans:".dimmed(),
            self.plan_count.to_string().bold()
        );

        for plan in &self.plans {
            let fingerprint = if plan.fingerprint.is_empty() {
                "(no plan tree)".to_string()
            } else {
                plan.fingerprint.to_string()
            };
            println!("  {} {}", format!("Plan {}", plan.id).cyan().bold(), fingerprint);
        }

        if !self.heatmap.is_empty() {
            println!();
            self.print_heatmap();
        }

        if let Some(failure) = &self.first_error {
            println!();
            println!(
                "{} {} statement(s) failed; first:",
                "Error:".red().bold(),
                self.failed_statements
            );
            println!("{}", failure.to_string().red());
        }
    }

    fn print_heatmap(&self) {
        let (dim0, dim1) = &self.labels;
        println!(
            "{} {} {}",
            "Plan map".bold(),
            format!("columns: {}", dim0.as_deref().unwrap_or("Dimension 0")).dimmed(),
            format!("rows: {}", dim1.as_deref().unwrap_or("Dimension 1")).dimmed(),
        );

        let header: Vec<String> = self.heatmap.x_axis.iter().map(|x| format_value(*x)).collect();
        let width = header
            .iter()
            .map(String::len)
            .chain(self.plans.iter().map(|p| p.id.to_string().len()))
            .max()
            .unwrap_or(1);
        let labels: Vec<String> = (0..self.heatmap.y_axis.len())
            .filter_map(|row| self.heatmap.row_label(row))
            .collect();
        let label_width = labels.iter().map(String::len).max().unwrap_or(0);

        let mut line = format!("{:label_width$}", "");
        for x in &header {
            line.push_str(&format!(" {x:>width$}"));
        }
        println!("{}", line.dimmed());

        for (label, row) in labels.iter().zip(&self.heatmap.cells) {
            let mut line = format!("{label:label_width$}");
            for id in row {
                let cell = if *id == 0 { "-".to_string() } else { id.to_string() };
                line.push_str(&format!(" {cell:>width$}"));
            }
            println!("{line}");
        }
    }
}
