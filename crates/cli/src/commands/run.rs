//! Run a sweep file against the query proxy.
//!
//! Returns whether the sweep finished without statement errors; `main`
//! turns `false` into the partial-failure exit code.

use crate::output::{self, CommandResponse, OutputFormat};
use crate::report::RunReport;
use crate::sweep_file::SweepFile;
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use plansweep_common::config::AppConfig;
use plansweep_core::backend::{Backend, BackendConfig};
use plansweep_core::registry::PlanRegistry;
use plansweep_core::sweep::SweepEngine;
use std::path::Path;
use tracing::debug;

pub async fn run(
    file_path: &Path,
    execute: bool,
    url: Option<&str>,
    format: OutputFormat,
    config: &AppConfig,
) -> Result<bool> {
    let mut file = SweepFile::load(file_path)?;
    debug!(path = %file_path.display(), backend = ?file.backend, "Loaded sweep file");
    if execute {
        file.request.execute_queries = true;
    }
    if let Some(url) = url {
        file.backend = BackendConfig::Proxy {
            url: Some(url.to_string()),
        };
    }

    // No embedded engine ships with the CLI.
    let backend = Backend::from_config(&file.backend, &config.sweep, None)?;
    let engine = SweepEngine::new(backend, config.sweep.clone());

    if !format.is_machine_readable() {
        println!(
            "{} {} {}",
            "[Sweep:".dimmed(),
            file_path.display().yellow(),
            format!("] Running against {}...", engine.backend().name()).bold().cyan()
        );
    }

    let pb = if format.is_machine_readable() {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(0);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{bar:40.cyan/blue} {pos}/{len} ({eta})")
        {
            pb.set_style(style);
        }
        pb
    };

    let mut registry = PlanRegistry::new();
    let outcome = engine
        .run(&file.request, &mut registry, |current, total| {
            pb.set_length(total as u64);
            pb.set_position(current as u64);
        })
        .await;
    pb.finish_and_clear();
    let outcome = outcome?;

    let report = RunReport::new(&file, outcome, &registry);
    let clean = report.first_error.is_none();

    if format.is_machine_readable() {
        let response = if clean {
            CommandResponse::success(&report)
        } else {
            CommandResponse::partial(
                format!("{} statement(s) failed", report.failed_statements),
                &report,
            )
        };
        output::print_response(format, response)?;
    } else {
        report.print_human();
    }

    Ok(clean)
}
