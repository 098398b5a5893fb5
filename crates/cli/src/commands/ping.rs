//! Connectivity probe against the query proxy.

use crate::output::{self, CommandResponse, OutputFormat};
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use plansweep_common::config::AppConfig;
use plansweep_core::backend::{QueryExecutor, RemoteBackend};
use serde::Serialize;
use std::time::Duration;

#[derive(Serialize)]
struct PingResult {
    url: String,
}

pub async fn ping(url: Option<&str>, format: OutputFormat, config: &AppConfig) -> Result<()> {
    let mut settings = config.sweep.proxy.clone();
    if let Some(url) = url {
        settings.url = url.to_string();
    }
    let backend = RemoteBackend::new(&settings)?;

    if format.is_machine_readable() {
        backend.ping().await?;
        return output::print_response(
            format,
            CommandResponse::success(PingResult {
                url: backend.base_url().to_string(),
            }),
        );
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(format!("Pinging {}...", backend.base_url()));
    pb.enable_steady_tick(Duration::from_millis(100));

    match backend.ping().await {
        Ok(()) => {
            pb.finish_with_message(format!("{} Connection successful!", "✔".green()));
            Ok(())
        }
        Err(e) => {
            pb.finish_with_message(format!("{} {}", "✘".red(), e.message));
            Err(e.into())
        }
    }
}
