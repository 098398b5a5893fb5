//! Command to write a sweep file.
//!
//! Writes one of the canned demo sweeps (see `plansweep_core::demo`) as a
//! starting point. Demo 1 is the default.

use crate::output::{self, CommandResponse, OutputFormat};
use crate::sweep_file::SweepFile;
use anyhow::{anyhow, Context, Result};
use plansweep_core::demo::{self, SCENARIO_COUNT};
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Serialize)]
struct InitResult {
    path: String,
    demo: u8,
    title: String,
}

pub async fn init(demo_number: u8, output_path: &Path, force: bool, format: OutputFormat) -> Result<()> {
    let scenario = demo::scenario(demo_number).ok_or_else(|| {
        anyhow!("Invalid argument: demo {demo_number} does not exist (choose 1..={SCENARIO_COUNT})")
    })?;

    if output_path.exists() && !force {
        return Err(anyhow!(
            "Invalid argument: {} already exists; pass --force to overwrite",
            output_path.display()
        ));
    }

    let title = scenario.title.to_string();
    let file = SweepFile::from(scenario);
    let yaml = format!(
        "# plansweep sweep definition (demo {demo_number})\n# Run with: plansweep run {}\n{}",
        output_path.display(),
        file.to_yaml()?
    );
    fs::write(output_path, yaml).with_context(|| format!("Failed to write {:?}", output_path))?;

    if format.is_machine_readable() {
        output::print_response(
            format,
            CommandResponse::success(InitResult {
                path: output_path.display().to_string(),
                demo: demo_number,
                title,
            }),
        )?;
    } else {
        println!("✓ Created {} with demo {}: {}", output_path.display(), demo_number, title);
    }
    Ok(())
}
