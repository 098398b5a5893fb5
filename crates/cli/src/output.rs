//! Structured output handling for CLI commands.

use plansweep_error::SweepError;
use serde::Serialize;

#[derive(clap::ValueEnum, Clone, Debug, Default, PartialEq, Eq, Copy)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
    Yaml,
}

impl OutputFormat {
    /// Returns true if the output format is intended for machine consumption
    pub fn is_machine_readable(&self) -> bool {
        match self {
            OutputFormat::Human => false,
            OutputFormat::Json | OutputFormat::Yaml => true,
        }
    }
}

/// Envelope around every machine-readable response.
#[derive(Serialize)]
pub struct CommandResponse<T> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<SweepError>,
    pub exit_code: i32,
    #[serde(flatten)]
    pub data: T,
}

impl<T> CommandResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success",
            message: None,
            error: None,
            exit_code: crate::exit_codes::SUCCESS,
            data,
        }
    }

    /// The command ran to completion but reports failures inside `data`.
    pub fn partial(message: String, data: T) -> Self {
        Self {
            status: "partial",
            message: Some(message),
            error: None,
            exit_code: crate::exit_codes::PARTIAL_FAILURE,
            data,
        }
    }

    pub fn error(message: String, error: Option<SweepError>, exit_code: i32, data: T) -> Self {
        Self {
            status: "error",
            message: Some(message),
            error,
            exit_code,
            data,
        }
    }
}

/// Print the output to stdout in the requested format
pub fn print_output<T: Serialize>(format: OutputFormat, data: T) -> anyhow::Result<()> {
    match format {
        // Human-readable output is printed by the commands themselves.
        OutputFormat::Human => {}
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&data)?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(&data)?;
            println!("{}", yaml);
        }
    }
    Ok(())
}

pub fn print_response<T: Serialize>(
    format: OutputFormat,
    response: CommandResponse<T>,
) -> anyhow::Result<()> {
    if format == OutputFormat::Human {
        return Ok(());
    }
    print_output(format, response)
}

/// Print a structured error response for machine outputs.
/// In Human mode, errors are printed to stderr by main's error handler.
pub fn print_error(format: OutputFormat, e: &anyhow::Error, exit_code: i32) -> anyhow::Result<()> {
    let structured = e.downcast_ref::<SweepError>().cloned();
    let message = match &structured {
        Some(err) => err.message.clone(),
        None => format!("{e:#}"),
    };
    print_response(
        format,
        CommandResponse::error(message, structured, exit_code, serde_json::Map::new()),
    )
}
