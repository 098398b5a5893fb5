//! Common utilities and configuration shared across plansweep crates.
//!
//! - **Configuration**: Strongly typed sweep, proxy and telemetry settings (`config`).
//! - **Telemetry**: `tracing` subscriber setup (`telemetry`).
//! - **Resilience**: Retry with exponential backoff for transient failures (`retry`).
pub mod config;
pub mod retry;
pub mod telemetry;
