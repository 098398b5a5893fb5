//! Plansweep Core: the execution-sweep engine.
//!
//! Sweeps a templated SQL statement across a one- or two-dimensional
//! parameter grid, asks a backend for the execution plan at every grid
//! point, and tallies which structurally distinct plans appear where.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   combinations   ┌──────────┐
//! │ SweepEngine  │ ───────────────▶ │   Grid   │
//! └──────┬───────┘                  └──────────┘
//!        │ statements
//!        ▼
//! ┌──────────────┐   EXPLAIN ...    ┌──────────────────────┐
//! │   Backend    │ ───────────────▶ │ Embedded │ Remote     │
//! └──────┬───────┘                  └──────────────────────┘
//!        │ plan documents
//!        ▼
//! ┌──────────────┐
//! │ PlanRegistry │  fingerprint → id, combination → id
//! └──────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use plansweep_common::config::SweepSettings;
//! use plansweep_core::backend::{Backend, BackendConfig};
//! use plansweep_core::grid::{GridSpec, Interval};
//! use plansweep_core::registry::PlanRegistry;
//! use plansweep_core::sweep::{SweepEngine, SweepRequest};
//!
//! # async fn run() -> plansweep_error::Result<()> {
//! let settings = SweepSettings::default();
//! let backend = Backend::from_config(&BackendConfig::Proxy { url: None }, &settings, None)?;
//! let engine = SweepEngine::new(backend, settings);
//!
//! let request = SweepRequest {
//!     grid: GridSpec::one_dimensional(Interval::new(0.0, 50_000.0, 1_000.0)),
//!     template: "SELECT * FROM data WHERE key > %%DIMENSION0%%;".to_string(),
//!     preparation: String::new(),
//!     execute_queries: false,
//! };
//!
//! let mut registry = PlanRegistry::new();
//! let outcome = engine.run(&request, &mut registry, |current, total| {
//!     println!("{current}/{total}");
//! }).await?;
//! println!("{} distinct plans, first error: {:?}", registry.len(), outcome.first_error);
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod demo;
pub mod grid;
pub mod heatmap;
pub mod plan;
pub mod registry;
pub mod statement;
pub mod sweep;

pub use grid::{CombinationKey, GridSpec, Interval};
pub use plan::{Fingerprint, PlanDocument, PlanMetrics};
pub use registry::{PlanId, PlanRegistry};
pub use sweep::{QueryResult, StatementFailure, SweepEngine, SweepOutcome, SweepRequest};
