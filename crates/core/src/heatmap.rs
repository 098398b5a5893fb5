//! Projection of combination assignments onto a plan-id matrix.

use crate::grid::{format_value, CombinationKey};
use crate::registry::{PlanId, PlanRegistry};
use serde::Serialize;
use std::cmp::Ordering;
use tracing::debug;

/// Plan ids laid out with one row per distinct y and one column per
/// distinct x, both axes ascending. Cells without an assignment hold `0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HeatmapGrid {
    pub x_axis: Vec<f64>,
    pub y_axis: Vec<f64>,
    pub cells: Vec<Vec<PlanId>>,
}

impl HeatmapGrid {
    pub fn from_assignments<'a, I>(assignments: I) -> Self
    where
        I: IntoIterator<Item = (&'a CombinationKey, PlanId)>,
    {
        let points: Vec<(f64, f64, PlanId)> = assignments
            .into_iter()
            .filter_map(|(key, id)| match key.coordinates() {
                Some((x, y)) => Some((x, y, id)),
                None => {
                    debug!(key = %key, "Skipping combination key without coordinates");
                    None
                }
            })
            .collect();

        let x_axis = sorted_distinct(points.iter().map(|p| p.0));
        let y_axis = sorted_distinct(points.iter().map(|p| p.1));
        let mut cells = vec![vec![0; x_axis.len()]; y_axis.len()];

        for (x, y, id) in points {
            if let (Some(col), Some(row)) = (position(&x_axis, x), position(&y_axis, y)) {
                cells[row][col] = id;
            }
        }

        Self {
            x_axis,
            y_axis,
            cells,
        }
    }

    pub fn from_registry(registry: &PlanRegistry) -> Self {
        Self::from_assignments(registry.assignments())
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, x: f64, y: f64) -> Option<PlanId> {
        let row = position(&self.y_axis, y)?;
        let col = position(&self.x_axis, x)?;
        Some(self.cells[row][col])
    }

    /// Row label in the `Y=<value>` form.
    pub fn row_label(&self, row: usize) -> Option<String> {
        self.y_axis.get(row).map(|y| format!("Y={}", format_value(*y)))
    }
}

fn sorted_distinct(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut values: Vec<f64> = values.collect();
    values.sort_by(f64::total_cmp);
    values.dedup_by(|a, b| a.total_cmp(b) == Ordering::Equal);
    values
}

fn position(axis: &[f64], value: f64) -> Option<usize> {
    axis.binary_search_by(|probe| probe.total_cmp(&value)).ok()
}
