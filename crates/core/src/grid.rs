//! Parameter grid enumeration.
//!
//! A grid is one or two closed intervals walked with a fixed step. Each
//! grid point ("combination") gets the SQL template with its placeholders
//! substituted and a stable [`CombinationKey`].
//!
//! Steps are accumulated in floating point, so every emitted value is
//! rounded to a fixed number of decimals and the loop accepts values up to
//! `end + tolerance`. Without this `0.0..=0.6` by `0.2` would stop at
//! `0.4` and keys would carry artifacts like `0.6000000000000001`.

use plansweep_common::config::{SweepSettings, DEFAULT_DECIMAL_PLACES, DEFAULT_FLOAT_TOLERANCE};
use plansweep_error::{ErrorCode, ErrorContext, Result, SweepError};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

pub const DIMENSION0_PLACEHOLDER: &str = "%%DIMENSION0%%";
pub const DIMENSION1_PLACEHOLDER: &str = "%%DIMENSION1%%";

/// A closed interval walked from `start` to `end` in increments of `step`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub start: f64,
    pub end: f64,
    pub step: f64,
}

impl Interval {
    pub const fn new(start: f64, end: f64, step: f64) -> Self {
        Self { start, end, step }
    }

    /// Number of values the interval yields under `tolerance`.
    pub fn len(&self, tolerance: f64) -> usize {
        AxisValues::new(*self, tolerance).count()
    }

    pub fn is_empty(&self, tolerance: f64) -> bool {
        self.len(tolerance) == 0
    }

    fn validate(&self, dimension: usize) -> Result<()> {
        for (field, value) in [("start", self.start), ("end", self.end), ("step", self.step)] {
            if !value.is_finite() {
                return Err(invalid_interval(dimension, field, value, "must be a finite number"));
            }
        }
        if self.step <= 0.0 {
            return Err(invalid_interval(
                dimension,
                "step",
                self.step,
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

fn invalid_interval(dimension: usize, field: &str, value: f64, reason: &str) -> SweepError {
    SweepError::config(
        ErrorCode::InvalidGrid,
        format!("Dimension {dimension} {field} {reason} (got {value})"),
    )
    .with_context(ErrorContext::Grid {
        dimension,
        field: field.to_string(),
        value,
    })
}

/// Shape of the sweep: dimension 0 always, dimension 1 when active.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub dim0: Interval,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dim1: Option<Interval>,
}

impl GridSpec {
    pub const fn one_dimensional(dim0: Interval) -> Self {
        Self { dim0, dim1: None }
    }

    pub const fn two_dimensional(dim0: Interval, dim1: Interval) -> Self {
        Self {
            dim0,
            dim1: Some(dim1),
        }
    }

    pub fn is_two_dimensional(&self) -> bool {
        self.dim1.is_some()
    }

    /// Rejects steps and bounds that would make enumeration meaningless or
    /// unbounded. `end < start` is accepted and yields nothing.
    pub fn validate(&self) -> Result<()> {
        self.dim0.validate(0)?;
        if let Some(dim1) = &self.dim1 {
            dim1.validate(1)?;
        }
        Ok(())
    }
}

/// Loop tolerance and rounding applied to grid values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPrecision {
    pub tolerance: f64,
    pub decimal_places: u32,
}

impl Default for GridPrecision {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_FLOAT_TOLERANCE,
            decimal_places: DEFAULT_DECIMAL_PLACES,
        }
    }
}

impl From<&SweepSettings> for GridPrecision {
    fn from(settings: &SweepSettings) -> Self {
        Self {
            tolerance: settings.float_tolerance,
            decimal_places: settings.decimal_places,
        }
    }
}

impl GridPrecision {
    /// Round to `decimal_places` through the decimal text, then normalize `-0` to `0`.
    pub fn round(&self, value: f64) -> f64 {
        let text = format!("{:.*}", self.decimal_places as usize, value);
        text.parse::<f64>().unwrap_or(value) + 0.0
    }
}

/// Shortest decimal text for a grid value: `1000`, `0.25`, `-3`.
pub fn format_value(value: f64) -> String {
    format!("{}", value)
}

/// Identifies a grid point as `"x,y"`; `y` is `0` for one-dimensional sweeps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CombinationKey(String);

impl CombinationKey {
    /// Build a key from already rounded coordinates.
    pub fn new(x: f64, y: f64) -> Self {
        Self(format!("{},{}", format_value(x), format_value(y)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the coordinates back out of the key.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let (x, y) = self.0.split_once(',')?;
        Some((x.trim().parse().ok()?, y.trim().parse().ok()?))
    }
}

impl fmt::Display for CombinationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for CombinationKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CombinationKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

/// Textual, global replacement of both placeholders.
pub fn substitute(template: &str, dim0: &str, dim1: &str) -> String {
    template
        .replace(DIMENSION0_PLACEHOLDER, dim0)
        .replace(DIMENSION1_PLACEHOLDER, dim1)
}

/// One grid point with its substituted SQL.
#[derive(Debug, Clone, PartialEq)]
pub struct Combination {
    /// Position in row-major enumeration order, starting at 0.
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub key: CombinationKey,
    pub sql: String,
}

/// A SQL template bound to a grid shape.
#[derive(Debug, Clone)]
pub struct Grid {
    spec: GridSpec,
    template: String,
    precision: GridPrecision,
}

impl Grid {
    pub fn new(spec: GridSpec, template: impl Into<String>, precision: GridPrecision) -> Self {
        Self {
            spec,
            template: template.into(),
            precision,
        }
    }

    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    /// Total number of combinations, counted without substituting anything.
    pub fn total(&self) -> usize {
        let outer = self.spec.dim0.len(self.precision.tolerance);
        match &self.spec.dim1 {
            Some(dim1) => outer.saturating_mul(dim1.len(self.precision.tolerance)),
            None => outer,
        }
    }

    /// Row-major walk: dimension 0 outer, dimension 1 inner. Each call
    /// starts a fresh walk.
    pub fn iter(&self) -> Combinations<'_> {
        Combinations {
            grid: self,
            outer: AxisValues::new(self.spec.dim0, self.precision.tolerance),
            inner: None,
            current_x: None,
            index: 0,
        }
    }

    fn combination(&self, index: usize, x: f64, y: Option<f64>) -> Combination {
        let x = self.precision.round(x);
        let x_text = format_value(x);
        let (y, y_text) = match y {
            Some(y) => {
                let y = self.precision.round(y);
                (y, format_value(y))
            }
            None => (0.0, String::new()),
        };
        Combination {
            index,
            x,
            y,
            key: CombinationKey::new(x, y),
            sql: substitute(&self.template, &x_text, &y_text),
        }
    }
}

impl<'a> IntoIterator for &'a Grid {
    type Item = Combination;
    type IntoIter = Combinations<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Raw accumulated values of one interval.
#[derive(Debug, Clone)]
struct AxisValues {
    current: f64,
    limit: f64,
    step: f64,
    exhausted: bool,
}

impl AxisValues {
    fn new(interval: Interval, tolerance: f64) -> Self {
        Self {
            current: interval.start,
            limit: interval.end + tolerance,
            step: interval.step,
            exhausted: !(interval.step > 0.0),
        }
    }
}

impl Iterator for AxisValues {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.exhausted || !(self.current <= self.limit) {
            return None;
        }
        let value = self.current;
        let next = self.current + self.step;
        // A step below the float resolution at this magnitude cannot advance.
        if next <= self.current {
            self.exhausted = true;
        }
        self.current = next;
        Some(value)
    }
}

/// Iterator over the combinations of a [`Grid`].
#[derive(Debug, Clone)]
pub struct Combinations<'a> {
    grid: &'a Grid,
    outer: AxisValues,
    inner: Option<AxisValues>,
    current_x: Option<f64>,
    index: usize,
}

impl Iterator for Combinations<'_> {
    type Item = Combination;

    fn next(&mut self) -> Option<Combination> {
        let combination = match self.grid.spec.dim1 {
            None => {
                let x = self.outer.next()?;
                self.grid.combination(self.index, x, None)
            }
            Some(dim1) => loop {
                if let (Some(x), Some(inner)) = (self.current_x, self.inner.as_mut()) {
                    if let Some(y) = inner.next() {
                        break self.grid.combination(self.index, x, Some(y));
                    }
                }
                self.current_x = Some(self.outer.next()?);
                self.inner = Some(AxisValues::new(dim1, self.grid.precision.tolerance));
            },
        };
        self.index += 1;
        Some(combination)
    }
}
