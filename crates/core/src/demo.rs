//! Canned sweeps against a generated `data(key, value)` table.

use crate::grid::{GridSpec, Interval};
use crate::sweep::SweepRequest;
use serde::Serialize;

/// Builds and analyzes a 100 000-row table with an index on `key`.
pub const DEFAULT_PREPARATION_STEPS: &str = "SET enable_seqscan = on;
SET cpu_index_tuple_cost = 0.0005;
DROP TABLE IF EXISTS data;
CREATE TABLE data(key integer, value text);
INSERT INTO data (key, value) SELECT i, i::text FROM generate_series(1, 100000) i;
CREATE INDEX ON data(key);
ANALYZE data;";

pub const DEFAULT_SQL_QUERY: &str = "SELECT * FROM data WHERE key > %%DIMENSION0%%;";

const KEY_THRESHOLD: Interval = Interval::new(0.0, 50_000.0, 1_000.0);
const RANDOM_PAGE_COST: Interval = Interval::new(0.0, 8.0, 0.25);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemoScenario {
    pub number: u8,
    pub title: &'static str,
    /// What dimension 0 varies.
    pub dim0_label: &'static str,
    pub dim1_label: Option<&'static str>,
    pub request: SweepRequest,
}

pub const SCENARIO_COUNT: u8 = 3;

/// Demo `number` (1-based), or `None` when there is no such demo.
pub fn scenario(number: u8) -> Option<DemoScenario> {
    let (title, dim1_label, grid, template) = match number {
        1 => (
            "Index scan vs. sequential scan by key threshold",
            None,
            GridSpec::one_dimensional(KEY_THRESHOLD),
            DEFAULT_SQL_QUERY.to_string(),
        ),
        2 => (
            "Key threshold against random_page_cost",
            Some("random_page_cost"),
            GridSpec::two_dimensional(KEY_THRESHOLD, RANDOM_PAGE_COST),
            format!("SET random_page_cost = %%DIMENSION1%%;\n{DEFAULT_SQL_QUERY}"),
        ),
        3 => (
            "Self-join strategy against random_page_cost",
            Some("random_page_cost"),
            GridSpec::two_dimensional(KEY_THRESHOLD, RANDOM_PAGE_COST),
            "SET random_page_cost = %%DIMENSION1%%;\n\
             SELECT * FROM data d1 LEFT JOIN data d2 ON (d1.key = d2.key) WHERE d1.key > %%DIMENSION0%%;"
                .to_string(),
        ),
        _ => return None,
    };

    Some(DemoScenario {
        number,
        title,
        dim0_label: "WHERE key > X",
        dim1_label,
        request: SweepRequest {
            grid,
            template,
            preparation: DEFAULT_PREPARATION_STEPS.to_string(),
            execute_queries: false,
        },
    })
}

pub fn scenarios() -> Vec<DemoScenario> {
    (1..=SCENARIO_COUNT).filter_map(scenario).collect()
}
