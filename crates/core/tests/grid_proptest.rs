use plansweep_core::grid::{Grid, GridPrecision, GridSpec, Interval};
use plansweep_core::plan::PlanDocument;
use proptest::prelude::*;
use serde_json::json;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_count_matches_enumeration(
        start in -50i32..50,
        steps in 0u32..40,
        step_hundredths in 1u32..400,
        inner_steps in proptest::option::of(0u32..6),
    ) {
        let step = f64::from(step_hundredths) / 100.0;
        let start = f64::from(start);
        let end = start + step * f64::from(steps);
        let dim1 = inner_steps.map(|n| Interval::new(0.0, 0.25 * f64::from(n), 0.25));

        let spec = match dim1 {
            Some(inner) => GridSpec::two_dimensional(Interval::new(start, end, step), inner),
            None => GridSpec::one_dimensional(Interval::new(start, end, step)),
        };
        let grid = Grid::new(spec, "SELECT %%DIMENSION0%%, '%%DIMENSION1%%'", GridPrecision::default());
        let combinations: Vec<_> = grid.iter().collect();

        // Endpoints reached exactly despite accumulated error.
        let outer = steps as usize + 1;
        let inner = inner_steps.map_or(1, |n| n as usize + 1);
        prop_assert_eq!(grid.total(), outer * inner);
        prop_assert_eq!(combinations.len(), grid.total());

        for (i, combination) in combinations.iter().enumerate() {
            prop_assert_eq!(combination.index, i);
            prop_assert!(!combination.sql.contains("%%"));
            let (x, y) = combination.key.coordinates().unwrap();
            prop_assert_eq!(x, combination.x);
            prop_assert_eq!(y, combination.y);
        }

        // Keys are unique.
        let mut keys: Vec<_> = combinations.iter().map(|c| c.key.clone()).collect();
        keys.sort();
        keys.dedup();
        prop_assert_eq!(keys.len(), combinations.len());
    }

    #[test]
    fn test_fingerprint_ignores_numeric_fields(
        cost_a in 0.0f64..1e6,
        cost_b in 0.0f64..1e6,
        rows_a in 0u64..1_000_000,
        rows_b in 0u64..1_000_000,
    ) {
        let doc = |cost: f64, rows: u64| PlanDocument::from_value(json!([{
            "Plan": {
                "Node Type": "Bitmap Heap Scan",
                "Relation Name": "data",
                "Total Cost": cost,
                "Plan Rows": rows,
                "Plans": [{"Node Type": "Bitmap Index Scan", "Index Name": "data_key_idx", "Total Cost": cost / 2.0}]
            }
        }]));
        prop_assert_eq!(doc(cost_a, rows_a).fingerprint(), doc(cost_b, rows_b).fingerprint());
    }
}
