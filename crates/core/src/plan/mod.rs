//! Execution-plan documents and their structural fingerprints.
//!
//! A plan document is the JSON produced by `EXPLAIN (FORMAT JSON)`: an array
//! whose first element carries a `Plan` tree. The tree is decoded once into
//! [`PlanNode`]s; fingerprinting and metric extraction work on that tree
//! rather than on the raw JSON.

mod metrics;
mod node;

pub use metrics::PlanMetrics;
pub use node::{PlanNode, PreOrder};

use plansweep_error::{ErrorCode, Result, SweepError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Joins node labels inside a fingerprint.
pub const FINGERPRINT_SEPARATOR: &str = ">";

/// Field of the first document element holding the plan tree.
pub const PLAN_FIELD: &str = "Plan";

/// A decoded plan document.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanDocument {
    raw: Value,
    root: Option<PlanNode>,
}

impl PlanDocument {
    /// Decode an already-parsed document. A document without the expected
    /// `[{"Plan": ...}]` shape is kept, but has no root.
    pub fn from_value(raw: Value) -> Self {
        let root = raw
            .as_array()
            .and_then(|items| items.first())
            .and_then(|first| first.get(PLAN_FIELD))
            .and_then(PlanNode::from_value);
        Self { raw, root }
    }

    /// Decode the value found in an EXPLAIN result cell. Engines hand the
    /// document over either as JSON text or as structured data.
    pub fn from_cell(cell: &Value) -> Result<Self> {
        match cell {
            Value::String(text) => serde_json::from_str::<Value>(text)
                .map(Self::from_value)
                .map_err(|e| SweepError::parse(format!("Plan document is not valid JSON: {e}"))),
            other => Ok(Self::from_value(other.clone())),
        }
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn root(&self) -> Option<&PlanNode> {
        self.root.as_ref()
    }

    pub fn has_plan(&self) -> bool {
        self.root.is_some()
    }

    /// Describes why the document has no plan tree, if it has none.
    pub fn shape_error(&self) -> Option<SweepError> {
        if self.root.is_some() {
            return None;
        }
        Some(SweepError::new(
            ErrorCode::PlanShape,
            format!("Expected an array whose first element has a '{PLAN_FIELD}' object"),
        ))
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(self.root())
    }

    pub fn metrics(&self) -> PlanMetrics {
        PlanMetrics::from_document(self)
    }

    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.raw).unwrap_or_else(|_| self.raw.to_string())
    }
}

/// Structural signature of a plan: node labels in pre-order, joined by
/// [`FINGERPRINT_SEPARATOR`]. Numeric estimates never take part, so plans
/// differing only in costs or row counts share a fingerprint. The empty
/// fingerprint stands for "no plan".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(root: Option<&PlanNode>) -> Self {
        let labels: Vec<String> = root
            .into_iter()
            .flat_map(PlanNode::walk)
            .filter_map(PlanNode::label)
            .collect();
        Self(labels.join(FINGERPRINT_SEPARATOR))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.split(FINGERPRINT_SEPARATOR).filter(|l| !l.is_empty())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Fingerprint {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn index_scan_plan(total_cost: f64, rows: u64) -> Value {
        json!([{
            "Plan": {
                "Node Type": "Index Scan",
                "Parallel Aware": false,
                "Scan Direction": "Forward",
                "Index Name": "data_key_idx",
                "Relation Name": "data",
                "Alias": "data",
                "Startup Cost": 0.29,
                "Total Cost": total_cost,
                "Plan Rows": rows,
                "Plan Width": 10,
                "Index Cond": "(key > 1000)"
            }
        }])
    }

    fn hash_join_plan() -> Value {
        json!([{
            "Plan": {
                "Node Type": "Hash Join",
                "Join Type": "Left",
                "Total Cost": 3910.0,
                "Plans": [
                    {
                        "Node Type": "Seq Scan",
                        "Parent Relationship": "Outer",
                        "Relation Name": "data",
                        "Alias": "d1"
                    },
                    {
                        "Node Type": "Hash",
                        "Parent Relationship": "Inner",
                        "Plans": [
                            {
                                "Node Type": "Seq Scan",
                                "Relation Name": "data",
                                "Alias": "d2"
                            }
                        ]
                    }
                ]
            },
            "Planning Time": 0.2
        }])
    }

    #[test]
    fn test_single_node_fingerprint() {
        let doc = PlanDocument::from_value(index_scan_plan(4.5, 99_000));
        assert_eq!(doc.fingerprint().as_str(), "Index Scan(data)");
    }

    #[test]
    fn test_nested_fingerprint_is_preorder() {
        let doc = PlanDocument::from_value(hash_join_plan());
        assert_eq!(
            doc.fingerprint().as_str(),
            "Hash Join>Seq Scan(d1)>Hash>Seq Scan(d2)"
        );
        assert_eq!(doc.fingerprint().labels().count(), 4);
    }

    #[test]
    fn test_numeric_estimates_do_not_matter() {
        let a = PlanDocument::from_value(index_scan_plan(4.5, 99_000));
        let b = PlanDocument::from_value(index_scan_plan(1234.75, 3));
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_alias_preferred_over_relation() {
        let doc = PlanDocument::from_value(json!([{
            "Plan": {"Node Type": "Seq Scan", "Relation Name": "orders", "Alias": "o"}
        }]));
        assert_eq!(doc.fingerprint().as_str(), "Seq Scan(o)");

        let relation_only = PlanDocument::from_value(json!([{
            "Plan": {"Node Type": "Seq Scan", "Relation Name": "orders", "Alias": ""}
        }]));
        assert_eq!(relation_only.fingerprint().as_str(), "Seq Scan(orders)");

        let bare = PlanDocument::from_value(json!([{"Plan": {"Node Type": "Result"}}]));
        assert_eq!(bare.fingerprint().as_str(), "Result");
    }

    #[test]
    fn test_traversal_reaches_any_nested_field() {
        // Child plans under an unconventional key and inside nested arrays.
        let doc = PlanDocument::from_value(json!([{
            "Plan": {
                "Node Type": "Append",
                "Subplans Removed": 0,
                "Children": [[{"Node Type": "Seq Scan", "Relation Name": "p1"}]],
                "Extra": {"Node Type": "Materialize", "Output": ["a", "b"]}
            }
        }]));
        assert_eq!(
            doc.fingerprint().as_str(),
            "Append>Seq Scan(p1)>Materialize"
        );
    }

    #[test]
    fn test_field_order_is_preserved() {
        let doc = PlanDocument::from_value(json!([{
            "Plan": {
                "Node Type": "Nested Loop",
                "Zeta": {"Node Type": "Seq Scan", "Alias": "z"},
                "Alpha": {"Node Type": "Seq Scan", "Alias": "a"}
            }
        }]));
        assert_eq!(
            doc.fingerprint().as_str(),
            "Nested Loop>Seq Scan(z)>Seq Scan(a)"
        );
    }

    #[test]
    fn test_malformed_shapes_yield_empty_fingerprint() {
        for raw in [
            json!({"Plan": {"Node Type": "Seq Scan"}}),
            json!([]),
            json!([{"NotPlan": {}}]),
            json!([{"Plan": "Seq Scan"}]),
            json!(null),
        ] {
            let doc = PlanDocument::from_value(raw);
            assert!(doc.fingerprint().is_empty());
            assert!(!doc.has_plan());
            assert_eq!(doc.shape_error().map(|e| e.code), Some(ErrorCode::PlanShape));
        }
    }

    #[test]
    fn test_from_cell_accepts_text_and_structure() {
        let structured = hash_join_plan();
        let text = Value::String(structured.to_string());

        let from_text = PlanDocument::from_cell(&text).unwrap();
        let from_structure = PlanDocument::from_cell(&structured).unwrap();
        assert_eq!(from_text.fingerprint(), from_structure.fingerprint());
        assert_eq!(from_text.raw(), &structured);
    }

    #[test]
    fn test_from_cell_rejects_invalid_json_text() {
        let err = PlanDocument::from_cell(&Value::String("QUERY PLAN\n---".into())).unwrap_err();
        assert_eq!(err.code, ErrorCode::PlanDecode);
    }

    #[test]
    fn test_pretty_json_is_stored_verbatim() {
        let doc = PlanDocument::from_value(json!([{"Plan": {"Node Type": "Result"}}]));
        let pretty = doc.to_pretty_json();
        assert!(pretty.contains("\n"));
        let back: Value = serde_json::from_str(&pretty).unwrap();
        assert_eq!(&back, doc.raw());
    }
}
