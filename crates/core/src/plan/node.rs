use serde_json::{Map, Value};

pub const NODE_TYPE: &str = "Node Type";
pub const ALIAS: &str = "Alias";
pub const RELATION_NAME: &str = "Relation Name";

/// One node of a decoded plan tree.
///
/// Every object- or array-valued field of the source JSON contributes
/// children, in field order, so the tree tolerates plan formats that nest
/// sub-plans under keys other than `Plans`. Scalar fields are kept as
/// attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanNode {
    node_type: Option<String>,
    alias: Option<String>,
    relation_name: Option<String>,
    attributes: Map<String, Value>,
    children: Vec<PlanNode>,
}

impl PlanNode {
    /// Decode a plan tree. An array of several top-level nodes is grouped
    /// under an unlabeled node; scalars yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let mut nodes = Vec::new();
        collect(value, &mut nodes);
        match nodes.len() {
            0 => None,
            1 => nodes.pop(),
            _ => Some(Self {
                children: nodes,
                ..Self::default()
            }),
        }
    }

    fn from_object(map: &Map<String, Value>) -> Self {
        let mut node = Self {
            node_type: non_empty_text(map, NODE_TYPE),
            alias: non_empty_text(map, ALIAS),
            relation_name: non_empty_text(map, RELATION_NAME),
            ..Self::default()
        };
        for (key, value) in map {
            match value {
                Value::Object(_) | Value::Array(_) => collect(value, &mut node.children),
                scalar => {
                    node.attributes.insert(key.clone(), scalar.clone());
                }
            }
        }
        node
    }

    pub fn node_type(&self) -> Option<&str> {
        self.node_type.as_deref()
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn relation_name(&self) -> Option<&str> {
        self.relation_name.as_deref()
    }

    pub fn children(&self) -> &[PlanNode] {
        &self.children
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.attribute(key).and_then(Value::as_f64)
    }

    /// `NodeType`, `NodeType(alias)` or `NodeType(relation)`; nodes without
    /// a type have no label.
    pub fn label(&self) -> Option<String> {
        let node_type = self.node_type.as_deref()?;
        Some(match self.alias.as_deref().or(self.relation_name.as_deref()) {
            Some(target) => format!("{node_type}({target})"),
            None => node_type.to_string(),
        })
    }

    /// Depth-first, pre-order walk starting at this node.
    pub fn walk(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }
}

fn collect(value: &Value, out: &mut Vec<PlanNode>) {
    match value {
        Value::Object(map) => out.push(PlanNode::from_object(map)),
        Value::Array(items) => {
            for item in items {
                collect(item, out);
            }
        }
        _ => {}
    }
}

fn non_empty_text(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub struct PreOrder<'a> {
    stack: Vec<&'a PlanNode>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a PlanNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_children_and_attributes_split() {
        let node = PlanNode::from_value(&json!({
            "Node Type": "Sort",
            "Sort Key": ["key"],
            "Total Cost": 12.5,
            "Plans": [{"Node Type": "Seq Scan", "Relation Name": "data"}]
        }))
        .unwrap();

        assert_eq!(node.node_type(), Some("Sort"));
        assert_eq!(node.number("Total Cost"), Some(12.5));
        assert!(node.attribute("Plans").is_none());
        assert_eq!(node.children().len(), 1);
        assert_eq!(node.children()[0].relation_name(), Some("data"));
    }

    #[test]
    fn test_walk_order() {
        let node = PlanNode::from_value(&json!({
            "Node Type": "A",
            "Plans": [
                {"Node Type": "B", "Plans": [{"Node Type": "C"}]},
                {"Node Type": "D"}
            ]
        }))
        .unwrap();
        let types: Vec<&str> = node.walk().filter_map(PlanNode::node_type).collect();
        assert_eq!(types, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_top_level_array_is_grouped() {
        let node = PlanNode::from_value(&json!([{"Node Type": "A"}, {"Node Type": "B"}])).unwrap();
        assert_eq!(node.label(), None);
        assert_eq!(node.children().len(), 2);
        assert!(PlanNode::from_value(&json!(42)).is_none());
        assert!(PlanNode::from_value(&json!([])).is_none());
    }
}
