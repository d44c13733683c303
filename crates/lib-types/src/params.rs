//! Parameter-tree data model for algorithmic models.
//!
//! Model parameters form a tree: the root is the model's declared name, and
//! every node below it is either a scalar leaf or a named subtree. Branches
//! keep their children in insertion order, and a name maps to exactly one
//! node per branch (a leaf and a subtree never share a name).

use serde::{Deserialize, Serialize};

/// Scalar parameter value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    /// Integer value.
    Integer(i64),

    /// Floating-point value.
    Float(f64),

    /// String value.
    String(String),
}

impl ParamValue {
    /// Try to extract as i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to extract as f64 (integers widen).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Try to extract as string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

/// A node in the parameter tree: a scalar leaf or a named subtree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ParamNode {
    /// Scalar leaf.
    Leaf(ParamValue),

    /// Nested subtree.
    Branch(ParamBranch),
}

impl ParamNode {
    /// Create a leaf node.
    pub fn leaf(value: impl Into<ParamValue>) -> Self {
        Self::Leaf(value.into())
    }

    /// Create an empty subtree node.
    pub fn branch() -> Self {
        Self::Branch(ParamBranch::new())
    }

    /// Try to view as a leaf value.
    pub fn as_value(&self) -> Option<&ParamValue> {
        match self {
            Self::Leaf(v) => Some(v),
            _ => None,
        }
    }

    /// Try to view as a subtree.
    pub fn as_branch(&self) -> Option<&ParamBranch> {
        match self {
            Self::Branch(b) => Some(b),
            _ => None,
        }
    }
}

/// An ordered collection of uniquely-named child nodes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamBranch {
    entries: Vec<(String, ParamNode)>,
}

impl ParamBranch {
    /// Create an empty branch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the branch has no children.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a direct child by name.
    pub fn get(&self, name: &str) -> Option<&ParamNode> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, node)| node)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(n, _)| n == name)
    }

    /// Insert or replace a child. Replacing keeps the child's position.
    pub fn set(&mut self, name: impl Into<String>, node: ParamNode) {
        let name = name.into();
        match self.position(&name) {
            Some(idx) => self.entries[idx].1 = node,
            None => self.entries.push((name, node)),
        }
    }

    /// Iterate children in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamNode)> {
        self.entries.iter().map(|(n, node)| (n.as_str(), node))
    }

    /// Recursively overlay another branch onto this one.
    ///
    /// A leaf override replaces the existing node, a subtree override
    /// recurses into a matching subtree, and an unknown name is appended.
    pub fn merge(&mut self, overlay: &ParamBranch) {
        for (name, node) in overlay.iter() {
            match self.position(name) {
                None => self.entries.push((name.to_string(), node.clone())),
                Some(idx) => match (&mut self.entries[idx].1, node) {
                    (ParamNode::Branch(base), ParamNode::Branch(over)) => base.merge(over),
                    (slot, node) => *slot = node.clone(),
                },
            }
        }
    }
}

/// A complete parameter tree: the model's root name plus its parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParamTree {
    /// Root name; must match the model's declared name.
    pub name: String,

    /// Declared parameters.
    pub params: ParamBranch,
}

impl ParamTree {
    /// Create an empty tree for a model name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: ParamBranch::new(),
        }
    }

    /// Return a copy with an override branch merged in.
    pub fn merged(&self, overlay: &ParamBranch) -> Self {
        let mut tree = self.clone();
        tree.params.merge(overlay);
        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tap_tree() -> ParamTree {
        let mut tree = ParamTree::new("example_tx");
        tree.params.set("tx_tap_units", ParamNode::leaf(27));
        tree.params.set("tx_tap_np1", ParamNode::leaf(4));
        tree.params.set("tx_tap_nm1", ParamNode::leaf(8));
        tree
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut tree = tap_tree();
        tree.params.set("tx_tap_np1", ParamNode::leaf(6));

        let names: Vec<_> = tree.params.iter().map(|(n, _)| n.to_string()).collect();
        assert_eq!(names, ["tx_tap_units", "tx_tap_np1", "tx_tap_nm1"]);
        assert_eq!(
            tree.params.get("tx_tap_np1").and_then(|n| n.as_value()),
            Some(&ParamValue::Integer(6))
        );
    }

    #[test]
    fn test_merge_replaces_and_appends() {
        let tree = tap_tree();

        let mut overlay = ParamBranch::new();
        overlay.set("tx_tap_nm1", ParamNode::leaf(12));
        overlay.set("tx_tap_nm2", ParamNode::leaf(5));

        let merged = tree.merged(&overlay);
        assert_eq!(
            merged.params.get("tx_tap_nm1").and_then(|n| n.as_value()),
            Some(&ParamValue::Integer(12))
        );
        assert_eq!(
            merged.params.get("tx_tap_nm2").and_then(|n| n.as_value()),
            Some(&ParamValue::Integer(5))
        );
        // untouched entries survive
        assert_eq!(
            merged.params.get("tx_tap_units").and_then(|n| n.as_value()),
            Some(&ParamValue::Integer(27))
        );
    }

    #[test]
    fn test_merge_recurses_into_subtrees() {
        let mut tree = ParamTree::new("rx_model");
        let mut ctle = ParamBranch::new();
        ctle.set("dc_gain", ParamNode::leaf(0.0));
        ctle.set("peak_gain", ParamNode::leaf(6.0));
        tree.params.set("ctle", ParamNode::Branch(ctle));

        let mut over_ctle = ParamBranch::new();
        over_ctle.set("peak_gain", ParamNode::leaf(9.0));
        let mut overlay = ParamBranch::new();
        overlay.set("ctle", ParamNode::Branch(over_ctle));

        let merged = tree.merged(&overlay);
        let ctle = merged.params.get("ctle").and_then(|n| n.as_branch()).unwrap();
        assert_eq!(
            ctle.get("dc_gain").and_then(|n| n.as_value()),
            Some(&ParamValue::Float(0.0))
        );
        assert_eq!(
            ctle.get("peak_gain").and_then(|n| n.as_value()),
            Some(&ParamValue::Float(9.0))
        );
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(ParamValue::Integer(5).as_f64(), Some(5.0));
        assert_eq!(ParamValue::Float(2.5).as_i64(), None);
        assert_eq!(ParamValue::from("abc").as_str(), Some("abc"));
    }
}
