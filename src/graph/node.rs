//! Node of the property graph

use super::property::{PropertyMap, PropertyValue};
use super::types::{Label, LabelSet, NodeId};
use serde::{Deserialize, Serialize};

/// A node in the property graph
///
/// Nodes have:
/// - A unique ID
/// - A set of labels (possibly empty)
/// - A payload of key-value pairs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier for this node
    pub id: NodeId,

    /// Labels of this node
    pub labels: LabelSet,

    /// Payload associated with this node
    pub data: PropertyMap,
}

impl Node {
    /// Create a new node without labels or payload
    pub fn new(id: impl Into<NodeId>) -> Self {
        Node {
            id: id.into(),
            labels: LabelSet::new(),
            data: PropertyMap::new(),
        }
    }

    /// Create a new node with labels and payload
    pub fn with_parts(id: NodeId, labels: LabelSet, data: PropertyMap) -> Self {
        Node { id, labels, data }
    }

    /// Check if node has a specific label
    pub fn has_label(&self, label: &Label) -> bool {
        self.labels.contains(label)
    }

    /// Set a payload value
    pub fn set_property(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Option<PropertyValue> {
        self.data.insert(key.into(), value.into())
    }

    /// Get a payload value
    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.data.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_node_without_labels() {
        let node = Node::new("n1");
        assert_eq!(node.id, NodeId::new("n1"));
        assert!(node.labels.is_empty());
        assert!(node.data.is_empty());
    }

    #[test]
    fn test_create_node_multiple_labels() {
        let labels: LabelSet = vec!["Person", "Employee"].into_iter().collect();
        let node = Node::with_parts(NodeId::new("n2"), labels, PropertyMap::new());

        assert_eq!(node.labels.len(), 2);
        assert!(node.has_label(&Label::new("Person")));
        assert!(node.has_label(&Label::new("Employee")));
    }

    #[test]
    fn test_node_properties() {
        let mut node = Node::new("n3");

        node.set_property("name", "Alice");
        node.set_property("age", 30i64);
        let old = node.set_property("age", 31i64);

        assert_eq!(old, Some(PropertyValue::Integer(30)));
        assert_eq!(node.get_property("name").unwrap().as_string(), Some("Alice"));
        assert_eq!(node.get_property("age").unwrap().as_integer(), Some(31));
        assert_eq!(node.data.len(), 2);
    }
}
