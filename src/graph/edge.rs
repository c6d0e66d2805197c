//! Directed edge of the property graph

use super::property::{PropertyMap, PropertyValue};
use super::types::{EdgeId, Label, LabelSet, NodeId};
use serde::{Deserialize, Serialize};

/// A directed edge in the property graph
///
/// Several edges may connect the same ordered pair of nodes as long as their
/// ids differ; labels usually tell them apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Unique identifier for this edge
    pub id: EdgeId,

    /// Source node (edge goes FROM this node)
    pub source_id: NodeId,

    /// Target node (edge goes TO this node)
    pub target_id: NodeId,

    /// Labels of this edge (e.g., "knows")
    pub labels: LabelSet,

    /// Payload associated with this edge
    pub data: PropertyMap,
}

impl Edge {
    /// Create a new directed edge without labels or payload
    pub fn new(id: impl Into<EdgeId>, source_id: impl Into<NodeId>, target_id: impl Into<NodeId>) -> Self {
        Edge {
            id: id.into(),
            source_id: source_id.into(),
            target_id: target_id.into(),
            labels: LabelSet::new(),
            data: PropertyMap::new(),
        }
    }

    pub fn has_label(&self, label: &Label) -> bool {
        self.labels.contains(label)
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.data.insert(key.into(), value.into());
    }

    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.data.get(key)
    }
}
