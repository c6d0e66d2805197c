//! Index layer of the in-memory store
//!
//! Holds the primary collections and every secondary index:
//! - nodes: NodeId -> Node (insertion ordered)
//! - edges: EdgeId -> Edge (insertion ordered)
//! - node_labels: Label -> {NodeId}
//! - edge_labels: Label -> {EdgeId}
//! - outgoing: source NodeId -> {EdgeId}
//! - incoming: target NodeId -> {EdgeId}
//!
//! Every mutation goes through this type so that the secondary indices never
//! drift from the primary collections. Callers validate ids and endpoints
//! beforehand; the methods here only keep the bookkeeping straight.

use super::edge::Edge;
use super::node::Node;
use super::types::{EdgeId, Label, LabelSet, NodeId};
use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashMap;
use std::hash::Hash;

#[derive(Debug, Default)]
pub(crate) struct GraphIndex {
    nodes: IndexMap<NodeId, Node>,
    edges: IndexMap<EdgeId, Edge>,
    node_labels: FxHashMap<Label, IndexSet<NodeId>>,
    edge_labels: FxHashMap<Label, IndexSet<EdgeId>>,
    outgoing: FxHashMap<NodeId, IndexSet<EdgeId>>,
    incoming: FxHashMap<NodeId, IndexSet<EdgeId>>,
}

impl GraphIndex {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.node_labels.clear();
        self.edge_labels.clear();
        self.outgoing.clear();
        self.incoming.clear();
    }

    // ============================================================
    // Nodes
    // ============================================================

    pub(crate) fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub(crate) fn contains_node(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub(crate) fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Insert a node whose id is not yet present
    pub(crate) fn insert_node(&mut self, node: Node) {
        debug_assert!(!self.nodes.contains_key(&node.id));
        bucket_insert(&mut self.node_labels, &node.labels, &node.id);
        self.nodes.insert(node.id.clone(), node);
    }

    /// Replace an existing node in place, keeping its iteration position
    pub(crate) fn replace_node(&mut self, node: Node) -> Option<Node> {
        let old = self.nodes.get_mut(&node.id)?;
        bucket_remove(&mut self.node_labels, &old.labels, &node.id);
        bucket_insert(&mut self.node_labels, &node.labels, &node.id);
        Some(std::mem::replace(old, node))
    }

    /// Remove a node together with every edge touching it
    pub(crate) fn remove_node(&mut self, id: &NodeId) -> Option<(Node, Vec<Edge>)> {
        if !self.nodes.contains_key(id) {
            return None;
        }

        let mut incident: IndexSet<EdgeId> = self.outgoing.remove(id).unwrap_or_default();
        incident.extend(self.incoming.remove(id).unwrap_or_default());
        let removed_edges = incident
            .iter()
            .filter_map(|edge_id| self.remove_edge(edge_id))
            .collect();

        let node = self.nodes.shift_remove(id)?;
        bucket_remove(&mut self.node_labels, &node.labels, id);
        Some((node, removed_edges))
    }

    /// Nodes carrying the label, in insertion order
    pub(crate) fn nodes_with_label(&self, label: &Label) -> Vec<&Node> {
        match self.node_labels.get(label) {
            Some(ids) => ordered(&self.nodes, ids),
            None => Vec::new(),
        }
    }

    /// Distinct labels present on live nodes, sorted
    pub(crate) fn node_labels(&self) -> Vec<Label> {
        let mut labels: Vec<Label> = self.node_labels.keys().cloned().collect();
        labels.sort();
        labels
    }

    // ============================================================
    // Edges
    // ============================================================

    pub(crate) fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    pub(crate) fn contains_edge(&self, id: &EdgeId) -> bool {
        self.edges.contains_key(id)
    }

    pub(crate) fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub(crate) fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Insert an edge whose id is not yet present and whose endpoints are live
    pub(crate) fn insert_edge(&mut self, edge: Edge) {
        debug_assert!(!self.edges.contains_key(&edge.id));
        debug_assert!(self.nodes.contains_key(&edge.source_id));
        debug_assert!(self.nodes.contains_key(&edge.target_id));
        self.link(&edge);
        self.edges.insert(edge.id.clone(), edge);
    }

    /// Replace an existing edge in place, re-linking it if its endpoints changed
    pub(crate) fn replace_edge(&mut self, edge: Edge) -> Option<Edge> {
        let old = self.edges.get(&edge.id)?.clone();
        self.unlink(&old);
        self.link(&edge);
        let slot = self.edges.get_mut(&edge.id)?;
        Some(std::mem::replace(slot, edge))
    }

    pub(crate) fn remove_edge(&mut self, id: &EdgeId) -> Option<Edge> {
        let edge = self.edges.shift_remove(id)?;
        self.unlink(&edge);
        Some(edge)
    }

    /// Edges carrying the label, in insertion order
    pub(crate) fn edges_with_label(&self, label: &Label) -> Vec<&Edge> {
        match self.edge_labels.get(label) {
            Some(ids) => ordered(&self.edges, ids),
            None => Vec::new(),
        }
    }

    /// Edges leaving the node, in insertion order
    pub(crate) fn outgoing(&self, id: &NodeId) -> Vec<&Edge> {
        match self.outgoing.get(id) {
            Some(ids) => ordered(&self.edges, ids),
            None => Vec::new(),
        }
    }

    /// Edges entering the node, in insertion order
    pub(crate) fn incoming(&self, id: &NodeId) -> Vec<&Edge> {
        match self.incoming.get(id) {
            Some(ids) => ordered(&self.edges, ids),
            None => Vec::new(),
        }
    }

    fn link(&mut self, edge: &Edge) {
        bucket_insert(&mut self.edge_labels, &edge.labels, &edge.id);
        self.outgoing
            .entry(edge.source_id.clone())
            .or_default()
            .insert(edge.id.clone());
        self.incoming
            .entry(edge.target_id.clone())
            .or_default()
            .insert(edge.id.clone());
    }

    fn unlink(&mut self, edge: &Edge) {
        bucket_remove(&mut self.edge_labels, &edge.labels, &edge.id);
        adjacency_remove(&mut self.outgoing, &edge.source_id, &edge.id);
        adjacency_remove(&mut self.incoming, &edge.target_id, &edge.id);
    }

    /// Verify that every secondary index mirrors the primary collections
    #[cfg(test)]
    pub(crate) fn check_consistency(&self) -> Result<(), String> {
        for (label, ids) in &self.node_labels {
            if ids.is_empty() {
                return Err(format!("empty node label bucket {}", label));
            }
            for id in ids {
                match self.nodes.get(id) {
                    Some(node) if node.labels.contains(label) => {}
                    _ => return Err(format!("stale node label entry {} -> {}", label, id)),
                }
            }
        }
        for node in self.nodes.values() {
            for label in &node.labels {
                if !self.node_labels.get(label).is_some_and(|ids| ids.contains(&node.id)) {
                    return Err(format!("node {} missing from label {}", node.id, label));
                }
            }
        }
        for edge in self.edges.values() {
            if !self.nodes.contains_key(&edge.source_id) || !self.nodes.contains_key(&edge.target_id) {
                return Err(format!("edge {} has a dangling endpoint", edge.id));
            }
            if !self.outgoing.get(&edge.source_id).is_some_and(|ids| ids.contains(&edge.id)) {
                return Err(format!("edge {} missing from outgoing index", edge.id));
            }
            if !self.incoming.get(&edge.target_id).is_some_and(|ids| ids.contains(&edge.id)) {
                return Err(format!("edge {} missing from incoming index", edge.id));
            }
            for label in &edge.labels {
                if !self.edge_labels.get(label).is_some_and(|ids| ids.contains(&edge.id)) {
                    return Err(format!("edge {} missing from label {}", edge.id, label));
                }
            }
        }
        let adjacency_entries: usize = self.outgoing.values().map(|ids| ids.len()).sum();
        if adjacency_entries != self.edges.len() {
            return Err("outgoing index size differs from edge count".to_string());
        }
        Ok(())
    }
}

fn bucket_insert<K: Hash + Eq + Clone>(index: &mut FxHashMap<Label, IndexSet<K>>, labels: &LabelSet, id: &K) {
    for label in labels {
        index.entry(label.clone()).or_default().insert(id.clone());
    }
}

fn bucket_remove<K: Hash + Eq>(index: &mut FxHashMap<Label, IndexSet<K>>, labels: &LabelSet, id: &K) {
    for label in labels {
        if let Some(ids) = index.get_mut(label) {
            ids.shift_remove(id);
            if ids.is_empty() {
                index.remove(label);
            }
        }
    }
}

fn adjacency_remove(index: &mut FxHashMap<NodeId, IndexSet<EdgeId>>, node: &NodeId, id: &EdgeId) {
    if let Some(ids) = index.get_mut(node) {
        ids.shift_remove(id);
        if ids.is_empty() {
            index.remove(node);
        }
    }
}

/// Resolve ids against the primary map, ordered by primary insertion position
fn ordered<'a, K: Hash + Eq, V>(primary: &'a IndexMap<K, V>, ids: &IndexSet<K>) -> Vec<&'a V> {
    let mut found: Vec<(usize, &V)> = ids
        .iter()
        .filter_map(|id| primary.get_full(id).map(|(pos, _, value)| (pos, value)))
        .collect();
    found.sort_by_key(|(pos, _)| *pos);
    found.into_iter().map(|(_, value)| value).collect()
}
