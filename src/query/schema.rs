//! Schema inference
//!
//! Nodes are grouped by their exact label set; each group becomes a schema
//! node. Each distinct (source label set, target label set, edge label)
//! triple among live edges becomes a schema edge. One pass over nodes, one
//! over edges.

use super::GraphSource;
use crate::graph::{Label, NodeId};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A distinct label set observed among nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaNode {
    /// Sorted labels; empty for unlabeled nodes
    pub labels: Vec<Label>,
    /// Union of payload keys of the members
    pub properties: BTreeSet<String>,
    /// Number of member nodes
    pub count: usize,
}

/// An observed connection between two label sets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaEdge {
    pub source: Vec<Label>,
    pub target: Vec<Label>,
    /// `None` for unlabeled edges
    pub label: Option<Label>,
    pub properties: BTreeSet<String>,
    pub count: usize,
}

/// Inferred schema, tagged with the generation it reflects
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaGraph {
    pub nodes: Vec<SchemaNode>,
    pub edges: Vec<SchemaEdge>,
    pub generation: u64,
}

impl SchemaGraph {
    /// Schema node of an exact label set, in any order
    pub fn node(&self, labels: &[&str]) -> Option<&SchemaNode> {
        let mut wanted: Vec<&str> = labels.to_vec();
        wanted.sort_unstable();
        self.nodes.iter().find(|n| {
            n.labels.len() == wanted.len()
                && n.labels.iter().zip(&wanted).all(|(l, w)| l.as_str() == *w)
        })
    }
}

type EdgeKey = (Vec<Label>, Vec<Label>, Option<Label>);

/// Compute the schema of the graph
pub fn infer<G: GraphSource + ?Sized>(graph: &G) -> SchemaGraph {
    let mut groups: BTreeMap<Vec<Label>, (BTreeSet<String>, usize)> = BTreeMap::new();
    let mut label_keys: FxHashMap<&NodeId, Vec<Label>> = FxHashMap::default();

    for node in graph.nodes() {
        let key = node.labels.sorted();
        let entry = groups.entry(key.clone()).or_default();
        entry.0.extend(node.data.keys().cloned());
        entry.1 += 1;
        label_keys.insert(&node.id, key);
    }

    let mut connections: BTreeMap<EdgeKey, (BTreeSet<String>, usize)> = BTreeMap::new();
    for edge in graph.edges() {
        let (Some(source), Some(target)) = (
            label_keys.get(&edge.source_id),
            label_keys.get(&edge.target_id),
        ) else {
            continue;
        };

        let labels: Vec<Option<Label>> = if edge.labels.is_empty() {
            vec![None]
        } else {
            edge.labels.iter().cloned().map(Some).collect()
        };
        for label in labels {
            let entry = connections
                .entry((source.clone(), target.clone(), label))
                .or_default();
            entry.0.extend(edge.data.keys().cloned());
            entry.1 += 1;
        }
    }

    SchemaGraph {
        nodes: groups
            .into_iter()
            .map(|(labels, (properties, count))| SchemaNode {
                labels,
                properties,
                count,
            })
            .collect(),
        edges: connections
            .into_iter()
            .map(|((source, target, label), (properties, count))| SchemaEdge {
                source,
                target,
                label,
                properties,
                count,
            })
            .collect(),
        generation: graph.generation(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeSpec, MemoryGraph, NodeSpec};

    #[test]
    fn test_person_schema() {
        let mut graph = MemoryGraph::new();
        graph
            .create_node(NodeSpec::new().with_label("Person").with_property("name", "a").with_property("age", 1i64))
            .unwrap();
        graph
            .create_node(NodeSpec::new().with_label("Person").with_property("name", "b"))
            .unwrap();
        graph.create_node(NodeSpec::new().with_label("Person")).unwrap();

        let schema = infer(&graph);
        assert_eq!(schema.nodes.len(), 1);
        let person = schema.node(&["Person"]).unwrap();
        assert_eq!(person.count, 3);
        let keys: Vec<&str> = person.properties.iter().map(|s| s.as_str()).collect();
        assert_eq!(keys, vec!["age", "name"]);
        assert!(schema.edges.is_empty());
    }

    #[test]
    fn test_groups_by_exact_label_set() {
        let mut graph = MemoryGraph::new();
        graph.create_node(NodeSpec::new().with_id("a").with_labels(["B", "A"])).unwrap();
        graph.create_node(NodeSpec::new().with_id("b").with_labels(["A", "B"])).unwrap();
        graph.create_node(NodeSpec::new().with_id("c").with_label("A")).unwrap();
        graph.create_node(NodeSpec::new().with_id("d")).unwrap();

        let schema = infer(&graph);
        assert_eq!(schema.nodes.len(), 3);
        assert_eq!(schema.node(&["A", "B"]).unwrap().count, 2);
        assert_eq!(schema.node(&["A"]).unwrap().count, 1);
        assert_eq!(schema.node(&[]).unwrap().count, 1);
    }

    #[test]
    fn test_schema_edges() {
        let mut graph = MemoryGraph::new();
        graph.create_node(NodeSpec::new().with_id("p1").with_label("Person")).unwrap();
        graph.create_node(NodeSpec::new().with_id("p2").with_label("Person")).unwrap();
        graph.create_node(NodeSpec::new().with_id("c").with_label("City")).unwrap();
        graph
            .create_edge(EdgeSpec::new("p1", "c").with_label("livesIn").with_property("since", 2020i64))
            .unwrap();
        graph.create_edge(EdgeSpec::new("p2", "c").with_label("livesIn")).unwrap();
        graph.create_edge(EdgeSpec::new("p1", "p2")).unwrap();
        graph
            .create_edge(EdgeSpec::new("p2", "p1").with_labels(["knows", "likes"]))
            .unwrap();

        let schema = infer(&graph);
        let lives_in = schema
            .edges
            .iter()
            .find(|e| e.label == Some(Label::new("livesIn")))
            .unwrap();
        assert_eq!(lives_in.count, 2);
        assert_eq!(lives_in.source, vec![Label::new("Person")]);
        assert_eq!(lives_in.target, vec![Label::new("City")]);
        assert!(lives_in.properties.contains("since"));

        assert!(schema.edges.iter().any(|e| e.label.is_none() && e.count == 1));
        // one schema edge per label of a multi-labeled edge
        assert_eq!(schema.edges.len(), 4);
    }

    #[test]
    fn test_inference_is_read_only() {
        let mut graph = MemoryGraph::new();
        graph.create_node(NodeSpec::new().with_label("Person")).unwrap();
        let generation = graph.generation();

        let schema = infer(&graph);
        assert_eq!(schema.generation, generation);
        assert_eq!(graph.generation(), generation);
        assert_eq!(graph.node_count(None), 1);
    }
}
