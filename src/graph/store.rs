//! In-memory graph storage engine
//!
//! [`MemoryGraph`] implements every store operation synchronously on top of
//! the index layer. It is the innermost link of every call chain; the async
//! [`Store`](crate::store::Store) contract wraps it in
//! [`MemoryStore`](crate::store::MemoryStore).

use super::edge::Edge;
use super::index::GraphIndex;
use super::node::Node;
use super::spec::{EdgeSpec, NodeSpec};
use super::types::{EdgeId, Label, NodeId};
use crate::query::path::{self, PathQuery, ResultGraph};
use crate::query::predicate::{Predicate, Projection};
use crate::query::schema::{self, SchemaGraph};
use crate::query::GraphSource;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::debug;

/// Default cap for list and traversal operations
pub const DEFAULT_AMOUNT: usize = 1000;

/// Default cap for `get_edges_between`
pub const DEFAULT_EDGES_BETWEEN_AMOUNT: usize = 10;

/// Errors that can occur during graph operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Node {0} not found")]
    NodeNotFound(NodeId),

    #[error("Edge {0} not found")]
    EdgeNotFound(EdgeId),

    #[error("Node {0} already exists")]
    NodeAlreadyExists(NodeId),

    #[error("Edge {0} already exists")]
    EdgeAlreadyExists(EdgeId),

    #[error("Invalid edge: source node {0} does not exist")]
    InvalidEdgeSource(NodeId),

    #[error("Invalid edge: target node {0} does not exist")]
    InvalidEdgeTarget(NodeId),

    #[error("Invalid spec: {0}")]
    InvalidSpec(String),

    #[error("Adapter '{name}' failed to initialize: {reason}")]
    AdapterInitFailed { name: String, reason: String },

    #[error("Operation '{0}' is not implemented by this store")]
    NotImplemented(String),

    #[error("Operation '{operation}' received an unexpected {found} response")]
    UnexpectedResponse { operation: String, found: &'static str },
}

/// Coarse classification of [`GraphError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    DuplicateId,
    DanglingReference,
    InvalidSpec,
    AdapterInitFailed,
    NotImplemented,
}

impl GraphError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GraphError::NodeNotFound(_) | GraphError::EdgeNotFound(_) => ErrorKind::NotFound,
            GraphError::NodeAlreadyExists(_) | GraphError::EdgeAlreadyExists(_) => {
                ErrorKind::DuplicateId
            }
            GraphError::InvalidEdgeSource(_) | GraphError::InvalidEdgeTarget(_) => {
                ErrorKind::DanglingReference
            }
            GraphError::InvalidSpec(_) | GraphError::UnexpectedResponse { .. } => {
                ErrorKind::InvalidSpec
            }
            GraphError::AdapterInitFailed { .. } => ErrorKind::AdapterInitFailed,
            GraphError::NotImplemented(_) => ErrorKind::NotImplemented,
        }
    }
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Result of a best-effort batch: what went through and what did not.
///
/// Batches are not transactional. Items that succeeded before a failure stay
/// applied; failures are reported per item with their position in the input.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome<T> {
    pub succeeded: Vec<T>,
    pub failed: Vec<BatchFailure>,
}

/// A failed batch item
#[derive(Debug, Clone, PartialEq)]
pub struct BatchFailure {
    /// Position of the item in the submitted batch
    pub index: usize,
    pub error: GraphError,
}

impl<T> BatchOutcome<T> {
    pub fn new() -> Self {
        BatchOutcome {
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// True when no item failed
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Collapse into the successful items, or the first failure
    pub fn into_result(self) -> GraphResult<Vec<T>> {
        match self.failed.into_iter().next() {
            Some(failure) => Err(failure.error),
            None => Ok(self.succeeded),
        }
    }
}

impl<T> Default for BatchOutcome<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory graph storage
///
/// Iteration order is insertion order for nodes and edges alike. Every
/// mutation bumps a generation counter, which keys the cached schema graph.
#[derive(Debug, Default)]
pub struct MemoryGraph {
    index: GraphIndex,

    /// Bumped on every mutation
    generation: u64,

    /// Last inferred schema, valid while its generation matches
    schema_cache: Option<SchemaGraph>,
}

impl MemoryGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        MemoryGraph {
            index: GraphIndex::new(),
            generation: 0,
            schema_cache: None,
        }
    }

    fn touch(&mut self) {
        self.generation += 1;
    }

    /// Clear all data from the graph
    pub fn clear(&mut self) {
        self.index.clear();
        self.schema_cache = None;
        self.touch();
        debug!("Cleared graph, generation {}", self.generation);
    }

    // ============================================================
    // Nodes
    // ============================================================

    /// Create a node, generating an id when the spec has none
    pub fn create_node(&mut self, spec: NodeSpec) -> GraphResult<Node> {
        let id = spec.id.unwrap_or_else(NodeId::generate);
        if self.index.contains_node(&id) {
            return Err(GraphError::NodeAlreadyExists(id));
        }

        let node = Node::with_parts(id, spec.labels, spec.data);
        self.index.insert_node(node.clone());
        self.touch();
        debug!("Created node {} [{}]", node.id, node.labels);
        Ok(node)
    }

    /// Create nodes one by one; failures do not undo earlier creations
    pub fn create_nodes(&mut self, specs: Vec<NodeSpec>) -> BatchOutcome<Node> {
        let mut outcome = BatchOutcome::new();
        for (index, spec) in specs.into_iter().enumerate() {
            match self.create_node(spec) {
                Ok(node) => outcome.succeeded.push(node),
                Err(error) => outcome.failed.push(BatchFailure { index, error }),
            }
        }
        outcome
    }

    /// Replace the payload and labels of an existing node
    pub fn update_node(&mut self, spec: NodeSpec) -> GraphResult<Node> {
        let id = spec
            .id
            .ok_or_else(|| GraphError::InvalidSpec("updating a node requires an id".to_string()))?;
        if !self.index.contains_node(&id) {
            return Err(GraphError::NodeNotFound(id));
        }

        let node = Node::with_parts(id, spec.labels, spec.data);
        self.index.replace_node(node.clone());
        self.touch();
        debug!("Updated node {} [{}]", node.id, node.labels);
        Ok(node)
    }

    /// Update the node if its id exists, create it otherwise
    pub fn upsert_node(&mut self, spec: NodeSpec) -> GraphResult<Node> {
        let exists = spec.id.as_ref().is_some_and(|id| self.index.contains_node(id));
        if exists {
            self.update_node(spec)
        } else {
            self.create_node(spec)
        }
    }

    /// Delete a node and all its connected edges
    pub fn delete_node(&mut self, id: &NodeId) -> GraphResult<Node> {
        let (node, edges) = self
            .index
            .remove_node(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.clone()))?;
        self.touch();
        debug!("Deleted node {} and {} incident edges", id, edges.len());
        Ok(node)
    }

    /// Delete every node matching the predicate; returns the deleted ids
    pub fn delete_nodes(&mut self, predicate: &Predicate<Node>) -> Vec<NodeId> {
        let ids: Vec<NodeId> = self
            .index
            .nodes()
            .filter(|node| predicate.test(node))
            .map(|node| node.id.clone())
            .collect();

        for id in &ids {
            if let Some((_, edges)) = self.index.remove_node(id) {
                debug!("Deleted node {} and {} incident edges", id, edges.len());
            }
        }
        if !ids.is_empty() {
            self.touch();
        }
        ids
    }

    /// First node matching the projection
    pub fn get_node(&self, projection: &Projection<Node>) -> Option<&Node> {
        match projection {
            Projection::ById(id) => self.index.node(&NodeId::new(id.as_str())),
            Projection::ByPredicate(predicate) => self.index.nodes().find(|n| predicate.test(n)),
            Projection::ByQueryObject(query) => self.index.nodes().find(|n| query.matches(*n)),
        }
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.index.node(id)
    }

    pub fn node_exists(&self, id: &NodeId) -> bool {
        self.index.contains_node(id)
    }

    /// Number of nodes matching the predicate, or all nodes
    pub fn node_count(&self, predicate: Option<&Predicate<Node>>) -> usize {
        match predicate {
            Some(predicate) => self.index.nodes().filter(|n| predicate.test(n)).count(),
            None => self.index.node_count(),
        }
    }

    pub fn get_nodes(&self, predicate: &Predicate<Node>, amount: usize) -> Vec<&Node> {
        self.index
            .nodes()
            .filter(|n| predicate.test(n))
            .take(amount)
            .collect()
    }

    pub fn get_nodes_with_label(&self, label: &Label, amount: usize) -> Vec<&Node> {
        let mut nodes = self.index.nodes_with_label(label);
        nodes.truncate(amount);
        nodes
    }

    pub fn all_nodes(&self) -> Vec<&Node> {
        self.index.nodes().collect()
    }

    /// Distinct labels present on nodes
    pub fn node_labels(&self) -> Vec<Label> {
        self.index.node_labels()
    }

    /// Union of payload keys per node label
    pub fn node_label_properties(&self) -> BTreeMap<Label, BTreeSet<String>> {
        let mut properties: BTreeMap<Label, BTreeSet<String>> = BTreeMap::new();
        for node in self.index.nodes() {
            for label in &node.labels {
                properties
                    .entry(label.clone())
                    .or_default()
                    .extend(node.data.keys().cloned());
            }
        }
        properties
    }

    // ============================================================
    // Edges
    // ============================================================

    fn check_endpoints(&self, source: &NodeId, target: &NodeId) -> GraphResult<()> {
        if !self.index.contains_node(source) {
            return Err(GraphError::InvalidEdgeSource(source.clone()));
        }
        if !self.index.contains_node(target) {
            return Err(GraphError::InvalidEdgeTarget(target.clone()));
        }
        Ok(())
    }

    /// Create an edge between two live nodes
    pub fn create_edge(&mut self, spec: EdgeSpec) -> GraphResult<Edge> {
        let (source_id, target_id) = {
            let (source, target) = spec.endpoints()?;
            (source.clone(), target.clone())
        };
        self.check_endpoints(&source_id, &target_id)?;

        let id = spec.id.unwrap_or_else(EdgeId::generate);
        if self.index.contains_edge(&id) {
            return Err(GraphError::EdgeAlreadyExists(id));
        }

        let edge = Edge {
            id,
            source_id,
            target_id,
            labels: spec.labels,
            data: spec.data,
        };
        self.index.insert_edge(edge.clone());
        self.touch();
        debug!(
            "Created edge {} {} -[{}]-> {}",
            edge.id, edge.source_id, edge.labels, edge.target_id
        );
        Ok(edge)
    }

    /// Replace the payload and labels of an existing edge, re-linking it
    /// when the spec names endpoints
    pub fn update_edge(&mut self, spec: EdgeSpec) -> GraphResult<Edge> {
        let id = spec
            .id
            .ok_or_else(|| GraphError::InvalidSpec("updating an edge requires an id".to_string()))?;
        let existing = self
            .index
            .edge(&id)
            .ok_or_else(|| GraphError::EdgeNotFound(id.clone()))?;

        let source_id = spec.source_id.unwrap_or_else(|| existing.source_id.clone());
        let target_id = spec.target_id.unwrap_or_else(|| existing.target_id.clone());
        self.check_endpoints(&source_id, &target_id)?;

        let edge = Edge {
            id,
            source_id,
            target_id,
            labels: spec.labels,
            data: spec.data,
        };
        self.index.replace_edge(edge.clone());
        self.touch();
        debug!("Updated edge {} [{}]", edge.id, edge.labels);
        Ok(edge)
    }

    /// Update the edge if its id exists, create it otherwise
    pub fn upsert_edge(&mut self, spec: EdgeSpec) -> GraphResult<Edge> {
        let exists = spec.id.as_ref().is_some_and(|id| self.index.contains_edge(id));
        if exists {
            self.update_edge(spec)
        } else {
            self.create_edge(spec)
        }
    }

    pub fn delete_edge(&mut self, id: &EdgeId) -> GraphResult<Edge> {
        let edge = self
            .index
            .remove_edge(id)
            .ok_or_else(|| GraphError::EdgeNotFound(id.clone()))?;
        self.touch();
        debug!("Deleted edge {}", id);
        Ok(edge)
    }

    /// First edge matching the projection
    pub fn get_edge(&self, projection: &Projection<Edge>) -> Option<&Edge> {
        match projection {
            Projection::ById(id) => self.index.edge(&EdgeId::new(id.as_str())),
            Projection::ByPredicate(predicate) => self.index.edges().find(|e| predicate.test(e)),
            Projection::ByQueryObject(query) => self.index.edges().find(|e| query.matches(*e)),
        }
    }

    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.index.edge(id)
    }

    pub fn edge_exists(&self, id: &EdgeId) -> bool {
        self.index.contains_edge(id)
    }

    pub fn edge_count(&self, predicate: Option<&Predicate<Edge>>) -> usize {
        match predicate {
            Some(predicate) => self.index.edges().filter(|e| predicate.test(e)).count(),
            None => self.index.edge_count(),
        }
    }

    /// Directed edges from `source` to `target`
    pub fn get_edges_between(&self, source: &NodeId, target: &NodeId, amount: usize) -> Vec<&Edge> {
        self.index
            .outgoing(source)
            .into_iter()
            .filter(|e| &e.target_id == target)
            .take(amount)
            .collect()
    }

    pub fn get_edge_between(&self, source: &NodeId, target: &NodeId) -> Option<&Edge> {
        self.get_edges_between(source, target, 1).into_iter().next()
    }

    pub fn get_edge_with_label(&self, source: &NodeId, target: &NodeId, label: &Label) -> Option<&Edge> {
        self.index
            .outgoing(source)
            .into_iter()
            .find(|e| &e.target_id == target && e.has_label(label))
    }

    pub fn get_edges_with_label(&self, label: &Label, amount: usize) -> Vec<&Edge> {
        let mut edges = self.index.edges_with_label(label);
        edges.truncate(amount);
        edges
    }

    pub fn get_edges(&self, predicate: &Predicate<Edge>, amount: usize) -> Vec<&Edge> {
        self.index
            .edges()
            .filter(|e| predicate.test(e))
            .take(amount)
            .collect()
    }

    pub fn all_edges(&self) -> Vec<&Edge> {
        self.index.edges().collect()
    }

    // ============================================================
    // Traversal & analysis
    // ============================================================

    /// Edges leaving the node; empty when there are none or the node is unknown
    pub fn get_downstream_edges(&self, source: &NodeId, amount: usize) -> Vec<&Edge> {
        let mut edges = self.index.outgoing(source);
        edges.truncate(amount);
        edges
    }

    /// Edges entering the node; empty when there are none or the node is unknown
    pub fn get_upstream_edges(&self, target: &NodeId, amount: usize) -> Vec<&Edge> {
        let mut edges = self.index.incoming(target);
        edges.truncate(amount);
        edges
    }

    pub fn path_query(&self, query: &PathQuery, amount: usize) -> ResultGraph {
        path::execute(self, query, amount)
    }

    /// Inferred schema; served from cache when `cached` and nothing changed since
    pub fn infer_schema_graph(&mut self, cached: bool) -> SchemaGraph {
        if cached {
            if let Some(schema) = &self.schema_cache {
                if schema.generation == self.generation {
                    return schema.clone();
                }
            }
        }

        let schema = schema::infer(&*self);
        debug!(
            "Inferred schema at generation {}: {} node types, {} edge types",
            schema.generation,
            schema.nodes.len(),
            schema.edges.len()
        );
        self.schema_cache = Some(schema.clone());
        schema
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[cfg(test)]
    pub(crate) fn check_consistency(&self) -> Result<(), String> {
        self.index.check_consistency()
    }
}

impl GraphSource for MemoryGraph {
    fn node(&self, id: &NodeId) -> Option<&Node> {
        self.index.node(id)
    }

    fn nodes(&self) -> Box<dyn Iterator<Item = &Node> + '_> {
        Box::new(self.index.nodes())
    }

    fn nodes_with_label(&self, label: &Label) -> Vec<&Node> {
        self.index.nodes_with_label(label)
    }

    fn edges(&self) -> Box<dyn Iterator<Item = &Edge> + '_> {
        Box::new(self.index.edges())
    }

    fn outgoing(&self, id: &NodeId) -> Vec<&Edge> {
        self.index.outgoing(id)
    }

    fn generation(&self) -> u64 {
        self.generation
    }
}
