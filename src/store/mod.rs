//! The store contract
//!
//! [`Store`] is the operation surface every backend implements. All methods
//! are async so that a backend may do I/O; the in-memory [`MemoryStore`]
//! never does. Capabilities a minimal backend may lack (`path_query`,
//! `infer_schema_graph`, `get_node_label_properties`, `edge_count`) have
//! default bodies failing with [`GraphError::NotImplemented`].

pub mod memory;

use crate::adapter::Operation;
use crate::config::StoreConfig;
use crate::graph::{
    BatchOutcome, Edge, EdgeId, EdgeSpec, GraphError, GraphResult, Label, Node, NodeId, NodeSpec,
};
use crate::query::{PathQuery, Predicate, Projection, ResultGraph, SchemaGraph};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};

pub use crate::graph::{DEFAULT_AMOUNT, DEFAULT_EDGES_BETWEEN_AMOUNT};
pub use memory::MemoryStore;

/// Payload keys per node label
pub type LabelProperties = BTreeMap<Label, BTreeSet<String>>;

/// Property graph store
#[async_trait]
pub trait Store: Send + Sync {
    /// Identity of this store
    fn config(&self) -> &StoreConfig;

    /// Remove every node and edge
    async fn clear(&self) -> GraphResult<()>;

    // ============================================================
    // Nodes
    // ============================================================

    async fn create_node(&self, spec: NodeSpec) -> GraphResult<Node>;

    /// Best-effort batch; see [`BatchOutcome`]
    async fn create_nodes(&self, specs: Vec<NodeSpec>) -> GraphResult<BatchOutcome<Node>>;

    async fn update_node(&self, spec: NodeSpec) -> GraphResult<Node>;

    async fn upsert_node(&self, spec: NodeSpec) -> GraphResult<Node>;

    /// Delete a node together with its incident edges
    async fn delete_node(&self, id: &NodeId) -> GraphResult<Node>;

    /// Delete every matching node; returns the deleted ids
    async fn delete_nodes(&self, predicate: Predicate<Node>) -> GraphResult<Vec<NodeId>>;

    async fn get_node(&self, projection: Projection<Node>) -> GraphResult<Option<Node>>;

    async fn node_exists(&self, id: &NodeId) -> GraphResult<bool>;

    async fn node_count(&self, predicate: Option<Predicate<Node>>) -> GraphResult<usize>;

    async fn get_nodes(&self, predicate: Predicate<Node>, amount: usize) -> GraphResult<Vec<Node>>;

    async fn get_nodes_with_label(&self, label: &Label, amount: usize) -> GraphResult<Vec<Node>>;

    async fn get_node_labels(&self) -> GraphResult<Vec<Label>>;

    async fn get_node_label_properties(&self) -> GraphResult<LabelProperties> {
        Err(GraphError::NotImplemented(
            Operation::GetNodeLabelProperties.to_string(),
        ))
    }

    // ============================================================
    // Edges
    // ============================================================

    async fn create_edge(&self, spec: EdgeSpec) -> GraphResult<Edge>;

    async fn update_edge(&self, spec: EdgeSpec) -> GraphResult<Edge>;

    async fn upsert_edge(&self, spec: EdgeSpec) -> GraphResult<Edge>;

    async fn delete_edge(&self, id: &EdgeId) -> GraphResult<Edge>;

    async fn get_edge(&self, projection: Projection<Edge>) -> GraphResult<Option<Edge>>;

    async fn edge_exists(&self, id: &EdgeId) -> GraphResult<bool>;

    async fn edge_count(&self, _predicate: Option<Predicate<Edge>>) -> GraphResult<usize> {
        Err(GraphError::NotImplemented(Operation::EdgeCount.to_string()))
    }

    async fn get_edges_between(
        &self,
        source_id: &NodeId,
        target_id: &NodeId,
        amount: usize,
    ) -> GraphResult<Vec<Edge>>;

    async fn get_edge_between(&self, source_id: &NodeId, target_id: &NodeId) -> GraphResult<Option<Edge>>;

    async fn get_edge_with_label(
        &self,
        source_id: &NodeId,
        target_id: &NodeId,
        label: &Label,
    ) -> GraphResult<Option<Edge>>;

    async fn get_edges_with_label(&self, label: &Label, amount: usize) -> GraphResult<Vec<Edge>>;

    async fn get_edges(&self, predicate: Predicate<Edge>, amount: usize) -> GraphResult<Vec<Edge>>;

    // ============================================================
    // Traversal & analysis
    // ============================================================

    async fn get_downstream_edges(&self, source_id: &NodeId, amount: usize) -> GraphResult<Vec<Edge>>;

    async fn get_upstream_edges(&self, target_id: &NodeId, amount: usize) -> GraphResult<Vec<Edge>>;

    async fn path_query(&self, _query: PathQuery, _amount: usize) -> GraphResult<ResultGraph> {
        Err(GraphError::NotImplemented(Operation::PathQuery.to_string()))
    }

    async fn infer_schema_graph(&self, _cached: bool) -> GraphResult<SchemaGraph> {
        Err(GraphError::NotImplemented(
            Operation::InferSchemaGraph.to_string(),
        ))
    }
}
