//! MemoryStore: the default in-process [`Store`]
//!
//! Wraps a [`MemoryGraph`] behind a tokio `RwLock`. Every operation takes the
//! lock once, so concurrent readers observe either the state before or after
//! a mutation, never a partial one.

use super::{LabelProperties, Store};
use crate::config::StoreConfig;
use crate::graph::{
    BatchOutcome, Edge, EdgeId, EdgeSpec, GraphResult, Label, MemoryGraph, Node, NodeId, NodeSpec,
};
use crate::query::{PathQuery, Predicate, Projection, ResultGraph, SchemaGraph};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// In-memory store over a shared [`MemoryGraph`]
pub struct MemoryStore {
    config: StoreConfig,
    graph: Arc<RwLock<MemoryGraph>>,
}

impl MemoryStore {
    /// Create an empty store with default metadata
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self::with_graph(config, Arc::new(RwLock::new(MemoryGraph::new())))
    }

    /// Create a store over an existing graph
    pub fn with_graph(config: StoreConfig, graph: Arc<RwLock<MemoryGraph>>) -> Self {
        info!("Opened memory store '{}' ({})", config.name, config.id);
        Self { config, graph }
    }

    /// Get a reference to the underlying graph (for direct manipulation)
    pub fn graph(&self) -> &Arc<RwLock<MemoryGraph>> {
        &self.graph
    }

    /// Acquire a read lock on the graph.
    pub async fn graph_read(&self) -> tokio::sync::RwLockReadGuard<'_, MemoryGraph> {
        self.graph.read().await
    }

    /// Acquire a write lock on the graph.
    pub async fn graph_write(&self) -> tokio::sync::RwLockWriteGuard<'_, MemoryGraph> {
        self.graph.write().await
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn owned<T: Clone>(items: Vec<&T>) -> Vec<T> {
    items.into_iter().cloned().collect()
}

#[async_trait]
impl Store for MemoryStore {
    fn config(&self) -> &StoreConfig {
        &self.config
    }

    async fn clear(&self) -> GraphResult<()> {
        self.graph.write().await.clear();
        info!("Cleared store '{}'", self.config.name);
        Ok(())
    }

    async fn create_node(&self, spec: NodeSpec) -> GraphResult<Node> {
        self.graph.write().await.create_node(spec)
    }

    async fn create_nodes(&self, specs: Vec<NodeSpec>) -> GraphResult<BatchOutcome<Node>> {
        Ok(self.graph.write().await.create_nodes(specs))
    }

    async fn update_node(&self, spec: NodeSpec) -> GraphResult<Node> {
        self.graph.write().await.update_node(spec)
    }

    async fn upsert_node(&self, spec: NodeSpec) -> GraphResult<Node> {
        self.graph.write().await.upsert_node(spec)
    }

    async fn delete_node(&self, id: &NodeId) -> GraphResult<Node> {
        self.graph.write().await.delete_node(id)
    }

    async fn delete_nodes(&self, predicate: Predicate<Node>) -> GraphResult<Vec<NodeId>> {
        Ok(self.graph.write().await.delete_nodes(&predicate))
    }

    async fn get_node(&self, projection: Projection<Node>) -> GraphResult<Option<Node>> {
        Ok(self.graph.read().await.get_node(&projection).cloned())
    }

    async fn node_exists(&self, id: &NodeId) -> GraphResult<bool> {
        Ok(self.graph.read().await.node_exists(id))
    }

    async fn node_count(&self, predicate: Option<Predicate<Node>>) -> GraphResult<usize> {
        Ok(self.graph.read().await.node_count(predicate.as_ref()))
    }

    async fn get_nodes(&self, predicate: Predicate<Node>, amount: usize) -> GraphResult<Vec<Node>> {
        Ok(owned(self.graph.read().await.get_nodes(&predicate, amount)))
    }

    async fn get_nodes_with_label(&self, label: &Label, amount: usize) -> GraphResult<Vec<Node>> {
        Ok(owned(self.graph.read().await.get_nodes_with_label(label, amount)))
    }

    async fn get_node_labels(&self) -> GraphResult<Vec<Label>> {
        Ok(self.graph.read().await.node_labels())
    }

    async fn get_node_label_properties(&self) -> GraphResult<LabelProperties> {
        Ok(self.graph.read().await.node_label_properties())
    }

    async fn create_edge(&self, spec: EdgeSpec) -> GraphResult<Edge> {
        self.graph.write().await.create_edge(spec)
    }

    async fn update_edge(&self, spec: EdgeSpec) -> GraphResult<Edge> {
        self.graph.write().await.update_edge(spec)
    }

    async fn upsert_edge(&self, spec: EdgeSpec) -> GraphResult<Edge> {
        self.graph.write().await.upsert_edge(spec)
    }

    async fn delete_edge(&self, id: &EdgeId) -> GraphResult<Edge> {
        self.graph.write().await.delete_edge(id)
    }

    async fn get_edge(&self, projection: Projection<Edge>) -> GraphResult<Option<Edge>> {
        Ok(self.graph.read().await.get_edge(&projection).cloned())
    }

    async fn edge_exists(&self, id: &EdgeId) -> GraphResult<bool> {
        Ok(self.graph.read().await.edge_exists(id))
    }

    async fn edge_count(&self, predicate: Option<Predicate<Edge>>) -> GraphResult<usize> {
        Ok(self.graph.read().await.edge_count(predicate.as_ref()))
    }

    async fn get_edges_between(
        &self,
        source_id: &NodeId,
        target_id: &NodeId,
        amount: usize,
    ) -> GraphResult<Vec<Edge>> {
        let graph = self.graph.read().await;
        Ok(owned(graph.get_edges_between(source_id, target_id, amount)))
    }

    async fn get_edge_between(&self, source_id: &NodeId, target_id: &NodeId) -> GraphResult<Option<Edge>> {
        let graph = self.graph.read().await;
        Ok(graph.get_edge_between(source_id, target_id).cloned())
    }

    async fn get_edge_with_label(
        &self,
        source_id: &NodeId,
        target_id: &NodeId,
        label: &Label,
    ) -> GraphResult<Option<Edge>> {
        let graph = self.graph.read().await;
        Ok(graph.get_edge_with_label(source_id, target_id, label).cloned())
    }

    async fn get_edges_with_label(&self, label: &Label, amount: usize) -> GraphResult<Vec<Edge>> {
        Ok(owned(self.graph.read().await.get_edges_with_label(label, amount)))
    }

    async fn get_edges(&self, predicate: Predicate<Edge>, amount: usize) -> GraphResult<Vec<Edge>> {
        Ok(owned(self.graph.read().await.get_edges(&predicate, amount)))
    }

    async fn get_downstream_edges(&self, source_id: &NodeId, amount: usize) -> GraphResult<Vec<Edge>> {
        Ok(owned(self.graph.read().await.get_downstream_edges(source_id, amount)))
    }

    async fn get_upstream_edges(&self, target_id: &NodeId, amount: usize) -> GraphResult<Vec<Edge>> {
        Ok(owned(self.graph.read().await.get_upstream_edges(target_id, amount)))
    }

    async fn path_query(&self, query: PathQuery, amount: usize) -> GraphResult<ResultGraph> {
        Ok(self.graph.read().await.path_query(&query, amount))
    }

    async fn infer_schema_graph(&self, cached: bool) -> GraphResult<SchemaGraph> {
        Ok(self.graph.write().await.infer_schema_graph(cached))
    }
}
