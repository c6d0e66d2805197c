//! GraphEngine: a [`Store`] with adapters and plugins
//!
//! The engine wraps a native store. Each operation resolves to a chain of
//! interceptors; operations nobody intercepts go straight to the native
//! store. Adapters registered for the same operation compose in
//! registration order, the last registered being the outermost.

use crate::adapter::{
    Adapter, AdapterOptions, NativeLink, Next, Operation, PluginMethod, PluginMethods, Request,
    Response, SharedContext,
};
use crate::config::StoreConfig;
use crate::graph::{
    BatchOutcome, Edge, EdgeId, EdgeSpec, GraphError, GraphResult, Label, Node, NodeId, NodeSpec,
};
use crate::query::{PathQuery, Predicate, Projection, ResultGraph, SchemaGraph};
use crate::store::{LabelProperties, MemoryStore, Store};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Store front-end running every call through its interceptor chain
pub struct GraphEngine {
    /// Wrapped store, innermost link of every chain
    native: Arc<dyn Store>,

    /// Outermost link per intercepted operation
    chains: RwLock<HashMap<Operation, Next>>,

    /// Registered adapter names, in registration order
    adapters: RwLock<Vec<String>>,

    /// Names taken by registered adapters and by those still initializing
    reserved: Mutex<HashSet<String>>,

    plugins: RwLock<HashMap<String, PluginMethod>>,

    context: SharedContext,
}

impl GraphEngine {
    /// Wrap a store
    pub fn new(native: Arc<dyn Store>) -> Self {
        Self::with_context(native, SharedContext::new())
    }

    /// Wrap a store, sharing an existing context
    pub fn with_context(native: Arc<dyn Store>, context: SharedContext) -> Self {
        info!(
            "Starting graph engine over store '{}' ({})",
            native.config().name,
            native.config().id
        );
        Self {
            native,
            chains: RwLock::new(HashMap::new()),
            adapters: RwLock::new(Vec::new()),
            reserved: Mutex::new(HashSet::new()),
            plugins: RwLock::new(HashMap::new()),
            context,
        }
    }

    /// Engine over a fresh [`MemoryStore`]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Context shared with adapters and plugin methods
    pub fn context(&self) -> &SharedContext {
        &self.context
    }

    /// The wrapped store; calls on it bypass every adapter
    pub fn native(&self) -> &Arc<dyn Store> {
        &self.native
    }

    /// Initialize an adapter and install its interceptors.
    ///
    /// A failing `init` rejects the adapter with
    /// [`GraphError::AdapterInitFailed`]; no chain is touched in that case.
    pub async fn register_adapter<A>(&self, name: &str, adapter: A, options: AdapterOptions) -> GraphResult<()>
    where
        A: Adapter,
    {
        let reservation = NameReservation::take(&self.reserved, name)?;

        let api = adapter
            .init(options, self.context.clone())
            .await
            .map_err(|e| {
                warn!("Rejected adapter '{}': {:#}", name, e);
                GraphError::AdapterInitFailed {
                    name: name.to_string(),
                    reason: format!("{:#}", e),
                }
            })?;

        let mut chains = self.chains.write().await;
        let mut installed = Vec::new();
        for (operation, factory) in api.into_factories() {
            let next = chains
                .get(&operation)
                .cloned()
                .unwrap_or_else(|| self.native_link());
            chains.insert(operation, factory(next));
            installed.push(operation.as_str());
        }
        self.adapters.write().await.push(name.to_string());
        reservation.keep();
        info!("Registered adapter '{}' on [{}]", name, installed.join(", "));
        Ok(())
    }

    /// Names of the registered adapters, in registration order
    pub async fn adapter_names(&self) -> Vec<String> {
        self.adapters.read().await.clone()
    }

    /// Install the methods of a plugin; nothing is installed if any name is taken
    pub async fn register_plugin(&self, plugin: PluginMethods) -> GraphResult<()> {
        let mut plugins = self.plugins.write().await;
        if let Some(taken) = plugin.names().find(|name| plugins.contains_key(*name)) {
            return Err(GraphError::InvalidSpec(format!(
                "plugin method '{}' is already registered",
                taken
            )));
        }

        for (name, method) in plugin.into_methods() {
            info!("Registered plugin method '{}'", name);
            plugins.insert(name, method);
        }
        Ok(())
    }

    pub async fn has_plugin(&self, name: &str) -> bool {
        self.plugins.read().await.contains_key(name)
    }

    /// Invoke a plugin method by name
    pub async fn call_plugin(&self, name: &str, args: Vec<JsonValue>) -> GraphResult<JsonValue> {
        let method = self
            .plugins
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| GraphError::NotImplemented(name.to_string()))?;
        debug!("Calling plugin method '{}'", name);
        method(&self.context, args)
    }

    /// Run a request through the chain of its operation
    pub async fn execute(&self, request: Request) -> GraphResult<Response> {
        let operation = request.operation();
        let chain = self.chains.read().await.get(&operation).cloned();
        match chain {
            Some(link) => link.call(request).await,
            None => request.dispatch(self.native.as_ref()).await,
        }
    }

    fn native_link(&self) -> Next {
        Arc::new(NativeLink::new(Arc::clone(&self.native)))
    }
}

#[async_trait]
impl Store for GraphEngine {
    fn config(&self) -> &StoreConfig {
        self.native.config()
    }

    async fn clear(&self) -> GraphResult<()> {
        self.execute(Request::Clear).await?.into_unit(Operation::Clear)
    }

    async fn create_node(&self, spec: NodeSpec) -> GraphResult<Node> {
        self.execute(Request::CreateNode(spec))
            .await?
            .into_node(Operation::CreateNode)
    }

    async fn create_nodes(&self, specs: Vec<NodeSpec>) -> GraphResult<BatchOutcome<Node>> {
        self.execute(Request::CreateNodes(specs))
            .await?
            .into_node_batch(Operation::CreateNodes)
    }

    async fn update_node(&self, spec: NodeSpec) -> GraphResult<Node> {
        self.execute(Request::UpdateNode(spec))
            .await?
            .into_node(Operation::UpdateNode)
    }

    async fn upsert_node(&self, spec: NodeSpec) -> GraphResult<Node> {
        self.execute(Request::UpsertNode(spec))
            .await?
            .into_node(Operation::UpsertNode)
    }

    async fn delete_node(&self, id: &NodeId) -> GraphResult<Node> {
        self.execute(Request::DeleteNode(id.clone()))
            .await?
            .into_node(Operation::DeleteNode)
    }

    async fn delete_nodes(&self, predicate: Predicate<Node>) -> GraphResult<Vec<NodeId>> {
        self.execute(Request::DeleteNodes(predicate))
            .await?
            .into_node_ids(Operation::DeleteNodes)
    }

    async fn get_node(&self, projection: Projection<Node>) -> GraphResult<Option<Node>> {
        self.execute(Request::GetNode(projection))
            .await?
            .into_maybe_node(Operation::GetNode)
    }

    async fn node_exists(&self, id: &NodeId) -> GraphResult<bool> {
        self.execute(Request::NodeExists(id.clone()))
            .await?
            .into_bool(Operation::NodeExists)
    }

    async fn node_count(&self, predicate: Option<Predicate<Node>>) -> GraphResult<usize> {
        self.execute(Request::NodeCount(predicate))
            .await?
            .into_count(Operation::NodeCount)
    }

    async fn get_nodes(&self, predicate: Predicate<Node>, amount: usize) -> GraphResult<Vec<Node>> {
        self.execute(Request::GetNodes { predicate, amount })
            .await?
            .into_nodes(Operation::GetNodes)
    }

    async fn get_nodes_with_label(&self, label: &Label, amount: usize) -> GraphResult<Vec<Node>> {
        let label = label.clone();
        self.execute(Request::GetNodesWithLabel { label, amount })
            .await?
            .into_nodes(Operation::GetNodesWithLabel)
    }

    async fn get_node_labels(&self) -> GraphResult<Vec<Label>> {
        self.execute(Request::GetNodeLabels)
            .await?
            .into_labels(Operation::GetNodeLabels)
    }

    async fn get_node_label_properties(&self) -> GraphResult<LabelProperties> {
        self.execute(Request::GetNodeLabelProperties)
            .await?
            .into_label_properties(Operation::GetNodeLabelProperties)
    }

    async fn create_edge(&self, spec: EdgeSpec) -> GraphResult<Edge> {
        self.execute(Request::CreateEdge(spec))
            .await?
            .into_edge(Operation::CreateEdge)
    }

    async fn update_edge(&self, spec: EdgeSpec) -> GraphResult<Edge> {
        self.execute(Request::UpdateEdge(spec))
            .await?
            .into_edge(Operation::UpdateEdge)
    }

    async fn upsert_edge(&self, spec: EdgeSpec) -> GraphResult<Edge> {
        self.execute(Request::UpsertEdge(spec))
            .await?
            .into_edge(Operation::UpsertEdge)
    }

    async fn delete_edge(&self, id: &EdgeId) -> GraphResult<Edge> {
        self.execute(Request::DeleteEdge(id.clone()))
            .await?
            .into_edge(Operation::DeleteEdge)
    }

    async fn get_edge(&self, projection: Projection<Edge>) -> GraphResult<Option<Edge>> {
        self.execute(Request::GetEdge(projection))
            .await?
            .into_maybe_edge(Operation::GetEdge)
    }

    async fn edge_exists(&self, id: &EdgeId) -> GraphResult<bool> {
        self.execute(Request::EdgeExists(id.clone()))
            .await?
            .into_bool(Operation::EdgeExists)
    }

    async fn edge_count(&self, predicate: Option<Predicate<Edge>>) -> GraphResult<usize> {
        self.execute(Request::EdgeCount(predicate))
            .await?
            .into_count(Operation::EdgeCount)
    }

    async fn get_edges_between(
        &self,
        source_id: &NodeId,
        target_id: &NodeId,
        amount: usize,
    ) -> GraphResult<Vec<Edge>> {
        let request = Request::GetEdgesBetween {
            source_id: source_id.clone(),
            target_id: target_id.clone(),
            amount,
        };
        self.execute(request)
            .await?
            .into_edges(Operation::GetEdgesBetween)
    }

    async fn get_edge_between(&self, source_id: &NodeId, target_id: &NodeId) -> GraphResult<Option<Edge>> {
        let request = Request::GetEdgeBetween {
            source_id: source_id.clone(),
            target_id: target_id.clone(),
        };
        self.execute(request)
            .await?
            .into_maybe_edge(Operation::GetEdgeBetween)
    }

    async fn get_edge_with_label(
        &self,
        source_id: &NodeId,
        target_id: &NodeId,
        label: &Label,
    ) -> GraphResult<Option<Edge>> {
        let request = Request::GetEdgeWithLabel {
            source_id: source_id.clone(),
            target_id: target_id.clone(),
            label: label.clone(),
        };
        self.execute(request)
            .await?
            .into_maybe_edge(Operation::GetEdgeWithLabel)
    }

    async fn get_edges_with_label(&self, label: &Label, amount: usize) -> GraphResult<Vec<Edge>> {
        let label = label.clone();
        self.execute(Request::GetEdgesWithLabel { label, amount })
            .await?
            .into_edges(Operation::GetEdgesWithLabel)
    }

    async fn get_edges(&self, predicate: Predicate<Edge>, amount: usize) -> GraphResult<Vec<Edge>> {
        self.execute(Request::GetEdges { predicate, amount })
            .await?
            .into_edges(Operation::GetEdges)
    }

    async fn get_downstream_edges(&self, source_id: &NodeId, amount: usize) -> GraphResult<Vec<Edge>> {
        let source_id = source_id.clone();
        self.execute(Request::GetDownstreamEdges { source_id, amount })
            .await?
            .into_edges(Operation::GetDownstreamEdges)
    }

    async fn get_upstream_edges(&self, target_id: &NodeId, amount: usize) -> GraphResult<Vec<Edge>> {
        let target_id = target_id.clone();
        self.execute(Request::GetUpstreamEdges { target_id, amount })
            .await?
            .into_edges(Operation::GetUpstreamEdges)
    }

    async fn path_query(&self, query: PathQuery, amount: usize) -> GraphResult<ResultGraph> {
        self.execute(Request::PathQuery { query, amount })
            .await?
            .into_graph(Operation::PathQuery)
    }

    async fn infer_schema_graph(&self, cached: bool) -> GraphResult<SchemaGraph> {
        self.execute(Request::InferSchemaGraph { cached })
            .await?
            .into_schema(Operation::InferSchemaGraph)
    }
}

/// Adapter name held while its `init` runs; released again unless kept
struct NameReservation<'a> {
    names: &'a Mutex<HashSet<String>>,
    name: String,
    kept: bool,
}

impl<'a> NameReservation<'a> {
    fn take(names: &'a Mutex<HashSet<String>>, name: &str) -> GraphResult<Self> {
        let mut taken = names.lock().unwrap_or_else(PoisonError::into_inner);
        if !taken.insert(name.to_string()) {
            return Err(GraphError::InvalidSpec(format!(
                "adapter '{}' is already registered",
                name
            )));
        }
        Ok(NameReservation {
            names,
            name: name.to_string(),
            kept: false,
        })
    }

    fn keep(mut self) {
        self.kept = true;
    }
}

impl Drop for NameReservation<'_> {
    fn drop(&mut self) {
        if !self.kept {
            self.names
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&self.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{intercept_fn, AdapterApi};
    use crate::graph::ErrorKind;
    use serde_json::json;

    /// Records "<name>:before" / "<name>:after" around `createNode`
    struct Tracer {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Adapter for Tracer {
        async fn init(&self, _options: AdapterOptions, _context: SharedContext) -> anyhow::Result<AdapterApi> {
            let name = self.name;
            let log = Arc::clone(&self.log);
            Ok(AdapterApi::new().with(Operation::CreateNode, move |next| {
                intercept_fn(move |request| {
                    let next = next.clone();
                    let log = Arc::clone(&log);
                    async move {
                        log.lock().unwrap().push(format!("{}:before", name));
                        let response = next.call(request).await;
                        log.lock().unwrap().push(format!("{}:after", name));
                        response
                    }
                })
            }))
        }
    }

    /// Answers `nodeCount` without consulting the store
    struct Liar;

    #[async_trait]
    impl Adapter for Liar {
        async fn init(&self, _options: AdapterOptions, _context: SharedContext) -> anyhow::Result<AdapterApi> {
            Ok(AdapterApi::new().with(Operation::NodeCount, |_next| {
                intercept_fn(|_request| async { Ok(Response::Count(1_000_000)) })
            }))
        }
    }

    struct Broken;

    #[async_trait]
    impl Adapter for Broken {
        async fn init(&self, _options: AdapterOptions, _context: SharedContext) -> anyhow::Result<AdapterApi> {
            anyhow::bail!("missing credentials")
        }
    }

    #[tokio::test]
    async fn test_last_registered_is_outermost() {
        let engine = GraphEngine::in_memory();
        let log = Arc::new(Mutex::new(Vec::new()));
        for name in ["x", "y"] {
            let tracer = Tracer { name, log: Arc::clone(&log) };
            engine.register_adapter(name, tracer, JsonValue::Null).await.unwrap();
        }

        engine.create_node(NodeSpec::from("a")).await.unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec!["y:before", "x:before", "x:after", "y:after"]
        );
        assert!(engine.native().node_exists(&NodeId::new("a")).await.unwrap());
        assert_eq!(engine.adapter_names().await, vec!["x", "y"]);
    }

    #[tokio::test]
    async fn test_short_circuit_skips_native() {
        let engine = GraphEngine::in_memory();
        engine.register_adapter("liar", Liar, JsonValue::Null).await.unwrap();

        assert_eq!(engine.node_count(None).await.unwrap(), 1_000_000);
        assert_eq!(engine.native().node_count(None).await.unwrap(), 0);
        // other operations are untouched
        assert!(!engine.node_exists(&NodeId::new("a")).await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_init_rejects_adapter() {
        let engine = GraphEngine::in_memory();
        let err = engine
            .register_adapter("broken", Broken, JsonValue::Null)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::AdapterInitFailed);
        assert!(err.to_string().contains("missing credentials"));
        assert!(engine.adapter_names().await.is_empty());
        engine.create_node(NodeSpec::from("a")).await.unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_adapter_name() {
        let engine = GraphEngine::in_memory();
        engine.register_adapter("liar", Liar, JsonValue::Null).await.unwrap();
        let err = engine
            .register_adapter("liar", Liar, JsonValue::Null)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSpec);
    }

    #[tokio::test]
    async fn test_failed_init_releases_name() {
        let engine = GraphEngine::in_memory();
        assert!(engine.register_adapter("db", Broken, JsonValue::Null).await.is_err());
        engine.register_adapter("db", Liar, JsonValue::Null).await.unwrap();
        assert_eq!(engine.adapter_names().await, vec!["db"]);
    }

    /// Finishes `init` only once released
    struct Slow {
        release: Arc<tokio::sync::Notify>,
    }

    #[async_trait]
    impl Adapter for Slow {
        async fn init(&self, _options: AdapterOptions, _context: SharedContext) -> anyhow::Result<AdapterApi> {
            self.release.notified().await;
            Ok(AdapterApi::new())
        }
    }

    #[tokio::test]
    async fn test_pending_init_does_not_block_registry() {
        let engine = GraphEngine::in_memory();
        let release = Arc::new(tokio::sync::Notify::new());
        let slow = Slow { release: Arc::clone(&release) };

        let (slow_result, during) = tokio::join!(
            engine.register_adapter("slow", slow, JsonValue::Null),
            async {
                let names = engine.adapter_names().await;
                engine.register_adapter("liar", Liar, JsonValue::Null).await.unwrap();
                let duplicate = engine.register_adapter("slow", Liar, JsonValue::Null).await;
                release.notify_one();
                (names, duplicate)
            }
        );

        slow_result.unwrap();
        let (names, duplicate) = during;
        assert!(names.is_empty());
        assert_eq!(duplicate.unwrap_err().kind(), ErrorKind::InvalidSpec);
        assert_eq!(engine.adapter_names().await, vec!["liar", "slow"]);
    }

    #[tokio::test]
    async fn test_wrong_response_shape_is_reported() {
        struct Confused;

        #[async_trait]
        impl Adapter for Confused {
            async fn init(&self, _options: AdapterOptions, _context: SharedContext) -> anyhow::Result<AdapterApi> {
                Ok(AdapterApi::new().with(Operation::CreateNode, |_next| {
                    intercept_fn(|_request| async { Ok(Response::Bool(false)) })
                }))
            }
        }

        let engine = GraphEngine::in_memory();
        engine.register_adapter("confused", Confused, JsonValue::Null).await.unwrap();
        let err = engine.create_node(NodeSpec::new()).await.unwrap_err();
        assert!(matches!(err, GraphError::UnexpectedResponse { found: "boolean", .. }));
    }

    #[tokio::test]
    async fn test_plugins() {
        let engine = GraphEngine::in_memory();
        let plugin = PluginMethods::new()
            .with_method("remember", |context, args| {
                let value = args.into_iter().next().unwrap_or(JsonValue::Null);
                Ok(context.set("memory", value).unwrap_or(JsonValue::Null))
            })
            .with_method("recall", |context, _| Ok(context.get_or("memory", JsonValue::Null)));
        engine.register_plugin(plugin).await.unwrap();

        engine.call_plugin("remember", vec![json!(7)]).await.unwrap();
        assert_eq!(engine.call_plugin("recall", vec![]).await.unwrap(), json!(7));
        assert_eq!(engine.context().get("memory"), Some(json!(7)));
        assert!(engine.has_plugin("recall").await);

        let err = engine.call_plugin("forget", vec![]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotImplemented);

        let clash = PluginMethods::new()
            .with_method("fresh", |_, _| Ok(JsonValue::Null))
            .with_method("recall", |_, _| Ok(JsonValue::Null));
        let err = engine.register_plugin(clash).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSpec);
        assert!(!engine.has_plugin("fresh").await);
    }

    #[tokio::test]
    async fn test_engine_is_a_full_store() {
        let engine = GraphEngine::in_memory();
        engine.create_node(NodeSpec::new().with_id("a").with_label("A")).await.unwrap();
        engine.create_node(NodeSpec::new().with_id("b").with_label("B")).await.unwrap();
        engine
            .create_edge(EdgeSpec::new("a", "b").with_label("knows"))
            .await
            .unwrap();

        let query = PathQuery::parse(["A", "knows", "B"]).unwrap();
        let result = engine.path_query(query, 10).await.unwrap();
        assert_eq!(result.nodes.len(), 2);
        assert_eq!(engine.infer_schema_graph(false).await.unwrap().nodes.len(), 2);
        assert_eq!(engine.edge_count(None).await.unwrap(), 1);

        engine.clear().await.unwrap();
        assert_eq!(engine.node_count(None).await.unwrap(), 0);
    }
}
