//! Operation names, requests and responses
//!
//! Every [`Store`] method has an [`Operation`] name, a [`Request`] variant
//! carrying its arguments and a [`Response`] shape for its result. Adapters
//! register against operation names and see requests and responses flow
//! through their interceptors.

use crate::graph::{
    BatchOutcome, Edge, EdgeId, EdgeSpec, GraphError, GraphResult, Label, Node, NodeId, NodeSpec,
};
use crate::query::{PathQuery, Predicate, Projection, ResultGraph, SchemaGraph};
use crate::store::{LabelProperties, Store};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of a store operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    Clear,
    CreateNode,
    CreateNodes,
    UpdateNode,
    UpsertNode,
    DeleteNode,
    DeleteNodes,
    GetNode,
    NodeExists,
    NodeCount,
    GetNodes,
    GetNodesWithLabel,
    GetNodeLabels,
    GetNodeLabelProperties,
    CreateEdge,
    UpdateEdge,
    UpsertEdge,
    DeleteEdge,
    GetEdge,
    EdgeExists,
    EdgeCount,
    GetEdgesBetween,
    GetEdgeBetween,
    GetEdgeWithLabel,
    GetEdgesWithLabel,
    GetEdges,
    GetDownstreamEdges,
    GetUpstreamEdges,
    PathQuery,
    InferSchemaGraph,
}

impl Operation {
    pub const ALL: [Operation; 30] = [
        Operation::Clear,
        Operation::CreateNode,
        Operation::CreateNodes,
        Operation::UpdateNode,
        Operation::UpsertNode,
        Operation::DeleteNode,
        Operation::DeleteNodes,
        Operation::GetNode,
        Operation::NodeExists,
        Operation::NodeCount,
        Operation::GetNodes,
        Operation::GetNodesWithLabel,
        Operation::GetNodeLabels,
        Operation::GetNodeLabelProperties,
        Operation::CreateEdge,
        Operation::UpdateEdge,
        Operation::UpsertEdge,
        Operation::DeleteEdge,
        Operation::GetEdge,
        Operation::EdgeExists,
        Operation::EdgeCount,
        Operation::GetEdgesBetween,
        Operation::GetEdgeBetween,
        Operation::GetEdgeWithLabel,
        Operation::GetEdgesWithLabel,
        Operation::GetEdges,
        Operation::GetDownstreamEdges,
        Operation::GetUpstreamEdges,
        Operation::PathQuery,
        Operation::InferSchemaGraph,
    ];

    /// Registration name, e.g. `"createNode"`
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Clear => "clear",
            Operation::CreateNode => "createNode",
            Operation::CreateNodes => "createNodes",
            Operation::UpdateNode => "updateNode",
            Operation::UpsertNode => "upsertNode",
            Operation::DeleteNode => "deleteNode",
            Operation::DeleteNodes => "deleteNodes",
            Operation::GetNode => "getNode",
            Operation::NodeExists => "nodeExists",
            Operation::NodeCount => "nodeCount",
            Operation::GetNodes => "getNodes",
            Operation::GetNodesWithLabel => "getNodesWithLabel",
            Operation::GetNodeLabels => "getNodeLabels",
            Operation::GetNodeLabelProperties => "getNodeLabelProperties",
            Operation::CreateEdge => "createEdge",
            Operation::UpdateEdge => "updateEdge",
            Operation::UpsertEdge => "upsertEdge",
            Operation::DeleteEdge => "deleteEdge",
            Operation::GetEdge => "getEdge",
            Operation::EdgeExists => "edgeExists",
            Operation::EdgeCount => "edgeCount",
            Operation::GetEdgesBetween => "getEdgesBetween",
            Operation::GetEdgeBetween => "getEdgeBetween",
            Operation::GetEdgeWithLabel => "getEdgeWithLabel",
            Operation::GetEdgesWithLabel => "getEdgesWithLabel",
            Operation::GetEdges => "getEdges",
            Operation::GetDownstreamEdges => "getDownstreamEdges",
            Operation::GetUpstreamEdges => "getUpstreamEdges",
            Operation::PathQuery => "pathQuery",
            Operation::InferSchemaGraph => "inferSchemaGraph",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .iter()
            .copied()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| GraphError::NotImplemented(s.to_string()))
    }
}

/// Arguments of one store call
#[derive(Debug, Clone)]
pub enum Request {
    Clear,
    CreateNode(NodeSpec),
    CreateNodes(Vec<NodeSpec>),
    UpdateNode(NodeSpec),
    UpsertNode(NodeSpec),
    DeleteNode(NodeId),
    DeleteNodes(Predicate<Node>),
    GetNode(Projection<Node>),
    NodeExists(NodeId),
    NodeCount(Option<Predicate<Node>>),
    GetNodes { predicate: Predicate<Node>, amount: usize },
    GetNodesWithLabel { label: Label, amount: usize },
    GetNodeLabels,
    GetNodeLabelProperties,
    CreateEdge(EdgeSpec),
    UpdateEdge(EdgeSpec),
    UpsertEdge(EdgeSpec),
    DeleteEdge(EdgeId),
    GetEdge(Projection<Edge>),
    EdgeExists(EdgeId),
    EdgeCount(Option<Predicate<Edge>>),
    GetEdgesBetween { source_id: NodeId, target_id: NodeId, amount: usize },
    GetEdgeBetween { source_id: NodeId, target_id: NodeId },
    GetEdgeWithLabel { source_id: NodeId, target_id: NodeId, label: Label },
    GetEdgesWithLabel { label: Label, amount: usize },
    GetEdges { predicate: Predicate<Edge>, amount: usize },
    GetDownstreamEdges { source_id: NodeId, amount: usize },
    GetUpstreamEdges { target_id: NodeId, amount: usize },
    PathQuery { query: PathQuery, amount: usize },
    InferSchemaGraph { cached: bool },
}

impl Request {
    pub fn operation(&self) -> Operation {
        match self {
            Request::Clear => Operation::Clear,
            Request::CreateNode(_) => Operation::CreateNode,
            Request::CreateNodes(_) => Operation::CreateNodes,
            Request::UpdateNode(_) => Operation::UpdateNode,
            Request::UpsertNode(_) => Operation::UpsertNode,
            Request::DeleteNode(_) => Operation::DeleteNode,
            Request::DeleteNodes(_) => Operation::DeleteNodes,
            Request::GetNode(_) => Operation::GetNode,
            Request::NodeExists(_) => Operation::NodeExists,
            Request::NodeCount(_) => Operation::NodeCount,
            Request::GetNodes { .. } => Operation::GetNodes,
            Request::GetNodesWithLabel { .. } => Operation::GetNodesWithLabel,
            Request::GetNodeLabels => Operation::GetNodeLabels,
            Request::GetNodeLabelProperties => Operation::GetNodeLabelProperties,
            Request::CreateEdge(_) => Operation::CreateEdge,
            Request::UpdateEdge(_) => Operation::UpdateEdge,
            Request::UpsertEdge(_) => Operation::UpsertEdge,
            Request::DeleteEdge(_) => Operation::DeleteEdge,
            Request::GetEdge(_) => Operation::GetEdge,
            Request::EdgeExists(_) => Operation::EdgeExists,
            Request::EdgeCount(_) => Operation::EdgeCount,
            Request::GetEdgesBetween { .. } => Operation::GetEdgesBetween,
            Request::GetEdgeBetween { .. } => Operation::GetEdgeBetween,
            Request::GetEdgeWithLabel { .. } => Operation::GetEdgeWithLabel,
            Request::GetEdgesWithLabel { .. } => Operation::GetEdgesWithLabel,
            Request::GetEdges { .. } => Operation::GetEdges,
            Request::GetDownstreamEdges { .. } => Operation::GetDownstreamEdges,
            Request::GetUpstreamEdges { .. } => Operation::GetUpstreamEdges,
            Request::PathQuery { .. } => Operation::PathQuery,
            Request::InferSchemaGraph { .. } => Operation::InferSchemaGraph,
        }
    }

    /// Run the request against a store, bypassing any interceptor
    pub async fn dispatch(self, store: &dyn Store) -> GraphResult<Response> {
        let response = match self {
            Request::Clear => {
                store.clear().await?;
                Response::Unit
            }
            Request::CreateNode(spec) => Response::Node(store.create_node(spec).await?),
            Request::CreateNodes(specs) => Response::NodeBatch(store.create_nodes(specs).await?),
            Request::UpdateNode(spec) => Response::Node(store.update_node(spec).await?),
            Request::UpsertNode(spec) => Response::Node(store.upsert_node(spec).await?),
            Request::DeleteNode(id) => Response::Node(store.delete_node(&id).await?),
            Request::DeleteNodes(predicate) => Response::NodeIds(store.delete_nodes(predicate).await?),
            Request::GetNode(projection) => Response::MaybeNode(store.get_node(projection).await?),
            Request::NodeExists(id) => Response::Bool(store.node_exists(&id).await?),
            Request::NodeCount(predicate) => Response::Count(store.node_count(predicate).await?),
            Request::GetNodes { predicate, amount } => {
                Response::Nodes(store.get_nodes(predicate, amount).await?)
            }
            Request::GetNodesWithLabel { label, amount } => {
                Response::Nodes(store.get_nodes_with_label(&label, amount).await?)
            }
            Request::GetNodeLabels => Response::Labels(store.get_node_labels().await?),
            Request::GetNodeLabelProperties => {
                Response::LabelProperties(store.get_node_label_properties().await?)
            }
            Request::CreateEdge(spec) => Response::Edge(store.create_edge(spec).await?),
            Request::UpdateEdge(spec) => Response::Edge(store.update_edge(spec).await?),
            Request::UpsertEdge(spec) => Response::Edge(store.upsert_edge(spec).await?),
            Request::DeleteEdge(id) => Response::Edge(store.delete_edge(&id).await?),
            Request::GetEdge(projection) => Response::MaybeEdge(store.get_edge(projection).await?),
            Request::EdgeExists(id) => Response::Bool(store.edge_exists(&id).await?),
            Request::EdgeCount(predicate) => Response::Count(store.edge_count(predicate).await?),
            Request::GetEdgesBetween { source_id, target_id, amount } => Response::Edges(
                store.get_edges_between(&source_id, &target_id, amount).await?,
            ),
            Request::GetEdgeBetween { source_id, target_id } => {
                Response::MaybeEdge(store.get_edge_between(&source_id, &target_id).await?)
            }
            Request::GetEdgeWithLabel { source_id, target_id, label } => Response::MaybeEdge(
                store.get_edge_with_label(&source_id, &target_id, &label).await?,
            ),
            Request::GetEdgesWithLabel { label, amount } => {
                Response::Edges(store.get_edges_with_label(&label, amount).await?)
            }
            Request::GetEdges { predicate, amount } => {
                Response::Edges(store.get_edges(predicate, amount).await?)
            }
            Request::GetDownstreamEdges { source_id, amount } => {
                Response::Edges(store.get_downstream_edges(&source_id, amount).await?)
            }
            Request::GetUpstreamEdges { target_id, amount } => {
                Response::Edges(store.get_upstream_edges(&target_id, amount).await?)
            }
            Request::PathQuery { query, amount } => {
                Response::Graph(store.path_query(query, amount).await?)
            }
            Request::InferSchemaGraph { cached } => {
                Response::Schema(store.infer_schema_graph(cached).await?)
            }
        };
        Ok(response)
    }
}

/// Result of one store call
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Unit,
    Node(Node),
    MaybeNode(Option<Node>),
    Nodes(Vec<Node>),
    NodeBatch(BatchOutcome<Node>),
    NodeIds(Vec<NodeId>),
    Edge(Edge),
    MaybeEdge(Option<Edge>),
    Edges(Vec<Edge>),
    Bool(bool),
    Count(usize),
    Labels(Vec<Label>),
    LabelProperties(LabelProperties),
    Graph(ResultGraph),
    Schema(SchemaGraph),
}

impl Response {
    /// Name of the shape, for error reporting
    pub fn kind(&self) -> &'static str {
        match self {
            Response::Unit => "unit",
            Response::Node(_) => "node",
            Response::MaybeNode(_) => "optional node",
            Response::Nodes(_) => "node list",
            Response::NodeBatch(_) => "node batch",
            Response::NodeIds(_) => "node id list",
            Response::Edge(_) => "edge",
            Response::MaybeEdge(_) => "optional edge",
            Response::Edges(_) => "edge list",
            Response::Bool(_) => "boolean",
            Response::Count(_) => "count",
            Response::Labels(_) => "label list",
            Response::LabelProperties(_) => "label properties",
            Response::Graph(_) => "result graph",
            Response::Schema(_) => "schema graph",
        }
    }

    fn unexpected(self, operation: Operation) -> GraphError {
        GraphError::UnexpectedResponse {
            operation: operation.to_string(),
            found: self.kind(),
        }
    }

    pub fn into_unit(self, operation: Operation) -> GraphResult<()> {
        match self {
            Response::Unit => Ok(()),
            other => Err(other.unexpected(operation)),
        }
    }

    pub fn into_node(self, operation: Operation) -> GraphResult<Node> {
        match self {
            Response::Node(node) => Ok(node),
            other => Err(other.unexpected(operation)),
        }
    }

    pub fn into_maybe_node(self, operation: Operation) -> GraphResult<Option<Node>> {
        match self {
            Response::MaybeNode(node) => Ok(node),
            other => Err(other.unexpected(operation)),
        }
    }

    pub fn into_nodes(self, operation: Operation) -> GraphResult<Vec<Node>> {
        match self {
            Response::Nodes(nodes) => Ok(nodes),
            other => Err(other.unexpected(operation)),
        }
    }

    pub fn into_node_batch(self, operation: Operation) -> GraphResult<BatchOutcome<Node>> {
        match self {
            Response::NodeBatch(outcome) => Ok(outcome),
            other => Err(other.unexpected(operation)),
        }
    }

    pub fn into_node_ids(self, operation: Operation) -> GraphResult<Vec<NodeId>> {
        match self {
            Response::NodeIds(ids) => Ok(ids),
            other => Err(other.unexpected(operation)),
        }
    }

    pub fn into_edge(self, operation: Operation) -> GraphResult<Edge> {
        match self {
            Response::Edge(edge) => Ok(edge),
            other => Err(other.unexpected(operation)),
        }
    }

    pub fn into_maybe_edge(self, operation: Operation) -> GraphResult<Option<Edge>> {
        match self {
            Response::MaybeEdge(edge) => Ok(edge),
            other => Err(other.unexpected(operation)),
        }
    }

    pub fn into_edges(self, operation: Operation) -> GraphResult<Vec<Edge>> {
        match self {
            Response::Edges(edges) => Ok(edges),
            other => Err(other.unexpected(operation)),
        }
    }

    pub fn into_bool(self, operation: Operation) -> GraphResult<bool> {
        match self {
            Response::Bool(value) => Ok(value),
            other => Err(other.unexpected(operation)),
        }
    }

    pub fn into_count(self, operation: Operation) -> GraphResult<usize> {
        match self {
            Response::Count(count) => Ok(count),
            other => Err(other.unexpected(operation)),
        }
    }

    pub fn into_labels(self, operation: Operation) -> GraphResult<Vec<Label>> {
        match self {
            Response::Labels(labels) => Ok(labels),
            other => Err(other.unexpected(operation)),
        }
    }

    pub fn into_label_properties(self, operation: Operation) -> GraphResult<LabelProperties> {
        match self {
            Response::LabelProperties(properties) => Ok(properties),
            other => Err(other.unexpected(operation)),
        }
    }

    pub fn into_graph(self, operation: Operation) -> GraphResult<ResultGraph> {
        match self {
            Response::Graph(graph) => Ok(graph),
            other => Err(other.unexpected(operation)),
        }
    }

    pub fn into_schema(self, operation: Operation) -> GraphResult<SchemaGraph> {
        match self {
            Response::Schema(schema) => Ok(schema),
            other => Err(other.unexpected(operation)),
        }
    }
}
