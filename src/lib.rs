//! Qwiery graph store
//!
//! A backend-agnostic property graph store contract with a reference
//! in-memory engine, and an adapter pipeline letting third parties intercept
//! or replace any single store operation.
//!
//! # Architecture
//!
//! - [`graph`]: data model (nodes, edges, labels, payloads) and the
//!   synchronous [`MemoryGraph`] storage engine with its label and adjacency
//!   indices
//! - [`query`]: predicates, token path queries and schema inference
//! - [`store`]: the async [`Store`] contract and the default [`MemoryStore`]
//! - [`adapter`]: operations, interceptor chains, adapters and plugins
//! - [`engine`]: [`GraphEngine`], a `Store` running every call through the
//!   interceptor chain registered for it
//!
//! ## Example Usage
//!
//! ```rust
//! use qwiery::{EdgeSpec, GraphEngine, Label, NodeSpec, PathQuery, Store};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let engine = GraphEngine::in_memory();
//!
//! // Create nodes
//! engine.create_node(NodeSpec::new().with_id("alice").with_label("Person")).await.unwrap();
//! engine.create_node(NodeSpec::new().with_id("bob").with_label("Person")).await.unwrap();
//!
//! // Create edge
//! engine.create_edge(EdgeSpec::new("alice", "bob").with_label("knows")).await.unwrap();
//!
//! // Query by label
//! let persons = engine.get_nodes_with_label(&Label::new("Person"), 10).await.unwrap();
//! assert_eq!(persons.len(), 2);
//!
//! // Path query
//! let query = PathQuery::parse(["Person", "knows", "*"]).unwrap();
//! let result = engine.path_query(query, 10).await.unwrap();
//! assert_eq!(result.edges.len(), 1);
//! # }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod adapter;
pub mod config;
pub mod engine;
pub mod graph;
pub mod query;
pub mod store;

// Re-export main types for convenience
pub use graph::{
    BatchFailure, BatchOutcome, Edge, EdgeId, EdgeSpec, ErrorKind, GraphError, GraphResult,
    Label, LabelSet, MemoryGraph, Node, NodeId, NodeSpec, PropertyMap, PropertyValue,
    DEFAULT_AMOUNT, DEFAULT_EDGES_BETWEEN_AMOUNT,
};

pub use query::{
    PathQuery, PathToken, Predicate, Projection, QueryObject, ResultGraph, SchemaEdge,
    SchemaGraph, SchemaNode,
};

pub use store::{LabelProperties, MemoryStore, Store};

pub use adapter::{
    intercept_fn, Adapter, AdapterApi, AdapterOptions, Interceptor, Next, Operation,
    PluginMethods, Request, Response, SharedContext,
};

pub use config::{ConfigError, StoreConfig};
pub use engine::GraphEngine;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
