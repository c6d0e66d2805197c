//! Core graph data model and in-memory storage
//!
//! This module implements the property graph data model with:
//! - Nodes with a set of labels and a payload
//! - Directed edges between live nodes, several per node pair allowed
//! - Label and adjacency indices kept in step with every mutation

pub mod edge;
mod index;
pub mod node;
pub mod property;
pub mod spec;
pub mod store;
pub mod types;

// Re-export main types
pub use edge::Edge;
pub use node::Node;
pub use property::{property_map_from_json, PropertyMap, PropertyValue};
pub use spec::{EdgeSpec, NodeSpec};
pub use store::{
    BatchFailure, BatchOutcome, ErrorKind, GraphError, GraphResult, MemoryGraph, DEFAULT_AMOUNT,
    DEFAULT_EDGES_BETWEEN_AMOUNT,
};
pub use types::{EdgeId, Label, LabelSet, NodeId};
