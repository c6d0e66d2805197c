//! Query processing module
//!
//! Read-only analysis on top of the storage engine:
//! - predicates, query objects and projections used to select nodes and edges
//! - token path queries (`["A", "knows", "*"]`) evaluated by bounded BFS
//! - schema inference over label sets
//!
//! Everything here works through [`GraphSource`], never through index internals.

pub mod path;
pub mod predicate;
pub mod schema;

use crate::graph::{Edge, Label, Node, NodeId};

// Re-export main types
pub use path::{PathQuery, PathToken, ResultGraph};
pub use predicate::{Matchable, Predicate, Projection, QueryObject};
pub use schema::{SchemaEdge, SchemaGraph, SchemaNode};

/// Read access the query engine needs from a graph
pub trait GraphSource {
    fn node(&self, id: &NodeId) -> Option<&Node>;

    /// All nodes in insertion order
    fn nodes(&self) -> Box<dyn Iterator<Item = &Node> + '_>;

    fn nodes_with_label(&self, label: &Label) -> Vec<&Node>;

    /// All edges in insertion order
    fn edges(&self) -> Box<dyn Iterator<Item = &Edge> + '_>;

    /// Edges whose source is `id`
    fn outgoing(&self, id: &NodeId) -> Vec<&Edge>;

    /// Mutation counter of the underlying graph
    fn generation(&self) -> u64;
}
