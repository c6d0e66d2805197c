//! Token path queries
//!
//! A path query alternates node and edge constraints, e.g.
//! `["A", "knows", "B", "*", "C"]`: even positions constrain nodes, odd
//! positions constrain edges, and `*` accepts any label. Matching walks
//! follow outgoing edges only.

use super::GraphSource;
use crate::graph::{Edge, EdgeId, GraphError, GraphResult, Label, LabelSet, Node, NodeId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// One position of a path query
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathToken {
    /// `*`: any label, or none at all
    Any,
    /// The entity must carry this label
    Label(Label),
}

impl PathToken {
    pub fn parse(token: &str) -> Self {
        match token.trim() {
            "*" => PathToken::Any,
            label => PathToken::Label(Label::new(label)),
        }
    }

    pub fn matches(&self, labels: &LabelSet) -> bool {
        match self {
            PathToken::Any => true,
            PathToken::Label(label) => labels.contains(label),
        }
    }
}

impl From<&str> for PathToken {
    fn from(token: &str) -> Self {
        PathToken::parse(token)
    }
}

impl fmt::Display for PathToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathToken::Any => write!(f, "*"),
            PathToken::Label(label) => write!(f, "{}", label),
        }
    }
}

/// Validated path pattern of odd length
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathQuery {
    tokens: Vec<PathToken>,
}

impl PathQuery {
    pub fn new(tokens: Vec<PathToken>) -> GraphResult<Self> {
        if tokens.len() % 2 == 0 {
            return Err(GraphError::InvalidSpec(format!(
                "path query needs an odd number of tokens (node, edge, node, ...), got {}",
                tokens.len()
            )));
        }
        Ok(PathQuery { tokens })
    }

    /// Parse string tokens, `*` being the wildcard
    pub fn parse<I, S>(tokens: I) -> GraphResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(tokens.into_iter().map(|t| PathToken::parse(t.as_ref())).collect())
    }

    pub fn tokens(&self) -> &[PathToken] {
        &self.tokens
    }

    /// Number of edges in a matching walk
    pub fn hops(&self) -> usize {
        self.tokens.len() / 2
    }
}

/// Union of matched walks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl ResultGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.nodes.iter().any(|n| &n.id == id)
    }

    pub fn contains_edge(&self, id: &EdgeId) -> bool {
        self.edges.iter().any(|e| &e.id == id)
    }
}

/// One step of a partial walk; the walk is recovered through `parent`
struct Step<'a> {
    parent: Option<usize>,
    node: &'a Node,
    edge: Option<&'a Edge>,
    hop: usize,
}

#[derive(Default)]
struct Collected<'a> {
    nodes: IndexMap<&'a NodeId, &'a Node>,
    edges: IndexMap<&'a EdgeId, &'a Edge>,
}

impl<'a> Collected<'a> {
    fn add_node(&mut self, node: &'a Node) {
        self.nodes.entry(&node.id).or_insert(node);
    }

    fn add_edge(&mut self, edge: &'a Edge) {
        self.edges.entry(&edge.id).or_insert(edge);
    }

    /// Merge the walk ending at `steps[at]` extended by `edge` and `target`
    fn add_walk(&mut self, steps: &[Step<'a>], at: usize, edge: &'a Edge, target: &'a Node) {
        let mut chain = Vec::new();
        let mut cursor = Some(at);
        while let Some(index) = cursor {
            chain.push(index);
            cursor = steps[index].parent;
        }
        for &index in chain.iter().rev() {
            let step = &steps[index];
            if let Some(edge) = step.edge {
                self.add_edge(edge);
            }
            self.add_node(step.node);
        }
        self.add_edge(edge);
        self.add_node(target);
    }

    fn into_result(self) -> ResultGraph {
        ResultGraph {
            nodes: self.nodes.into_values().cloned().collect(),
            edges: self.edges.into_values().cloned().collect(),
        }
    }
}

/// Run a path query, keeping at most `amount` complete walks.
///
/// A walk counts as complete the moment its last hop is found, so the search
/// stops as soon as `amount` walks are known instead of draining the frontier.
pub fn execute<G: GraphSource + ?Sized>(graph: &G, query: &PathQuery, amount: usize) -> ResultGraph {
    let mut collected = Collected::default();
    if amount == 0 {
        return collected.into_result();
    }

    let tokens = query.tokens();
    let hops = query.hops();
    let starts: Vec<&Node> = match &tokens[0] {
        PathToken::Any => graph.nodes().collect(),
        PathToken::Label(label) => graph.nodes_with_label(label),
    };

    if hops == 0 {
        for node in starts.into_iter().take(amount) {
            collected.add_node(node);
        }
        return collected.into_result();
    }

    let mut steps: Vec<Step> = Vec::with_capacity(starts.len());
    let mut queue: VecDeque<usize> = VecDeque::with_capacity(starts.len());
    for node in starts {
        queue.push_back(steps.len());
        steps.push(Step {
            parent: None,
            node,
            edge: None,
            hop: 0,
        });
    }

    let mut found = 0;
    'search: while let Some(at) = queue.pop_front() {
        let hop = steps[at].hop;
        let last = steps[at].node;
        let edge_token = &tokens[2 * hop + 1];
        let node_token = &tokens[2 * hop + 2];

        for edge in graph.outgoing(&last.id) {
            if !edge_token.matches(&edge.labels) {
                continue;
            }
            let Some(target) = graph.node(&edge.target_id) else {
                continue;
            };
            if !node_token.matches(&target.labels) {
                continue;
            }

            if hop + 1 == hops {
                collected.add_walk(&steps, at, edge, target);
                found += 1;
                if found >= amount {
                    break 'search;
                }
            } else {
                queue.push_back(steps.len());
                steps.push(Step {
                    parent: Some(at),
                    node: target,
                    edge: Some(edge),
                    hop: hop + 1,
                });
            }
        }
    }

    collected.into_result()
}
