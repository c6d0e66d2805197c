//! Predicates, query objects and projections
//!
//! A [`QueryObject`] is a JSON object of expected values. The keys `id` and
//! `labels` address the entity itself (`labels` accepts one label or an
//! array, all of which must be present), `sourceId` and `targetId` address
//! edge endpoints, and every other key is compared against the payload.

use crate::graph::{Edge, GraphError, GraphResult, LabelSet, Node, NodeId, PropertyMap};
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::fmt;
use std::sync::Arc;

/// Something a predicate or query object can be evaluated against
pub trait Matchable {
    fn id_str(&self) -> &str;
    fn labels(&self) -> &LabelSet;
    fn data(&self) -> &PropertyMap;

    /// Endpoint by query key (`sourceId`, `targetId`); nodes have none
    fn endpoint(&self, _key: &str) -> Option<&NodeId> {
        None
    }
}

impl Matchable for Node {
    fn id_str(&self) -> &str {
        self.id.as_str()
    }

    fn labels(&self) -> &LabelSet {
        &self.labels
    }

    fn data(&self) -> &PropertyMap {
        &self.data
    }
}

impl Matchable for Edge {
    fn id_str(&self) -> &str {
        self.id.as_str()
    }

    fn labels(&self) -> &LabelSet {
        &self.labels
    }

    fn data(&self) -> &PropertyMap {
        &self.data
    }

    fn endpoint(&self, key: &str) -> Option<&NodeId> {
        match key {
            "sourceId" => Some(&self.source_id),
            "targetId" => Some(&self.target_id),
            _ => None,
        }
    }
}

/// Boolean test over a node or an edge
pub struct Predicate<T>(Arc<dyn Fn(&T) -> bool + Send + Sync>);

impl<T> Predicate<T> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Predicate(Arc::new(f))
    }

    /// Predicate accepting everything
    pub fn any() -> Self {
        Predicate::new(|_: &T| true)
    }

    pub fn test(&self, item: &T) -> bool {
        (self.0)(item)
    }
}

impl<T> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        Predicate(Arc::clone(&self.0))
    }
}

impl<T> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

impl<T: Matchable + 'static> From<QueryObject> for Predicate<T> {
    fn from(query: QueryObject) -> Self {
        Predicate::new(move |item: &T| query.matches(item))
    }
}

/// Object of expected values, matched by key
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryObject {
    entries: JsonMap<String, JsonValue>,
}

impl QueryObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object; anything else is an invalid query
    pub fn from_json(value: JsonValue) -> GraphResult<Self> {
        match value {
            JsonValue::Object(entries) => Ok(QueryObject { entries }),
            other => Err(GraphError::InvalidSpec(format!(
                "query object must be a JSON object, got {}",
                other
            ))),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when every entry matches; the empty query matches everything
    pub fn matches<T: Matchable + ?Sized>(&self, item: &T) -> bool {
        self.entries
            .iter()
            .all(|(key, expected)| Self::entry_matches(item, key, expected))
    }

    fn entry_matches<T: Matchable + ?Sized>(item: &T, key: &str, expected: &JsonValue) -> bool {
        match key {
            "id" => expected.as_str() == Some(item.id_str()),
            "labels" => match expected {
                JsonValue::String(label) => item.labels().contains_str(label),
                JsonValue::Array(labels) => labels
                    .iter()
                    .all(|l| l.as_str().is_some_and(|l| item.labels().contains_str(l))),
                _ => false,
            },
            _ => {
                if let Some(endpoint) = item.endpoint(key) {
                    return expected.as_str() == Some(endpoint.as_str());
                }
                item.data()
                    .get(key)
                    .is_some_and(|value| value.matches_json(expected))
            }
        }
    }
}

/// How a single node or edge is selected
#[derive(Debug, Clone)]
pub enum Projection<T> {
    ById(String),
    ByPredicate(Predicate<T>),
    ByQueryObject(QueryObject),
}

impl<T> From<&str> for Projection<T> {
    fn from(id: &str) -> Self {
        Projection::ById(id.to_string())
    }
}

impl<T> From<String> for Projection<T> {
    fn from(id: String) -> Self {
        Projection::ById(id)
    }
}

impl<T> From<Predicate<T>> for Projection<T> {
    fn from(predicate: Predicate<T>) -> Self {
        Projection::ByPredicate(predicate)
    }
}

impl<T> From<QueryObject> for Projection<T> {
    fn from(query: QueryObject) -> Self {
        Projection::ByQueryObject(query)
    }
}
