//! Creation and update specs for nodes and edges
//!
//! A spec carries what a mutation needs: an optional id, the labels and the
//! payload. Specs are built either with the typed builders or from the loose
//! `(data, id, labels)` argument shapes callers tend to send over untyped
//! channels:
//!
//! - `data` is a string: it is the id of the node, the payload stays empty
//! - `data` is an object: `id` and `labels` entries are hoisted out of it and
//!   the remaining entries become the payload; an object of the exact shape
//!   `{id?, labels?, data: {...}}` uses its `data` entry as the payload
//! - anything else is rejected with [`GraphError::InvalidSpec`]

use super::property::{property_map_from_json, PropertyMap, PropertyValue};
use super::store::{GraphError, GraphResult};
use super::types::{EdgeId, Label, LabelSet, NodeId};
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};

/// Everything needed to create, update or upsert a node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub id: Option<NodeId>,
    pub labels: LabelSet,
    pub data: PropertyMap,
}

impl NodeSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<NodeId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<Label>) -> Self {
        self.labels.insert(label);
        self
    }

    pub fn with_labels<I, L>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<Label>,
    {
        self.labels = labels.into_iter().collect();
        self
    }

    pub fn with_data(mut self, data: PropertyMap) -> Self {
        self.data = data;
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Interpret the `(data, id, labels)` argument triple.
    ///
    /// An explicit `labels` argument wins over labels found in `data`; an
    /// explicit `id` must agree with an id found in `data`.
    pub fn from_args(
        data: Option<JsonValue>,
        id: Option<&str>,
        labels: Option<Vec<String>>,
    ) -> GraphResult<Self> {
        let parts = SpecParts::from_data(data)?;
        let id = merge_id(id, parts.id)?;
        let labels = match labels {
            Some(labels) => labels.into_iter().collect(),
            None => parts.labels.unwrap_or_default(),
        };
        Ok(NodeSpec {
            id: id.map(NodeId::from),
            labels,
            data: parts.data,
        })
    }

    /// Interpret a single JSON value, e.g. one element of a batch
    pub fn from_json(value: JsonValue) -> GraphResult<Self> {
        Self::from_args(Some(value), None, None)
    }
}

impl From<&str> for NodeSpec {
    fn from(id: &str) -> Self {
        NodeSpec::new().with_id(id)
    }
}

impl From<String> for NodeSpec {
    fn from(id: String) -> Self {
        NodeSpec::new().with_id(id)
    }
}

impl From<NodeId> for NodeSpec {
    fn from(id: NodeId) -> Self {
        NodeSpec::new().with_id(id)
    }
}

/// Everything needed to create, update or upsert an edge
///
/// Creation requires both endpoints. On update, endpoints are optional: when
/// present the edge is re-linked to them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeSpec {
    pub id: Option<EdgeId>,
    pub source_id: Option<NodeId>,
    pub target_id: Option<NodeId>,
    pub labels: LabelSet,
    pub data: PropertyMap,
}

impl EdgeSpec {
    pub fn new(source_id: impl Into<NodeId>, target_id: impl Into<NodeId>) -> Self {
        EdgeSpec {
            source_id: Some(source_id.into()),
            target_id: Some(target_id.into()),
            ..Self::default()
        }
    }

    /// Spec addressing an existing edge, for updates
    pub fn for_id(id: impl Into<EdgeId>) -> Self {
        EdgeSpec {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<EdgeId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<Label>) -> Self {
        self.labels.insert(label);
        self
    }

    pub fn with_labels<I, L>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<Label>,
    {
        self.labels = labels.into_iter().collect();
        self
    }

    pub fn with_data(mut self, data: PropertyMap) -> Self {
        self.data = data;
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Both endpoints, or `InvalidSpec` when one is missing
    pub fn endpoints(&self) -> GraphResult<(&NodeId, &NodeId)> {
        match (&self.source_id, &self.target_id) {
            (Some(source), Some(target)) => Ok((source, target)),
            (None, _) => Err(GraphError::InvalidSpec("edge spec has no source id".to_string())),
            (_, None) => Err(GraphError::InvalidSpec("edge spec has no target id".to_string())),
        }
    }

    /// Interpret the `(sourceId, targetId, data, id, labels)` argument shape
    pub fn from_args(
        source_id: &str,
        target_id: &str,
        data: Option<JsonValue>,
        id: Option<&str>,
        labels: Option<Vec<String>>,
    ) -> GraphResult<Self> {
        let parts = SpecParts::from_data(data)?;
        let id = merge_id(id, parts.id)?;
        let labels = match labels {
            Some(labels) => labels.into_iter().collect(),
            None => parts.labels.unwrap_or_default(),
        };
        Ok(EdgeSpec {
            id: id.map(EdgeId::from),
            source_id: Some(NodeId::new(source_id)),
            target_id: Some(NodeId::new(target_id)),
            labels,
            data: parts.data,
        })
    }

    /// Interpret a JSON object with `sourceId`/`targetId` (or `source`/`target`)
    /// entries next to the usual `id`, `labels` and payload.
    pub fn from_json(value: JsonValue) -> GraphResult<Self> {
        let JsonValue::Object(mut map) = value else {
            return Err(GraphError::InvalidSpec(
                "edge spec must be a JSON object".to_string(),
            ));
        };
        let source_id = take_id(&mut map, &["sourceId", "source"])?;
        let target_id = take_id(&mut map, &["targetId", "target"])?;
        let parts = SpecParts::from_object(map)?;
        Ok(EdgeSpec {
            id: parts.id.map(EdgeId::from),
            source_id: source_id.map(NodeId::from),
            target_id: target_id.map(NodeId::from),
            labels: parts.labels.unwrap_or_default(),
            data: parts.data,
        })
    }
}

/// Pieces recovered from a loose `data` argument
#[derive(Debug, Default)]
struct SpecParts {
    id: Option<String>,
    labels: Option<LabelSet>,
    data: PropertyMap,
}

impl SpecParts {
    fn from_data(data: Option<JsonValue>) -> GraphResult<Self> {
        match data {
            None | Some(JsonValue::Null) => Ok(Self::default()),
            Some(JsonValue::String(id)) => Ok(SpecParts {
                id: Some(id),
                ..Self::default()
            }),
            Some(JsonValue::Object(map)) => Self::from_object(map),
            Some(other) => Err(GraphError::InvalidSpec(format!(
                "cannot interpret {} as node or edge data",
                json_kind(&other)
            ))),
        }
    }

    fn from_object(mut map: JsonMap<String, JsonValue>) -> GraphResult<Self> {
        let id = take_id(&mut map, &["id"])?;
        let labels = match map.remove("labels") {
            None | Some(JsonValue::Null) => None,
            Some(value) => Some(parse_labels(value)?),
        };

        let nested = map.len() == 1 && matches!(map.get("data"), Some(JsonValue::Object(_)));
        let data = match map.remove("data") {
            Some(data) if nested => property_map_from_json(data)?,
            Some(data) => {
                map.insert("data".to_string(), data);
                property_map_from_json(JsonValue::Object(map))?
            }
            None => property_map_from_json(JsonValue::Object(map))?,
        };

        Ok(SpecParts { id, labels, data })
    }
}

fn merge_id(explicit: Option<&str>, found: Option<String>) -> GraphResult<Option<String>> {
    match (explicit, found) {
        (Some(explicit), Some(found)) if explicit != found => Err(GraphError::InvalidSpec(format!(
            "conflicting ids '{}' and '{}'",
            explicit, found
        ))),
        (Some(explicit), _) => Ok(Some(explicit.to_string())),
        (None, found) => Ok(found),
    }
}

fn take_id(map: &mut JsonMap<String, JsonValue>, keys: &[&str]) -> GraphResult<Option<String>> {
    for key in keys {
        match map.remove(*key) {
            None | Some(JsonValue::Null) => continue,
            Some(JsonValue::String(s)) => return Ok(Some(s)),
            Some(JsonValue::Number(n)) => return Ok(Some(n.to_string())),
            Some(other) => {
                return Err(GraphError::InvalidSpec(format!(
                    "'{}' must be a string, got {}",
                    key,
                    json_kind(&other)
                )))
            }
        }
    }
    Ok(None)
}

fn parse_labels(value: JsonValue) -> GraphResult<LabelSet> {
    match value {
        JsonValue::String(label) => Ok(std::iter::once(label).collect()),
        JsonValue::Array(items) => items
            .into_iter()
            .map(|item| match item {
                JsonValue::String(label) => Ok(label),
                other => Err(GraphError::InvalidSpec(format!(
                    "labels must be strings, got {}",
                    json_kind(&other)
                ))),
            })
            .collect::<GraphResult<Vec<String>>>()
            .map(|labels| labels.into_iter().collect()),
        other => Err(GraphError::InvalidSpec(format!(
            "labels must be a string or an array, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder() {
        let spec = NodeSpec::new()
            .with_id("a")
            .with_label("Person")
            .with_property("name", "Alice");
        assert_eq!(spec.id, Some(NodeId::new("a")));
        assert!(spec.labels.contains_str("Person"));
        assert_eq!(spec.data["name"].as_string(), Some("Alice"));
    }

    #[test]
    fn test_string_data_is_an_id() {
        let spec = NodeSpec::from_args(Some(json!("n1")), None, None).unwrap();
        assert_eq!(spec.id, Some(NodeId::new("n1")));
        assert!(spec.data.is_empty());
        assert!(spec.labels.is_empty());
    }

    #[test]
    fn test_object_data_hoists_id_and_labels() {
        let spec = NodeSpec::from_args(
            Some(json!({"id": "n2", "labels": ["A", "B"], "name": "x"})),
            None,
            None,
        )
        .unwrap();
        assert_eq!(spec.id, Some(NodeId::new("n2")));
        assert_eq!(spec.labels.len(), 2);
        assert_eq!(spec.data.len(), 1);
        assert_eq!(spec.data["name"].as_string(), Some("x"));
    }

    #[test]
    fn test_nested_data_shape() {
        let spec = NodeSpec::from_json(json!({"id": "n3", "data": {"age": 4}})).unwrap();
        assert_eq!(spec.id, Some(NodeId::new("n3")));
        assert_eq!(spec.data["age"].as_integer(), Some(4));
    }

    #[test]
    fn test_explicit_labels_win() {
        let spec = NodeSpec::from_args(
            Some(json!({"labels": "A"})),
            None,
            Some(vec!["B".to_string()]),
        )
        .unwrap();
        assert!(spec.labels.contains_str("B"));
        assert!(!spec.labels.contains_str("A"));
    }

    #[test]
    fn test_conflicting_ids_rejected() {
        let err = NodeSpec::from_args(Some(json!({"id": "x"})), Some("y"), None).unwrap_err();
        assert!(matches!(err, GraphError::InvalidSpec(_)));

        let same = NodeSpec::from_args(Some(json!({"id": "x"})), Some("x"), None).unwrap();
        assert_eq!(same.id, Some(NodeId::new("x")));
    }

    #[test]
    fn test_invalid_shapes_rejected() {
        assert!(matches!(
            NodeSpec::from_json(json!(42)),
            Err(GraphError::InvalidSpec(_))
        ));
        assert!(matches!(
            NodeSpec::from_json(json!({"labels": [1, 2]})),
            Err(GraphError::InvalidSpec(_))
        ));
        assert!(matches!(
            NodeSpec::from_json(json!({"id": true})),
            Err(GraphError::InvalidSpec(_))
        ));
    }

    #[test]
    fn test_payload_numbers_must_fit() {
        let err = NodeSpec::from_json(json!({"id": "n", "big": u64::MAX})).unwrap_err();
        assert!(matches!(err, GraphError::InvalidSpec(_)));

        let err = NodeSpec::from_json(json!({"data": {"big": u64::MAX}})).unwrap_err();
        assert!(matches!(err, GraphError::InvalidSpec(_)));

        let spec = NodeSpec::from_json(json!({"data": 5, "other": true})).unwrap();
        assert_eq!(spec.data["data"].as_integer(), Some(5));
        assert_eq!(spec.data.len(), 2);
    }

    #[test]
    fn test_edge_spec_from_json() {
        let spec = EdgeSpec::from_json(json!({
            "sourceId": "a",
            "target": "b",
            "labels": ["knows"],
            "weight": 2
        }))
        .unwrap();
        let (source, target) = spec.endpoints().unwrap();
        assert_eq!(source.as_str(), "a");
        assert_eq!(target.as_str(), "b");
        assert!(spec.labels.contains_str("knows"));
        assert_eq!(spec.data["weight"].as_integer(), Some(2));
        assert!(spec.id.is_none());
    }

    #[test]
    fn test_edge_spec_missing_endpoint() {
        let spec = EdgeSpec::from_json(json!({"sourceId": "a"})).unwrap();
        assert!(matches!(spec.endpoints(), Err(GraphError::InvalidSpec(_))));
        assert!(EdgeSpec::from_json(json!("a->b")).is_err());
    }

    #[test]
    fn test_edge_spec_from_args() {
        let spec = EdgeSpec::from_args("a", "b", None, Some("e1"), Some(vec!["likes".into()])).unwrap();
        assert_eq!(spec.id, Some(EdgeId::new("e1")));
        assert!(spec.labels.contains_str("likes"));
    }
}
