//! Plugins and the shared context
//!
//! A plugin adds free-standing methods to the engine. Plugin methods and
//! adapters communicate through the [`SharedContext`] the engine owns: a
//! plugin method may store a setting that an interceptor later reads.

use crate::graph::GraphResult;
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Shared key/value state; clones share the same map
#[derive(Debug, Clone, Default)]
pub struct SharedContext {
    values: Arc<RwLock<HashMap<String, JsonValue>>>,
}

impl SharedContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<JsonValue> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        values.get(key).cloned()
    }

    /// Value of `key`, or `default` when unset
    pub fn get_or(&self, key: &str, default: JsonValue) -> JsonValue {
        self.get(key).unwrap_or(default)
    }

    /// Store a value, returning the previous one
    pub fn set(&self, key: impl Into<String>, value: JsonValue) -> Option<JsonValue> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.into(), value)
    }

    pub fn remove(&self, key: &str) -> Option<JsonValue> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        values.contains_key(key)
    }
}

/// A plugin method: receives the shared context and untyped arguments
pub type PluginMethod =
    Arc<dyn Fn(&SharedContext, Vec<JsonValue>) -> GraphResult<JsonValue> + Send + Sync>;

/// Named methods contributed by one plugin
#[derive(Clone, Default)]
pub struct PluginMethods {
    methods: IndexMap<String, PluginMethod>,
}

impl PluginMethods {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_method<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&SharedContext, Vec<JsonValue>) -> GraphResult<JsonValue> + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Arc::new(method));
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub(crate) fn into_methods(self) -> IndexMap<String, PluginMethod> {
        self.methods
    }
}

impl fmt::Debug for PluginMethods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.methods.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_context_is_shared_between_clones() {
        let context = SharedContext::new();
        let other = context.clone();

        assert_eq!(context.set("color", json!("red")), None);
        assert_eq!(other.get("color"), Some(json!("red")));
        assert_eq!(other.set("color", json!("blue")), Some(json!("red")));
        assert_eq!(context.get_or("color", json!("white")), json!("blue"));

        other.remove("color");
        assert!(!context.contains_key("color"));
        assert_eq!(context.get_or("color", json!("white")), json!("white"));
    }

    #[test]
    fn test_plugin_methods() {
        let plugin = PluginMethods::new()
            .with_method("echo", |_, args| Ok(JsonValue::Array(args)))
            .with_method("zero", |_, _| Ok(json!(0)));

        assert_eq!(plugin.len(), 2);
        assert_eq!(plugin.names().collect::<Vec<_>>(), vec!["echo", "zero"]);
        let methods = plugin.into_methods();
        let echo = &methods["echo"];
        assert_eq!(echo(&SharedContext::new(), vec![json!(1)]).unwrap(), json!([1]));
    }
}
