//! Store metadata configuration

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors raised while loading a [`StoreConfig`]
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid JSON store config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML store config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Identity of a store instance
///
/// Missing fields fall back to their defaults, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Unique id of the store (random uuid by default)
    pub id: String,
    /// Display name
    pub name: String,
    pub description: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: "Store".to_string(),
            description: String::new(),
        }
    }
}

impl StoreConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn from_yaml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(input)?)
    }
}
