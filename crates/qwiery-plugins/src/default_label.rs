//! Adapter assigning a default label to unlabeled nodes

use async_trait::async_trait;
use qwiery::{intercept_fn, Adapter, AdapterApi, AdapterOptions, Operation, Request, SharedContext};
use serde_json::Value as JsonValue;
use tracing::debug;

/// Label used when the options name none
pub const DEFAULT_NODE_LABEL: &str = "Something";

/// Gives nodes created without labels a default one.
///
/// Options: `{"label": "..."}`; a missing label means [`DEFAULT_NODE_LABEL`],
/// anything but a non-blank string fails initialization.
pub struct DefaultNodeLabelAdapter;

fn label_option(options: &AdapterOptions) -> anyhow::Result<String> {
    match options.get("label") {
        None | Some(JsonValue::Null) => Ok(DEFAULT_NODE_LABEL.to_string()),
        Some(JsonValue::String(label)) if !label.trim().is_empty() => Ok(label.trim().to_string()),
        Some(other) => anyhow::bail!("option 'label' must be a non-empty string, got {}", other),
    }
}

#[async_trait]
impl Adapter for DefaultNodeLabelAdapter {
    async fn init(&self, options: AdapterOptions, _context: SharedContext) -> anyhow::Result<AdapterApi> {
        let label = label_option(&options)?;

        Ok(AdapterApi::new().with(Operation::CreateNode, move |next| {
            intercept_fn(move |request| {
                let next = next.clone();
                let label = label.clone();
                async move {
                    let request = match request {
                        Request::CreateNode(mut spec) if spec.labels.is_empty() => {
                            debug!("Assigning default label '{}'", label);
                            spec.labels.insert(label);
                            Request::CreateNode(spec)
                        }
                        other => other,
                    };
                    next.call(request).await
                }
            })
        }))
    }
}
