//! A plugin and an adapter sharing one setting
//!
//! The `setColor` plugin method stores the current colour in the engine's
//! shared context; the `two-in-one` adapter adds that colour to the payload
//! of every created node. Keys already in the payload win.

use async_trait::async_trait;
use qwiery::{
    intercept_fn, Adapter, AdapterApi, AdapterOptions, GraphEngine, GraphError, GraphResult,
    Operation, PluginMethods, PropertyValue, Request, SharedContext,
};
use serde_json::{json, Value as JsonValue};

/// Shared context key holding the current colour
pub const COLOR_KEY: &str = "two-in-one.currentColor";

pub const DEFAULT_COLOR: &str = "white";

/// Name of the plugin method changing the colour
pub const SET_COLOR: &str = "setColor";

/// Name the adapter is registered under
pub const ADAPTER_NAME: &str = "two-in-one";

fn current_color(context: &SharedContext) -> String {
    context
        .get(COLOR_KEY)
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| DEFAULT_COLOR.to_string())
}

fn set_color(context: &SharedContext, args: Vec<JsonValue>) -> GraphResult<JsonValue> {
    match args.into_iter().next() {
        Some(JsonValue::String(color)) => {
            context.set(COLOR_KEY, JsonValue::String(color));
            Ok(JsonValue::Null)
        }
        other => Err(GraphError::InvalidSpec(format!(
            "setColor expects a colour name, got {}",
            other.unwrap_or(JsonValue::Null)
        ))),
    }
}

/// Adds the current colour to created nodes
pub struct TwoInOneAdapter;

#[async_trait]
impl Adapter for TwoInOneAdapter {
    async fn init(&self, _options: AdapterOptions, context: SharedContext) -> anyhow::Result<AdapterApi> {
        Ok(AdapterApi::new().with(Operation::CreateNode, move |next| {
            intercept_fn(move |request| {
                let next = next.clone();
                let color = current_color(&context);
                async move {
                    let request = match request {
                        Request::CreateNode(mut spec) => {
                            spec.data
                                .entry("color".to_string())
                                .or_insert(PropertyValue::String(color));
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

/// Install the `setColor` plugin method and the `two-in-one` adapter.
///
/// Both names are checked up front and the adapter goes in first, so a
/// failure leaves the engine without either part. A concurrent registration
/// of `setColor` between the check and the install can still leave the
/// adapter installed alone.
pub async fn install_two_in_one(engine: &GraphEngine) -> GraphResult<()> {
    if engine.has_plugin(SET_COLOR).await {
        return Err(GraphError::InvalidSpec(format!(
            "plugin method '{}' is already registered",
            SET_COLOR
        )));
    }
    engine
        .register_adapter(ADAPTER_NAME, TwoInOneAdapter, json!(null))
        .await?;
    engine
        .register_plugin(PluginMethods::new().with_method(SET_COLOR, set_color))
        .await
}
