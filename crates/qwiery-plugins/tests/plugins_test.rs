use qwiery::{ErrorKind, GraphEngine, Label, NodeSpec, PluginMethods, Store};
use qwiery_plugins::two_in_one::{ADAPTER_NAME, SET_COLOR};
use qwiery_plugins::{install_two_in_one, DefaultNodeLabelAdapter, Gravitation};
use serde_json::json;

#[tokio::test]
async fn test_gravitation_plugin() {
    let engine = GraphEngine::in_memory();
    engine.register_plugin(Gravitation::plugin()).await.unwrap();

    let value = engine.call_plugin("collapse", vec![]).await.unwrap();
    assert_eq!(value.as_f64(), Some(f64::EPSILON));
}

#[tokio::test]
async fn test_default_node_label() {
    let engine = GraphEngine::in_memory();
    engine
        .register_adapter("set-node-label", DefaultNodeLabelAdapter, json!(null))
        .await
        .unwrap();

    let unlabeled = engine.create_node(NodeSpec::new()).await.unwrap();
    assert_eq!(unlabeled.labels.sorted(), vec![Label::new("Something")]);

    let labeled = engine
        .create_node(NodeSpec::new().with_label("Person"))
        .await
        .unwrap();
    assert_eq!(labeled.labels.sorted(), vec![Label::new("Person")]);

    // updates are not intercepted
    let updated = engine
        .update_node(NodeSpec::new().with_id(unlabeled.id.clone()))
        .await
        .unwrap();
    assert!(updated.labels.is_empty());
}

#[tokio::test]
async fn test_default_node_label_rejects_bad_options() {
    let engine = GraphEngine::in_memory();
    let err = engine
        .register_adapter("set-node-label", DefaultNodeLabelAdapter, json!({"label": 12}))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AdapterInitFailed);

    let node = engine.create_node(NodeSpec::new()).await.unwrap();
    assert!(node.labels.is_empty());
}

#[tokio::test]
async fn test_two_in_one_shares_color() {
    let engine = GraphEngine::in_memory();
    install_two_in_one(&engine).await.unwrap();

    let first = engine.create_node(NodeSpec::from("a")).await.unwrap();
    assert_eq!(first.get_property("color").and_then(|v| v.as_string()), Some("white"));

    engine.call_plugin("setColor", vec![json!("red")]).await.unwrap();
    let second = engine.create_node(NodeSpec::from("b")).await.unwrap();
    assert_eq!(second.get_property("color").and_then(|v| v.as_string()), Some("red"));

    let explicit = engine
        .create_node(NodeSpec::new().with_property("color", "green"))
        .await
        .unwrap();
    assert_eq!(explicit.get_property("color").and_then(|v| v.as_string()), Some("green"));
}

#[tokio::test]
async fn test_adapters_stack() {
    let engine = GraphEngine::in_memory();
    engine
        .register_adapter("set-node-label", DefaultNodeLabelAdapter, json!({"label": "Thing"}))
        .await
        .unwrap();
    install_two_in_one(&engine).await.unwrap();

    let node = engine.create_node(NodeSpec::new()).await.unwrap();
    assert!(node.labels.contains_str("Thing"));
    assert!(node.get_property("color").is_some());
    assert_eq!(engine.adapter_names().await, vec!["set-node-label", "two-in-one"]);
}

#[tokio::test]
async fn test_two_in_one_installs_nothing_when_plugin_name_taken() {
    let engine = GraphEngine::in_memory();
    engine
        .register_plugin(PluginMethods::new().with_method(SET_COLOR, |_context, _args| Ok(json!(null))))
        .await
        .unwrap();

    let err = install_two_in_one(&engine).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidSpec);
    assert!(engine.adapter_names().await.is_empty());

    let node = engine.create_node(NodeSpec::new()).await.unwrap();
    assert!(node.get_property("color").is_none());
}

#[tokio::test]
async fn test_two_in_one_installs_nothing_when_adapter_name_taken() {
    let engine = GraphEngine::in_memory();
    engine
        .register_adapter(ADAPTER_NAME, DefaultNodeLabelAdapter, json!(null))
        .await
        .unwrap();

    let err = install_two_in_one(&engine).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidSpec);
    assert!(!engine.has_plugin(SET_COLOR).await);
}
