use qwiery::{
    EdgeId, EdgeSpec, ErrorKind, GraphEngine, Label, MemoryStore, NodeId, NodeSpec, PathQuery,
    Predicate, QueryObject, Store, DEFAULT_AMOUNT, DEFAULT_EDGES_BETWEEN_AMOUNT,
};
use serde_json::json;
use std::collections::BTreeSet;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// The same checks against any store
async fn check_contract(store: &dyn Store) {
    // empty store
    store.clear().await.unwrap();
    assert_eq!(store.node_count(None).await.unwrap(), 0);
    assert!(store.get_node_labels().await.unwrap().is_empty());

    // nodes
    let alice = store
        .create_node(NodeSpec::from_json(json!({"id": "alice", "labels": ["Person"], "name": "Alice"})).unwrap())
        .await
        .unwrap();
    assert_eq!(alice.get_property("name").and_then(|v| v.as_string()), Some("Alice"));
    store
        .create_node(NodeSpec::from_args(Some(json!({"name": "Bob"})), Some("bob"), Some(vec!["Person".into()])).unwrap())
        .await
        .unwrap();
    let city = store
        .create_node(NodeSpec::new().with_label("City").with_property("name", "Ghent"))
        .await
        .unwrap();

    let err = store.create_node(NodeSpec::from("alice")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateId);

    // edges
    store
        .create_edge(EdgeSpec::new("alice", "bob").with_id("ab").with_label("knows"))
        .await
        .unwrap();
    store
        .create_edge(EdgeSpec::new("alice", city.id.clone()).with_label("livesIn"))
        .await
        .unwrap();
    let err = store.create_edge(EdgeSpec::new("alice", "nobody")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DanglingReference);

    let (a, b) = (NodeId::new("alice"), NodeId::new("bob"));
    assert!(store.edge_exists(&EdgeId::new("ab")).await.unwrap());
    assert_eq!(
        store.get_edges_between(&a, &b, DEFAULT_EDGES_BETWEEN_AMOUNT).await.unwrap().len(),
        1
    );
    assert!(store.get_edge_between(&b, &a).await.unwrap().is_none());
    assert!(store
        .get_edge_with_label(&a, &b, &Label::new("knows"))
        .await
        .unwrap()
        .is_some());
    assert_eq!(store.get_downstream_edges(&a, DEFAULT_AMOUNT).await.unwrap().len(), 2);
    assert_eq!(store.get_upstream_edges(&b, DEFAULT_AMOUNT).await.unwrap().len(), 1);

    // queries
    let persons = store
        .get_nodes_with_label(&Label::new("Person"), DEFAULT_AMOUNT)
        .await
        .unwrap();
    assert_eq!(persons.len(), 2);
    let named_bob = store
        .get_node(QueryObject::new().with("name", "Bob").into())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(named_bob.id, b);
    let labels: BTreeSet<Label> = store.get_node_labels().await.unwrap().into_iter().collect();
    assert_eq!(labels.len(), 2);

    let query = PathQuery::parse(["Person", "knows", "Person"]).unwrap();
    let result = store.path_query(query, DEFAULT_AMOUNT).await.unwrap();
    assert_eq!(result.nodes.len(), 2);
    assert_eq!(result.edges.len(), 1);

    let schema = store.infer_schema_graph(true).await.unwrap();
    assert_eq!(schema.node(&["Person"]).unwrap().count, 2);
    assert_eq!(schema.edges.len(), 2);

    // cascade
    store.delete_node(&a).await.unwrap();
    assert_eq!(store.edge_count(None).await.unwrap(), 0);
    assert!(store.get_upstream_edges(&b, DEFAULT_AMOUNT).await.unwrap().is_empty());

    let deleted = store
        .delete_nodes(Predicate::new(|n: &qwiery::Node| n.has_label(&Label::new("City"))))
        .await
        .unwrap();
    assert_eq!(deleted, vec![city.id]);
    assert_eq!(store.node_count(None).await.unwrap(), 1);

    // clearing twice is fine
    store.clear().await.unwrap();
    store.clear().await.unwrap();
    assert_eq!(store.node_count(None).await.unwrap(), 0);
}

#[tokio::test]
async fn test_memory_store_contract() {
    init_tracing();
    check_contract(&MemoryStore::new()).await;
}

#[tokio::test]
async fn test_engine_contract() {
    init_tracing();
    check_contract(&GraphEngine::in_memory()).await;
}

#[tokio::test]
async fn test_batch_reports_failures() {
    init_tracing();
    let store = MemoryStore::new();
    store.create_node(NodeSpec::from("taken")).await.unwrap();

    let outcome = store
        .create_nodes(vec!["one".into(), "taken".into(), NodeSpec::new().with_label("Anon")])
        .await
        .unwrap();
    assert_eq!(outcome.succeeded.len(), 2);
    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].index, 1);
    assert!(outcome.into_result().is_err());
    assert_eq!(store.node_count(None).await.unwrap(), 3);
}

#[tokio::test]
async fn test_upsert_matches_create_then_update() {
    let store = MemoryStore::new();
    let created = store.upsert_node(NodeSpec::new().with_id("n").with_label("A")).await.unwrap();
    assert!(created.has_label(&Label::new("A")));

    let updated = store.upsert_node(NodeSpec::new().with_id("n").with_label("B")).await.unwrap();
    assert!(!updated.has_label(&Label::new("A")));
    assert_eq!(store.node_count(None).await.unwrap(), 1);
    assert!(store
        .get_nodes_with_label(&Label::new("A"), DEFAULT_AMOUNT)
        .await
        .unwrap()
        .is_empty());
}
