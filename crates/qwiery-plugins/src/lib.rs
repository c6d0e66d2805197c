//! Example adapters and plugins for the Qwiery graph store
//!
//! - [`Gravitation`]: a plugin contributing a single `collapse` method
//! - [`DefaultNodeLabelAdapter`]: gives unlabeled nodes a default label on creation
//! - [`two_in_one`]: a plugin and an adapter cooperating through the shared context
//!
//! # Quick Start
//!
//! ```rust
//! use qwiery::{GraphEngine, NodeSpec, Store};
//! use qwiery_plugins::DefaultNodeLabelAdapter;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let engine = GraphEngine::in_memory();
//!     engine
//!         .register_adapter("set-node-label", DefaultNodeLabelAdapter, json!({"label": "Thing"}))
//!         .await
//!         .unwrap();
//!
//!     let node = engine.create_node(NodeSpec::new()).await.unwrap();
//!     assert!(node.labels.contains_str("Thing"));
//! }
//! ```

pub mod default_label;
pub mod gravitation;
pub mod two_in_one;

pub use default_label::{DefaultNodeLabelAdapter, DEFAULT_NODE_LABEL};
pub use gravitation::Gravitation;
pub use two_in_one::{install_two_in_one, TwoInOneAdapter, COLOR_KEY, DEFAULT_COLOR};
