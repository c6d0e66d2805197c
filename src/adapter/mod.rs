//! Adapter pipeline
//!
//! Adapters wrap individual store operations in interceptor chains; plugins
//! add free-standing methods. Both are installed on a
//! [`GraphEngine`](crate::engine::GraphEngine).

pub mod chain;
pub mod operation;
pub mod plugin;
pub mod registry;

// Re-export main types
pub use chain::{intercept_fn, FnInterceptor, Interceptor, NativeLink, Next};
pub use operation::{Operation, Request, Response};
pub use plugin::{PluginMethod, PluginMethods, SharedContext};
pub use registry::{Adapter, AdapterApi, AdapterOptions, InterceptorFactory};
