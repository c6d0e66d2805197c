//! Interceptor chains
//!
//! A chain is a stack of [`Interceptor`]s ending in a [`NativeLink`]. Each
//! interceptor owns the [`Next`] link it wraps and decides whether to call it.

use super::operation::{Request, Response};
use crate::graph::GraphResult;
use crate::store::Store;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

/// One link of a call chain
#[async_trait]
pub trait Interceptor: Send + Sync {
    async fn call(&self, request: Request) -> GraphResult<Response>;
}

/// The rest of the chain, as seen by an interceptor
pub type Next = Arc<dyn Interceptor>;

/// Innermost link: runs the request on the wrapped store
pub struct NativeLink {
    store: Arc<dyn Store>,
}

impl NativeLink {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Interceptor for NativeLink {
    async fn call(&self, request: Request) -> GraphResult<Response> {
        request.dispatch(self.store.as_ref()).await
    }
}

/// Interceptor backed by a closure; see [`intercept_fn`]
pub struct FnInterceptor<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> Interceptor for FnInterceptor<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = GraphResult<Response>> + Send + 'static,
{
    async fn call(&self, request: Request) -> GraphResult<Response> {
        (self.f)(request).await
    }
}

/// Build a link from an async closure.
///
/// The closure usually captures the `next` link it was handed:
///
/// ```rust
/// use qwiery::adapter::{intercept_fn, Interceptor, Next};
///
/// fn passthrough(next: Next) -> Next {
///     intercept_fn(move |request| {
///         let next = next.clone();
///         async move { next.call(request).await }
///     })
/// }
/// ```
pub fn intercept_fn<F, Fut>(f: F) -> Next
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = GraphResult<Response>> + Send + 'static,
{
    Arc::new(FnInterceptor { f })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::Operation;
    use crate::graph::NodeSpec;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_native_link_dispatches() {
        let link = NativeLink::new(Arc::new(MemoryStore::new()));
        let response = link
            .call(Request::CreateNode(NodeSpec::from("a")))
            .await
            .unwrap();
        assert_eq!(response.into_node(Operation::CreateNode).unwrap().id.as_str(), "a");

        let exists = link
            .call(Request::NodeExists("a".into()))
            .await
            .unwrap();
        assert_eq!(exists, Response::Bool(true));
    }

    #[tokio::test]
    async fn test_closure_can_short_circuit() {
        let link = intercept_fn(|_request| async { Ok(Response::Count(42)) });
        let response = link.call(Request::NodeCount(None)).await.unwrap();
        assert_eq!(response, Response::Count(42));
    }
}
