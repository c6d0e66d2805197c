//! Adapter registration protocol
//!
//! An [`Adapter`] is initialized once, asynchronously, with its options and
//! the engine's [`SharedContext`]. Initialization either fails, in which
//! case the adapter is rejected, or yields an [`AdapterApi`]: for each
//! operation it wants to intercept, a factory turning the rest of the chain
//! into the interceptor that wraps it.

use super::chain::Next;
use super::operation::Operation;
use super::plugin::SharedContext;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::fmt;

/// Untyped adapter options (`Null` when none are given)
pub type AdapterOptions = JsonValue;

/// Turns the rest of the chain into an interceptor
pub type InterceptorFactory = Box<dyn FnOnce(Next) -> Next + Send>;

/// Interceptor factories an adapter installs, by operation
#[derive(Default)]
pub struct AdapterApi {
    factories: IndexMap<Operation, InterceptorFactory>,
}

impl AdapterApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<F>(mut self, operation: Operation, factory: F) -> Self
    where
        F: FnOnce(Next) -> Next + Send + 'static,
    {
        self.insert(operation, factory);
        self
    }

    /// Set the factory for an operation, replacing any previous one
    pub fn insert<F>(&mut self, operation: Operation, factory: F)
    where
        F: FnOnce(Next) -> Next + Send + 'static,
    {
        self.factories.insert(operation, Box::new(factory));
    }

    pub fn operations(&self) -> impl Iterator<Item = Operation> + '_ {
        self.factories.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    pub(crate) fn into_factories(self) -> IndexMap<Operation, InterceptorFactory> {
        self.factories
    }
}

impl fmt::Debug for AdapterApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.factories.keys()).finish()
    }
}

/// Installable interceptor bundle
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Prepare the adapter; an error keeps it out of every chain
    async fn init(&self, options: AdapterOptions, context: SharedContext) -> anyhow::Result<AdapterApi>;
}
