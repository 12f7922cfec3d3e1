//! Call interception: filters run around every dispatched operation

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::context::CallContext;

/// Whether the rest of the chain should run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterAction {
    Continue,
    Stop,
}

/// Pre/post interception of dispatched calls
///
/// # Lifecycle
///
/// 1. **Pre-invoke**: runs in registration order after the handler has been
///    resolved and the argument count checked, before argument conversion.
///    Returning [`FilterAction::Stop`] ends the call: the context's current
///    result or error becomes the answer and no post-invoke hooks run.
///
/// 2. **Post-invoke**: runs in reverse registration order with the outcome in
///    the context. Filters may replace the result or error. Returning
///    [`FilterAction::Stop`] skips the remaining post-invoke hooks.
///
/// ```rust
/// use async_trait::async_trait;
/// use barrister_server::{CallContext, Filter, FilterAction, RpcError};
///
/// struct RequireUser;
///
/// #[async_trait]
/// impl Filter for RequireUser {
///     async fn pre_invoke(&self, ctx: &mut CallContext<'_>) -> FilterAction {
///         if ctx.request().header("x-user-id").is_none() {
///             ctx.set_error(RpcError::application(-32001, "not authenticated"));
///             return FilterAction::Stop;
///         }
///         FilterAction::Continue
///     }
/// }
/// ```
#[async_trait]
pub trait Filter: Send + Sync {
    async fn pre_invoke(&self, ctx: &mut CallContext<'_>) -> FilterAction {
        let _ = ctx;
        FilterAction::Continue
    }

    async fn post_invoke(&self, ctx: &mut CallContext<'_>) -> FilterAction {
        let _ = ctx;
        FilterAction::Continue
    }
}

/// Ordered collection of filters
#[derive(Default, Clone)]
pub struct FilterChain {
    filters: Vec<Arc<dyn Filter>>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter to the end of the chain
    pub fn push(&mut self, filter: Arc<dyn Filter>) {
        self.filters.push(filter);
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Run pre-invoke hooks in registration order, stopping at the first `Stop`
    pub async fn run_pre(&self, ctx: &mut CallContext<'_>) -> FilterAction {
        for (index, filter) in self.filters.iter().enumerate() {
            if filter.pre_invoke(ctx).await == FilterAction::Stop {
                debug!("Filter {} stopped {} before invocation", index, ctx.method());
                return FilterAction::Stop;
            }
        }
        FilterAction::Continue
    }

    /// Run post-invoke hooks in reverse registration order
    pub async fn run_post(&self, ctx: &mut CallContext<'_>) -> FilterAction {
        for (index, filter) in self.filters.iter().enumerate().rev() {
            if filter.post_invoke(ctx).await == FilterAction::Stop {
                debug!("Filter {} stopped the post-invoke chain for {}", index, ctx.method());
                return FilterAction::Stop;
            }
        }
        FilterAction::Continue
    }
}
