//! Route handler abstraction.

use std::future::Future;
use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;

use crate::http::RequestContext;

/// Something that can serve a resolved request.
///
/// Implemented for any `Fn(RequestContext) -> impl Future<Output = impl IntoResponse>`,
/// so plain `async fn`s and closures can be registered directly.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, ctx: RequestContext) -> BoxFuture<'static, Response>;
}

impl<F, Fut> Handler for F
where
    F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: IntoResponse,
{
    fn call(&self, ctx: RequestContext) -> BoxFuture<'static, Response> {
        let fut = self(ctx);
        Box::pin(async move { fut.await.into_response() })
    }
}

/// Shared, type-erased handler.
pub type BoxHandler = Arc<dyn Handler>;
