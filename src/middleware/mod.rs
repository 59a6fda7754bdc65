//! Middleware layer.
//!
//! A middleware wraps exactly one inner [`Service`] and, per request, either
//! forwards to it or short-circuits with its own [`Response`]. Middlewares
//! are described by a [`Layer`]; the [`Chain`](crate::Chain) builder asks each
//! layer to wrap the stage below it, once, at startup.
//!
//! Built-ins:
//! - [`NotFound`]: 404 unless the path is in an allow-list
//! - [`BearerAuth`]: 401 unless the bearer token verifies
//!
//! Ad-hoc stages (tracing, request ids, test spies) come from [`from_fn`].

use std::future::Future;
use std::sync::Arc;

use crate::handler::{BoxFuture, ErasedHandler, Service};
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::router::Routes;

mod auth;
mod not_found;

pub use auth::{BearerAuth, Verifier, VerifyError};
pub use not_found::{AllowList, NotFound};

/// Describes how to wrap an inner [`Service`] with one middleware stage.
///
/// `routes` is the path set of the router the chain is registered on, or
/// whatever set the caller composed the chain against. Layers that do not
/// gate on paths ignore it.
pub trait Layer: Send + Sync + 'static {
    fn layer(&self, inner: Service, routes: &Routes) -> Service;
}

// ── Next ──────────────────────────────────────────────────────────────────────

/// The rest of the chain, as seen from inside a [`from_fn`] middleware.
///
/// `run` consumes `self`: a stage forwards at most once per request, so at
/// most one downstream response exists for it to return.
pub struct Next(Service);

impl Next {
    pub async fn run(self, req: Request) -> Response {
        self.0.call(req).await
    }
}

// ── from_fn ───────────────────────────────────────────────────────────────────

/// Builds a [`Layer`] from an async function or closure.
///
/// ```rust
/// use wicket::{Chain, Request};
/// use wicket::middleware::{from_fn, Next};
///
/// async fn log_path(req: Request, next: Next) -> wicket::Response {
///     tracing::info!(path = req.path(), "request");
///     next.run(req).await
/// }
///
/// async fn index(_req: Request) -> &'static str { "hi" }
///
/// let chain = Chain::builder().with(from_fn(log_path)).handler(index);
/// ```
pub fn from_fn<F>(f: F) -> FromFn<F> {
    FromFn(Arc::new(f))
}

/// A [`Layer`] built by [`from_fn`].
pub struct FromFn<F>(Arc<F>);

impl<F, Fut, R> Layer for FromFn<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn layer(&self, inner: Service, _routes: &Routes) -> Service {
        Service::new(FromFnStage { f: Arc::clone(&self.0), inner })
    }
}

struct FromFnStage<F> {
    f: Arc<F>,
    inner: Service,
}

impl<F, Fut, R> ErasedHandler for FromFnStage<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.f)(req, Next(self.inner.clone()));
        Box::pin(async move { fut.await.into_response() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    async fn leaf(_req: Request) -> &'static str {
        "leaf"
    }

    #[tokio::test]
    async fn from_fn_can_forward() {
        let layer = from_fn(|req: Request, next: Next| async move { next.run(req).await });
        let svc = layer.layer(Service::from_handler(leaf), &Routes::default());
        let res = svc.call(Request::builder().build()).await;
        assert_eq!(res.body(), b"leaf");
    }

    #[tokio::test]
    async fn from_fn_can_short_circuit() {
        let layer = from_fn(|_req: Request, _next: Next| async { StatusCode::FORBIDDEN });
        let svc = layer.layer(Service::from_handler(leaf), &Routes::default());
        let res = svc.call(Request::builder().build()).await;
        assert_eq!(res.status_code(), StatusCode::FORBIDDEN);
        assert!(res.body().is_empty());
    }
}
