//! Handler trait, type erasure, and the composed [`Service`].
//!
//! # How a chain is stored
//!
//! A chain mixes leaf handlers and middlewares of *different* concrete types,
//! and the dispatcher holds many chains in one table. Rust collections hold
//! one concrete type, so every stage is hidden behind a trait object
//! (`dyn ErasedHandler`) and stored uniformly:
//!
//! ```text
//! async fn index(req: Request) -> Response { … }    ← user writes this
//!        ↓ Chain::leaf(index)
//! index.into_boxed_handler()                        ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(index))                        ← heap-allocated wrapper
//!        ↓  wrapped by each layer, outermost last
//! Service(Arc<dyn ErasedHandler>)                   ← what the dispatcher calls
//!        ↓
//! service.call(req)  at request time                ← one vtable call per stage
//! ```
//!
//! The only runtime cost per stage is **one virtual call** plus one boxed
//! future.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future that resolves to a [`Response`].
///
/// `Send + 'static` let tokio move the future across threads.
#[doc(hidden)]
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface, one impl per stage kind.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid leaf handler.
///
/// You never implement this yourself. It is automatically satisfied for any
/// `async fn` or closure with the signature:
///
/// ```text
/// async fn name(req: Request) -> impl IntoResponse
/// ```
///
/// The trait is **sealed**: only the blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

/// Bridges a typed leaf function to the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

// ── Service ───────────────────────────────────────────────────────────────────

/// A fully or partially composed chain: the outermost stage plus everything
/// it wraps.
///
/// Cloning is one atomic increment; all clones share the same immutable
/// stages, so a `Service` can be read from any number of request tasks at
/// once.
#[derive(Clone)]
pub struct Service(BoxedHandler);

impl Service {
    /// Wraps a leaf handler.
    pub fn from_handler(handler: impl Handler) -> Self {
        Self(handler.into_boxed_handler())
    }

    pub(crate) fn new(stage: impl ErasedHandler + Send + Sync + 'static) -> Self {
        Self(Arc::new(stage))
    }

    /// Runs the request through this stage and everything it wraps.
    pub fn call(&self, req: Request) -> impl Future<Output = Response> + Send + use<> {
        self.0.call(req)
    }
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Service")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    async fn hello(_req: Request) -> &'static str {
        "hello"
    }

    #[tokio::test]
    async fn async_fn_is_a_handler() {
        let svc = Service::from_handler(hello);
        let res = svc.call(Request::builder().build()).await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.body(), b"hello");
    }

    #[tokio::test]
    async fn closures_returning_status_are_handlers() {
        let svc = Service::from_handler(|_req: Request| async { StatusCode::NO_CONTENT });
        let res = svc.call(Request::builder().build()).await;
        assert_eq!(res.status_code(), StatusCode::NO_CONTENT);
    }
}
