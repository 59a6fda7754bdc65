//! Path allow-list gate.

use tracing::debug;

use crate::error::Rejection;
use crate::handler::{BoxFuture, ErasedHandler, Service};
use crate::middleware::Layer;
use crate::request::Request;
use crate::response::IntoResponse;
use crate::router::Routes;

/// Where a [`NotFound`] gate gets its allowed paths.
#[derive(Clone, Debug)]
pub enum AllowList {
    /// The paths registered on the router the chain is mounted on.
    Registered,
    /// A fixed set, for chains composed outside a router.
    Paths(Routes),
}

/// Answers `404 Not Found` unless the request path is in the allow-list.
///
/// Matching is exact: no trailing-slash folding, no wildcards, no
/// normalisation.
#[derive(Clone, Debug)]
pub struct NotFound {
    allow: AllowList,
}

impl NotFound {
    /// Allow exactly the paths registered on the owning router.
    pub fn registered() -> Self {
        Self { allow: AllowList::Registered }
    }

    /// Allow a fixed set of paths.
    pub fn allow<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { allow: AllowList::Paths(paths.into_iter().collect()) }
    }
}

impl Layer for NotFound {
    fn layer(&self, inner: Service, routes: &Routes) -> Service {
        let allowed = match &self.allow {
            AllowList::Registered => routes.clone(),
            AllowList::Paths(paths) => paths.clone(),
        };
        Service::new(NotFoundStage { allowed, inner })
    }
}

struct NotFoundStage {
    allowed: Routes,
    inner: Service,
}

impl ErasedHandler for NotFoundStage {
    fn call(&self, req: Request) -> BoxFuture {
        if self.allowed.contains(req.path()) {
            return Box::pin(self.inner.call(req));
        }
        debug!(path = req.path(), "path not in allow-list");
        Box::pin(async { Rejection::PathNotAllowed.into_response() })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use http::StatusCode;

    use super::*;

    fn counting_leaf(hits: &Arc<AtomicUsize>) -> Service {
        let hits = Arc::clone(hits);
        Service::from_handler(move |_req: Request| {
            let hits = Arc::clone(&hits);
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                "ok"
            }
        })
    }

    fn get(path: &str) -> Request {
        Request::builder().path(path).build()
    }

    #[tokio::test]
    async fn forwards_allowed_paths() {
        let hits = Arc::new(AtomicUsize::new(0));
        let svc = NotFound::allow(["/", "/post"]).layer(counting_leaf(&hits), &Routes::default());

        let res = svc.call(get("/post")).await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rejects_unlisted_paths_without_forwarding() {
        let hits = Arc::new(AtomicUsize::new(0));
        let svc = NotFound::allow(["/"]).layer(counting_leaf(&hits), &Routes::default());

        for path in ["/unknown", "/post/", "", "/POST"] {
            let res = svc.call(get(path)).await;
            assert_eq!(res.status_code(), StatusCode::NOT_FOUND, "path {path:?}");
        }
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn registered_uses_the_injected_routes() {
        let hits = Arc::new(AtomicUsize::new(0));
        let routes: Routes = ["/a", "/b"].into_iter().collect();
        let svc = NotFound::registered().layer(counting_leaf(&hits), &routes);

        assert_eq!(svc.call(get("/b")).await.status_code(), StatusCode::OK);
        assert_eq!(svc.call(get("/c")).await.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fixed_list_ignores_the_injected_routes() {
        let hits = Arc::new(AtomicUsize::new(0));
        let routes: Routes = ["/a"].into_iter().collect();
        let svc = NotFound::allow(["/z"]).layer(counting_leaf(&hits), &routes);

        assert_eq!(svc.call(get("/a")).await.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(svc.call(get("/z")).await.status_code(), StatusCode::OK);
    }
}
