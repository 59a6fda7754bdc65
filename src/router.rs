//! Exact-path router and the per-request dispatcher.
//!
//! Registration and dispatch are two types on purpose. A [`Router`] is the
//! only place routes can be added; [`Router::into_dispatcher`] consumes it,
//! composes every chain once, and returns a [`Dispatcher`] that can only
//! read. Nothing can be registered after the first request is dispatched.

use std::collections::HashSet;
use std::sync::Arc;

use matchit::Router as MatchitRouter;
use tracing::{Instrument, debug, debug_span};

use crate::chain::Chain;
use crate::error::Rejection;
use crate::handler::Service;
use crate::request::Request;
use crate::response::{IntoResponse, Response};

// ── Routes ────────────────────────────────────────────────────────────────────

/// A read-only set of exact paths.
///
/// Cheap to clone; every clone shares one set. The dispatcher hands its
/// registered set to each layer while composing chains.
#[derive(Clone, Debug, Default)]
pub struct Routes(Arc<HashSet<String>>);

impl Routes {
    pub fn contains(&self, path: &str) -> bool {
        self.0.contains(path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Routes {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(Arc::new(iter.into_iter().map(Into::into).collect()))
    }
}

// ── Router ────────────────────────────────────────────────────────────────────

/// The route table under construction.
///
/// Registrations are kept in order, path next to chain. Build it once at
/// startup; pass it to [`Server::serve`](crate::Server::serve) or turn it into
/// a [`Dispatcher`] yourself.
pub struct Router {
    entries: Vec<(String, Chain)>,
}

impl Router {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Register a chain for an exact path. Returns `self` for chaining.
    ///
    /// Method-agnostic: every method on `path` reaches the same chain.
    ///
    /// ```rust
    /// # use wicket::{Chain, Request, Router};
    /// # use wicket::middleware::NotFound;
    /// # async fn index(_: Request) -> &'static str { "" }
    /// # async fn health(_: Request) -> &'static str { "" }
    /// Router::new()
    ///     .route("/", Chain::builder().with(NotFound::registered()).handler(index))
    ///     .route("/healthz", Chain::leaf(health));
    /// ```
    ///
    /// # Panics
    ///
    /// At startup, if `path` does not start with `/`, contains route-parameter
    /// braces (`{` or `}`), or is already registered.
    pub fn route(mut self, path: &str, chain: Chain) -> Self {
        if !path.starts_with('/') {
            panic!("invalid route `{path}`: must start with `/`");
        }
        if path.contains(['{', '}']) {
            panic!("invalid route `{path}`: only exact paths are supported");
        }
        if self.entries.iter().any(|(registered, _)| registered == path) {
            panic!("invalid route `{path}`: already registered");
        }
        self.entries.push((path.to_owned(), chain));
        self
    }

    /// Every path registered so far.
    pub fn routes(&self) -> Routes {
        self.entries.iter().map(|(path, _)| path.as_str()).collect()
    }

    /// Freezes the table and composes every chain against it.
    ///
    /// The lookup tree and the [`Routes`] set handed to layers are both
    /// built here, from the same registrations.
    pub fn into_dispatcher(self) -> Dispatcher {
        let routes = self.routes();
        let mut tree = MatchitRouter::new();
        let mut chains = Vec::with_capacity(self.entries.len());
        for (index, (path, chain)) in self.entries.iter().enumerate() {
            tree.insert(path.as_str(), index)
                .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
            chains.push(chain.compose(&routes));
        }
        debug!(routes = routes.len(), "route table frozen");
        Dispatcher { tree, chains, routes }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

// ── Dispatcher ────────────────────────────────────────────────────────────────

/// The frozen route table. Per request: look up the path, run its chain.
///
/// Read-only and `Send + Sync`; share it behind an `Arc` across every
/// request task.
pub struct Dispatcher {
    tree: MatchitRouter<usize>,
    chains: Vec<Service>,
    routes: Routes,
}

impl Dispatcher {
    pub fn routes(&self) -> &Routes {
        &self.routes
    }

    /// Runs `req` through the chain registered for its path.
    ///
    /// An unregistered path is answered `404 Not Found` here, without
    /// invoking any chain.
    pub async fn dispatch(&self, req: Request) -> Response {
        let span = debug_span!("dispatch", method = %req.method(), path = req.path());
        async move {
            let res = match self.lookup(req.path()) {
                Some(chain) => chain.call(req).await,
                None => {
                    debug!("no route registered");
                    Rejection::RouteNotFound.into_response()
                }
            };
            debug!(status = res.status_code().as_u16(), "dispatched");
            res
        }
        .instrument(span)
        .await
    }

    fn lookup(&self, path: &str) -> Option<&Service> {
        let matched = self.tree.at(path).ok()?;
        self.chains.get(*matched.value)
    }
}
