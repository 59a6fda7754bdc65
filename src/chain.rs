//! Chain builder.
//!
//! A chain is an ordered list of [`Layer`]s around one leaf handler:
//!
//! ```text
//! Chain::builder().with(a).with(b).handler(leaf)
//!
//!   request → a → b → leaf
//! ```
//!
//! Composition folds right-to-left: `b` wraps the leaf first, then `a` wraps
//! `b`. The first layer declared is the outermost and sees the request first.
//! Each chain is composed once, when the router becomes a dispatcher, and is
//! never rewired afterwards.

use std::fmt;
use std::sync::Arc;

use crate::handler::{Handler, Service};
use crate::middleware::Layer;
use crate::router::Routes;

/// Ordered middlewares around one leaf handler. Obtain via
/// [`Chain::builder`] or [`Chain::leaf`].
#[derive(Clone)]
pub struct Chain {
    layers: Vec<Arc<dyn Layer>>,
    leaf: Service,
}

impl Chain {
    pub fn builder() -> ChainBuilder {
        ChainBuilder { layers: Vec::new() }
    }

    /// A chain with no middleware: every request goes straight to `handler`.
    pub fn leaf(handler: impl Handler) -> Self {
        Self::builder().handler(handler)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Wraps the leaf in every layer and returns the outermost stage.
    ///
    /// `routes` is handed to each layer; [`NotFound::registered`] reads its
    /// allow-list from it.
    ///
    /// [`NotFound::registered`]: crate::middleware::NotFound::registered
    pub fn compose(&self, routes: &Routes) -> Service {
        self.layers
            .iter()
            .rev()
            .fold(self.leaf.clone(), |inner, layer| layer.layer(inner, routes))
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain").field("layers", &self.layers.len()).finish()
    }
}

/// Collects layers in declaration order. Terminated by [`handler`](Self::handler).
#[derive(Default)]
pub struct ChainBuilder {
    layers: Vec<Arc<dyn Layer>>,
}

impl ChainBuilder {
    /// Appends a layer. Earlier layers run before later ones.
    pub fn with(mut self, layer: impl Layer) -> Self {
        self.layers.push(Arc::new(layer));
        self
    }

    pub fn handler(self, handler: impl Handler) -> Chain {
        Chain { layers: self.layers, leaf: Service::from_handler(handler) }
    }
}
