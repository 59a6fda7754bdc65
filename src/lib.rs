//! # wicket
//!
//! Composable middleware chains and exact-path dispatch for HTTP services.
//!
//! ## The model
//!
//! Every registered path owns one [`Chain`]: an ordered list of middlewares
//! around a single leaf handler. A request walks the chain outermost-first.
//! Each middleware either forwards it to the next stage or answers it on the
//! spot; the leaf answers whatever gets through.
//!
//! ```text
//! Dispatcher ── path lookup ──▶ NotFound ──▶ BearerAuth ──▶ leaf
//!      │                           │              │
//!      └─ 404 (no route)           └─ 404         └─ 401
//! ```
//!
//! Rejections are responses, not errors: nothing on the request path returns
//! `Err` or panics.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use wicket::{Chain, Request, Router, Server};
//! use wicket::middleware::{BearerAuth, NotFound, VerifyError};
//!
//! #[tokio::main]
//! async fn main() {
//!     let auth = BearerAuth::new(|token: &str| Ok::<_, VerifyError>(token == "s3cret"));
//!
//!     let app = Router::new()
//!         .route("/", Chain::builder()
//!             .with(NotFound::registered())
//!             .handler(index))
//!         .route("/post", Chain::builder()
//!             .with(NotFound::registered())
//!             .with(auth)
//!             .handler(post));
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! async fn index(_req: Request) -> &'static str {
//!     "Middlewares in Rust!"
//! }
//!
//! async fn post(_req: Request) -> &'static str {
//!     "You are authorized"
//! }
//! ```

mod chain;
mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod middleware;

pub use chain::{Chain, ChainBuilder};
pub use error::{Error, Rejection};
pub use handler::{Handler, Service};
pub use request::{Request, RequestBuilder};
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::{Dispatcher, Router, Routes};
pub use server::Server;

pub use http::{Method, StatusCode, header};
