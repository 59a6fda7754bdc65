//! Minimal wicket example: an open route and a bearer-protected one.
//!
//! Run with:
//!   WICKET_TOKEN=s3cret cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:3000/                                   # 200
//!   curl -i -X POST http://localhost:3000/post                       # 401
//!   curl -i -X POST -H 'authorization: Bearer s3cret' \
//!        http://localhost:3000/post                                  # 200
//!   curl -i http://localhost:3000/unknown                            # 404
//!
//! Environment:
//!   WICKET_ADDR   bind address (default 0.0.0.0:3000)
//!   WICKET_TOKEN  the one token `/post` accepts (default "s3cret")

use std::env;

use wicket::middleware::{BearerAuth, NotFound, VerifyError};
use wicket::{Chain, Request, Response, Router, Server};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let addr = env::var("WICKET_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_owned());
    let expected = env::var("WICKET_TOKEN").unwrap_or_else(|_| "s3cret".to_owned());

    // Stand-in for a real signature check (JWT, PASETO, ...).
    let auth = BearerAuth::new(move |token: &str| -> Result<bool, VerifyError> {
        if token.is_empty() {
            return Err("empty token".into());
        }
        Ok(token == expected)
    });

    let app = Router::new()
        .route("/", Chain::builder().with(NotFound::registered()).handler(index))
        .route(
            "/post",
            Chain::builder()
                .with(NotFound::registered())
                .with(auth)
                .handler(post),
        );

    if let Err(e) = Server::bind(addr).serve(app).await {
        eprintln!("server error: {e}");
        std::process::exit(1);
    }
}

// GET /
async fn index(_req: Request) -> Response {
    Response::text("Middlewares in Rust!")
}

// POST /post, only reached with a verified bearer token.
async fn post(req: Request) -> Response {
    Response::text(format!("You are authorized ({} bytes received)", req.body().len()))
}
