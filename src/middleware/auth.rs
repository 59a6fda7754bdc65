//! Bearer-token gate.
//!
//! Token checking itself (signatures, expiry, key rotation) lives behind the
//! [`Verifier`] trait. This stage only extracts the token and turns the
//! verdict into "forward" or `401 Unauthorized`.

use std::error::Error as StdError;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use http::header::AUTHORIZATION;
use tracing::{debug, warn};

use crate::error::Rejection;
use crate::handler::{BoxFuture, ErasedHandler, Service};
use crate::middleware::Layer;
use crate::request::Request;
use crate::response::IntoResponse;
use crate::router::Routes;

/// Any failure reported by a [`Verifier`].
pub type VerifyError = Box<dyn StdError + Send + Sync + 'static>;

/// Decides whether a bearer token is acceptable.
///
/// `Ok(true)` lets the request through. `Ok(false)` and every `Err` are
/// treated the same way: `401 Unauthorized`.
///
/// Closures implement it directly:
///
/// ```rust
/// use wicket::middleware::{BearerAuth, VerifyError};
///
/// let auth = BearerAuth::new(|token: &str| Ok::<_, VerifyError>(token == "let-me-in"));
/// ```
pub trait Verifier: Send + Sync + 'static {
    fn verify(&self, token: &str) -> Result<bool, VerifyError>;
}

impl<F, E> Verifier for F
where
    F: Fn(&str) -> Result<bool, E> + Send + Sync + 'static,
    E: Into<VerifyError>,
{
    fn verify(&self, token: &str) -> Result<bool, VerifyError> {
        self(token).map_err(Into::into)
    }
}

/// Answers `401 Unauthorized` unless the `Authorization` bearer token
/// verifies.
///
/// A missing header is an empty token. One leading `"Bearer "` (exact case)
/// is stripped; anything else is handed to the verifier as-is.
#[derive(Clone)]
pub struct BearerAuth {
    verifier: Arc<dyn Verifier>,
}

impl BearerAuth {
    pub fn new(verifier: impl Verifier) -> Self {
        Self { verifier: Arc::new(verifier) }
    }
}

impl Layer for BearerAuth {
    fn layer(&self, inner: Service, _routes: &Routes) -> Service {
        Service::new(BearerAuthStage { verifier: Arc::clone(&self.verifier), inner })
    }
}

struct BearerAuthStage {
    verifier: Arc<dyn Verifier>,
    inner: Service,
}

impl BearerAuthStage {
    fn authorized(&self, req: &Request) -> bool {
        let raw = req.header(AUTHORIZATION.as_str()).unwrap_or("");
        let token = raw.strip_prefix("Bearer ").unwrap_or(raw);

        // A verifier bug must not take the request task down with it.
        match catch_unwind(AssertUnwindSafe(|| self.verifier.verify(token))) {
            Ok(Ok(valid)) => valid,
            Ok(Err(e)) => {
                debug!(path = req.path(), error = %e, "bearer token rejected");
                false
            }
            Err(_) => {
                warn!(path = req.path(), "token verifier panicked");
                false
            }
        }
    }
}

impl ErasedHandler for BearerAuthStage {
    fn call(&self, req: Request) -> BoxFuture {
        if self.authorized(&req) {
            return Box::pin(self.inner.call(req));
        }
        Box::pin(async { Rejection::AuthenticationFailed.into_response() })
    }
}

#[cfg(test)]
mod tests {
    use std::fmt;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use http::StatusCode;
    use http::header::HeaderValue;

    use super::*;
    use crate::request::RequestBuilder;

    #[derive(Debug)]
    struct Tampered;

    impl fmt::Display for Tampered {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("signature mismatch")
        }
    }

    impl StdError for Tampered {}

    /// Accepts `"good"`, rejects `"stale"`, errors on anything else.
    fn verifier(token: &str) -> Result<bool, Tampered> {
        match token {
            "good" => Ok(true),
            "stale" => Ok(false),
            _ => Err(Tampered),
        }
    }

    fn guarded(verifier: impl Verifier, hits: &Arc<AtomicUsize>) -> Service {
        let hits = Arc::clone(hits);
        let leaf = Service::from_handler(move |_req: Request| {
            let hits = Arc::clone(&hits);
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                "secret"
            }
        });
        BearerAuth::new(verifier).layer(leaf, &Routes::default())
    }

    fn post() -> RequestBuilder {
        Request::builder().path("/post")
    }

    #[tokio::test]
    async fn valid_token_forwards_once() {
        let hits = Arc::new(AtomicUsize::new(0));
        let svc = guarded(verifier, &hits);

        let res = svc.call(post().bearer("good").build()).await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.body(), b"secret");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let hits = Arc::new(AtomicUsize::new(0));
        let svc = guarded(verifier, &hits);

        let res = svc.call(post().build()).await;
        assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(res.body(), b"Unauthorized");
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_and_erroring_tokens_look_the_same() {
        let hits = Arc::new(AtomicUsize::new(0));
        let svc = guarded(verifier, &hits);

        let stale = svc.call(post().bearer("stale").build()).await;
        let tampered = svc.call(post().bearer("tampered").build()).await;
        assert_eq!(stale.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(stale.status_code(), tampered.status_code());
        assert_eq!(stale.body(), tampered.body());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn prefix_is_stripped_once_and_case_sensitively() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let record = {
            let seen = Arc::clone(&seen);
            move |token: &str| {
                seen.lock().unwrap().push(token.to_owned());
                Ok::<_, VerifyError>(false)
            }
        };
        let svc = guarded(record, &Arc::new(AtomicUsize::new(0)));

        for value in ["Bearer abc", "Bearer Bearer abc", "bearer abc", "abc"] {
            let req = post().header(AUTHORIZATION, HeaderValue::from_static(value)).build();
            svc.call(req).await;
        }
        svc.call(post().build()).await;

        assert_eq!(
            *seen.lock().unwrap(),
            ["abc", "Bearer abc", "bearer abc", "abc", ""],
        );
    }

    #[tokio::test]
    async fn panicking_verifier_is_unauthorized() {
        let hits = Arc::new(AtomicUsize::new(0));
        let svc = guarded(
            |_token: &str| -> Result<bool, VerifyError> { panic!("malformed key") },
            &hits,
        );

        let res = svc.call(post().bearer("good").build()).await;
        assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
