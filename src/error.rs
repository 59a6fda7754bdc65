//! Rejections and infrastructure errors.
//!
//! Two kinds of failure exist and they never mix:
//!
//! - [`Rejection`]: a request was turned away. It is *data*: a middleware or
//!   the dispatcher returns it as a response and the chain stops there.
//! - [`Error`]: the server itself could not run (bad address, bind failure).
//!   Only [`Server::serve`](crate::Server::serve) returns it.

use std::fmt;
use std::net::AddrParseError;

use http::StatusCode;
use http::header::{HeaderValue, WWW_AUTHENTICATE};

use crate::response::{IntoResponse, Response};

/// Why a request was turned away before reaching its leaf handler.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Rejection {
    /// No chain is registered for the path. Produced by the dispatcher.
    RouteNotFound,
    /// The path is not in a [`NotFound`](crate::middleware::NotFound) allow-list.
    PathNotAllowed,
    /// The bearer token was missing, invalid, or could not be verified.
    AuthenticationFailed,
}

impl Rejection {
    pub fn status(self) -> StatusCode {
        match self {
            Self::RouteNotFound | Self::PathNotAllowed => StatusCode::NOT_FOUND,
            Self::AuthenticationFailed => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        match self {
            Self::RouteNotFound | Self::PathNotAllowed => Response::builder()
                .status(self.status())
                .text("Not Found"),
            // Same body for every auth failure: callers learn nothing about
            // which check failed.
            Self::AuthenticationFailed => Response::builder()
                .status(self.status())
                .header(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"))
                .text("Unauthorized"),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RouteNotFound => f.write_str("route not found"),
            Self::PathNotAllowed => f.write_str("path not allowed"),
            Self::AuthenticationFailed => f.write_str("authentication failed"),
        }
    }
}

/// The error type returned by wicket's fallible operations.
///
/// Request-level failures are [`Rejection`]s written to the response, not
/// `Error`s. This type surfaces infrastructure failures: parsing the bind
/// address, binding to a port, or accepting a connection.
#[derive(Debug)]
pub enum Error {
    Addr(AddrParseError),
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Addr(e) => write!(f, "invalid bind address: {e}"),
            Self::Io(e) => write!(f, "io: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Addr(e) => Some(e),
            Self::Io(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<AddrParseError> for Error {
    fn from(e: AddrParseError) -> Self {
        Self::Addr(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failure_is_a_plain_401() {
        let res = Rejection::AuthenticationFailed.into_response();
        assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(res.body(), b"Unauthorized");
        assert_eq!(res.header("www-authenticate"), Some("Bearer"));
        assert_eq!(res.header("content-type"), Some("text/plain; charset=utf-8"));
    }

    #[test]
    fn both_not_found_kinds_share_a_response() {
        let route = Rejection::RouteNotFound.into_response();
        let path = Rejection::PathNotAllowed.into_response();
        assert_eq!(route.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(route.status_code(), path.status_code());
        assert_eq!(route.body(), path.body());
    }

    #[test]
    fn addr_error_keeps_its_source() {
        let err: Error = "not-an-addr".parse::<std::net::SocketAddr>().unwrap_err().into();
        assert!(err.to_string().starts_with("invalid bind address"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
