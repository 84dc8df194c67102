//! Conduit Core - HTTP transport adapter for request pipelines
//!
//! This crate provides the final stage of an HTTP request pipeline: the
//! adapter that hands one request to a low-level transport, writes the
//! response back into the request environment and turns transport failures
//! into a normalized error taxonomy.
//!
//! # Main Components
//!
//! - **Error Taxonomy**: [`Error`] and [`ErrorKind`], a closed hierarchy of
//!   typed HTTP failures with their originating cause or response
//! - **Request Environment**: [`http::RequestEnv`] carrying method, URL,
//!   headers, body, TLS and per-request options
//! - **Transport Seam**: [`http::Transport`] and [`http::Connection`], with a
//!   `reqwest` implementation in [`http::ReqwestTransport`]
//! - **Adapter**: [`http::Adapter`], one exchange per call
//!
//! # Example
//!
//! ```no_run
//! use conduit_core::http::{Adapter, Handler, Method, RequestEnv, ReqwestTransport};
//! use url::Url;
//!
//! let adapter = Adapter::new(ReqwestTransport::new());
//! let mut env = RequestEnv::new(Method::GET, Url::parse("https://example.com/").unwrap());
//! adapter.call(&mut env).unwrap();
//! println!("{:?}", env.status());
//! ```

pub mod error;
pub mod http;

// Re-export main types for convenience
pub use error::{BoxError, Error, ErrorKind, Origin, Result, NIL_STATUS_MESSAGE};
pub use http::{Adapter, CallError, Handler, RequestEnv, Response};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_error_creation() {
        let err = Error::from_message(ErrorKind::BadRequest, "Test error");
        assert!(err.to_string().contains("Test error"));
        assert!(err.is_a(ErrorKind::ClientError));
    }
}
