//! Transport seam
//!
//! The adapter never talks to the network itself. It asks a [`Transport`] for
//! a [`Connection`] to the target URL and performs exactly one request on it.
//! Implementations report failures as [`TransportError`]s; the adapter decides
//! what they mean.

use bytes::Bytes;

use super::headers::Headers;
use super::network_errors::TransportError;
use super::options::TransportOptions;
use url::Url;

/// A request as handed to a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    /// Uppercased HTTP method
    pub method: String,
    pub headers: Headers,
    pub body: Bytes,
}

/// A response as returned by a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: Bytes,
    pub reason_phrase: String,
}

/// Low-level HTTP library the adapter delegates to
pub trait Transport: Send + Sync {
    /// Handle bound to one URL and one set of options
    type Connection: Connection;

    /// Prepare a connection to `url` configured with `options`
    fn connect(&self, url: &Url, options: &TransportOptions) -> Result<Self::Connection, TransportError>;
}

/// One prepared connection
pub trait Connection {
    /// Perform a single blocking request
    fn request(&mut self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}
