//! Request environment passed through a pipeline
//!
//! The pipeline owns a [`RequestEnv`]; an adapter borrows it for one call and
//! writes the response back into it.

use std::fmt;
use std::io::Read;
use std::time::Duration;

use bytes::Bytes;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use url::Url;

use super::headers::Headers;
use super::proxy::ProxyOptions;
use super::tls::SslOptions;

/// Callback receiving a downloaded body chunk and its byte length
pub type OnData = Box<dyn FnMut(&[u8], usize) + Send>;

/// Request body: bytes in memory or a readable stream
pub enum RequestBody {
    Bytes(Bytes),
    Stream(Box<dyn Read + Send>),
}

impl RequestBody {
    /// Wrap a reader; it is drained in one go before sending
    pub fn stream<R: Read + Send + 'static>(reader: R) -> Self {
        RequestBody::Stream(Box::new(reader))
    }

    /// Materialize the whole body in memory
    pub fn read_all(mut self) -> std::io::Result<Bytes> {
        self.materialize()
    }

    /// Drain a stream in place, leaving the bytes behind so the body can be
    /// sent again
    pub fn materialize(&mut self) -> std::io::Result<Bytes> {
        match self {
            RequestBody::Bytes(bytes) => Ok(bytes.clone()),
            RequestBody::Stream(reader) => {
                let mut buffer = Vec::new();
                reader.read_to_end(&mut buffer)?;
                let bytes = Bytes::from(buffer);
                *self = RequestBody::Bytes(bytes.clone());
                Ok(bytes)
            }
        }
    }
}

impl From<Bytes> for RequestBody {
    fn from(bytes: Bytes) -> Self {
        RequestBody::Bytes(bytes)
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        RequestBody::Bytes(Bytes::from(bytes))
    }
}

impl From<&'static str> for RequestBody {
    fn from(text: &'static str) -> Self {
        RequestBody::Bytes(Bytes::from_static(text.as_bytes()))
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        RequestBody::Bytes(Bytes::from(text))
    }
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestBody::Bytes(bytes) => f.debug_tuple("Bytes").field(bytes).finish(),
            RequestBody::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Per-request details: timeouts, proxy and download streaming
#[derive(Default)]
pub struct RequestOptions {
    /// Applied to read, connect and write
    pub timeout: Option<Duration>,
    /// Connect timeout; only honoured together with `timeout`
    pub open_timeout: Option<Duration>,
    pub proxy: Option<ProxyOptions>,
    pub on_data: Option<OnData>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_open_timeout(mut self, open_timeout: Duration) -> Self {
        self.open_timeout = Some(open_timeout);
        self
    }

    pub fn with_proxy(mut self, proxy: ProxyOptions) -> Self {
        self.proxy = Some(proxy);
        self
    }

    pub fn with_on_data<F>(mut self, on_data: F) -> Self
    where
        F: FnMut(&[u8], usize) + Send + 'static,
    {
        self.on_data = Some(Box::new(on_data));
        self
    }

    /// Whether the caller asked for the body to be streamed to `on_data`
    pub fn stream_response(&self) -> bool {
        self.on_data.is_some()
    }
}

impl fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOptions")
            .field("timeout", &self.timeout)
            .field("open_timeout", &self.open_timeout)
            .field("proxy", &self.proxy)
            .field("on_data", &self.on_data.as_ref().map(|_| ".."))
            .finish()
    }
}

/// Response data written back into the environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// `None` when no status could be derived
    pub status: Option<u16>,
    pub headers: Headers,
    #[serde(with = "body_text")]
    pub body: Bytes,
    pub reason_phrase: String,
}

impl Response {
    pub fn new(status: u16) -> Self {
        Self {
            status: Some(status),
            headers: Headers::new(),
            body: Bytes::new(),
            reason_phrase: String::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, Some(200..=299))
    }
}

/// Environment for one request
#[derive(Debug)]
pub struct RequestEnv {
    pub method: Method,
    pub url: Url,
    pub request_headers: Headers,
    pub body: Option<RequestBody>,
    /// TLS settings; only applied to `https` URLs
    pub ssl: Option<SslOptions>,
    pub request: Option<RequestOptions>,
    /// Filled in by the adapter on success
    pub response: Option<Response>,
}

impl RequestEnv {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            request_headers: Headers::new(),
            body: None,
            ssl: None,
            request: None,
            response: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request_headers.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_ssl(mut self, ssl: SslOptions) -> Self {
        self.ssl = Some(ssl);
        self
    }

    pub fn with_request(mut self, request: RequestOptions) -> Self {
        self.request = Some(request);
        self
    }

    /// Record a completed exchange
    pub fn save_response(
        &mut self,
        status: u16,
        body: Bytes,
        headers: Headers,
        reason_phrase: impl Into<String>,
    ) {
        self.response = Some(Response {
            status: Some(status),
            headers,
            body,
            reason_phrase: reason_phrase.into(),
        });
    }

    pub fn status(&self) -> Option<u16> {
        self.response.as_ref().and_then(|r| r.status)
    }

    pub fn response_body(&self) -> Option<&Bytes> {
        self.response.as_ref().map(|r| &r.body)
    }

    pub fn response_headers(&self) -> Option<&Headers> {
        self.response.as_ref().map(|r| &r.headers)
    }

    pub fn reason_phrase(&self) -> Option<&str> {
        self.response.as_ref().map(|r| r.reason_phrase.as_str())
    }
}

/// Bodies serialize as lossy UTF-8 text so they stay readable in JSON output
mod body_text {
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(body: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&String::from_utf8_lossy(body))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Bytes::from(text))
    }
}
