//! HTTP request environment, transports and the adapter stage

pub mod adapter;
pub mod env;
pub mod headers;
pub mod network_errors;
pub mod options;
pub mod proxy;
pub mod reqwest_transport;
pub mod timeout;
pub mod tls;
pub mod transport;

pub use adapter::{Adapter, CallError, Handler};
pub use env::{OnData, RequestBody, RequestEnv, RequestOptions, Response};
pub use headers::Headers;
pub use network_errors::{classify, reclassify, TransportError};
pub use options::TransportOptions;
pub use proxy::{ProxyDescriptor, ProxyOptions};
pub use reqwest_transport::{ReqwestConnection, ReqwestTransport};
pub use timeout::PhaseTimeouts;
pub use tls::{SslOptions, TlsConfigError, TlsVersion};
pub use transport::{Connection, Transport, TransportRequest, TransportResponse};

pub use reqwest::Method;
