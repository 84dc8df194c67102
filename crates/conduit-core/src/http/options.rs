//! Transport options built fresh for every call
//!
//! [`TransportOptions::from_env`] translates a request environment into the
//! shape a transport understands; [`TransportOptions::merge`] layers the
//! adapter's static connection options on top.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::env::RequestEnv;
use super::proxy::ProxyDescriptor;
use super::timeout::{serde_secs, PhaseTimeouts};
use super::tls::{SslOptions, TlsVersion};

/// Transport-shaped configuration for one call.
///
/// Every field is optional; `None` means the transport default applies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportOptions {
    pub ssl_verify_peer: Option<bool>,
    /// Non-blocking socket I/O; the adapter always forces this off for TLS
    pub nonblock: Option<bool>,
    pub client_cert: Option<PathBuf>,
    pub client_key: Option<PathBuf>,
    pub certificate: Option<String>,
    pub private_key: Option<String>,
    pub ssl_ca_path: Option<PathBuf>,
    pub ssl_ca_file: Option<PathBuf>,
    pub ssl_version: Option<TlsVersion>,
    pub ssl_min_version: Option<TlsVersion>,
    pub ssl_max_version: Option<TlsVersion>,
    #[serde(with = "serde_secs", skip_serializing_if = "Option::is_none")]
    pub read_timeout: Option<Duration>,
    #[serde(with = "serde_secs", skip_serializing_if = "Option::is_none")]
    pub connect_timeout: Option<Duration>,
    #[serde(with = "serde_secs", skip_serializing_if = "Option::is_none")]
    pub write_timeout: Option<Duration>,
    pub proxy: Option<ProxyDescriptor>,
}

impl TransportOptions {
    /// Build the per-call options for `env`
    pub fn from_env(env: &RequestEnv) -> Self {
        let mut opts = TransportOptions::default();

        if let Some(ssl) = env.ssl.as_ref().filter(|_| env.url.scheme() == "https") {
            if !ssl.is_empty() {
                opts.apply_ssl(ssl);
            }
        }

        if let Some(request) = &env.request {
            opts.apply_timeouts(PhaseTimeouts::from_request(request.timeout, request.open_timeout));
            if let Some(proxy) = &request.proxy {
                opts.proxy = Some(ProxyDescriptor::from_options(proxy));
            }
        }

        opts
    }

    /// Layer `connection_options` over these per-call options.
    ///
    /// A field set in `connection_options` wins; otherwise the per-call value
    /// is kept.
    pub fn merge(self, connection_options: &TransportOptions) -> TransportOptions {
        let base = connection_options.clone();
        TransportOptions {
            ssl_verify_peer: base.ssl_verify_peer.or(self.ssl_verify_peer),
            nonblock: base.nonblock.or(self.nonblock),
            client_cert: base.client_cert.or(self.client_cert),
            client_key: base.client_key.or(self.client_key),
            certificate: base.certificate.or(self.certificate),
            private_key: base.private_key.or(self.private_key),
            ssl_ca_path: base.ssl_ca_path.or(self.ssl_ca_path),
            ssl_ca_file: base.ssl_ca_file.or(self.ssl_ca_file),
            ssl_version: base.ssl_version.or(self.ssl_version),
            ssl_min_version: base.ssl_min_version.or(self.ssl_min_version),
            ssl_max_version: base.ssl_max_version.or(self.ssl_max_version),
            read_timeout: base.read_timeout.or(self.read_timeout),
            connect_timeout: base.connect_timeout.or(self.connect_timeout),
            write_timeout: base.write_timeout.or(self.write_timeout),
            proxy: base.proxy.or(self.proxy),
        }
    }

    /// True when any TLS-related field is set
    pub fn has_tls_settings(&self) -> bool {
        self.ssl_verify_peer.is_some()
            || self.nonblock.is_some()
            || self.client_cert.is_some()
            || self.client_key.is_some()
            || self.certificate.is_some()
            || self.private_key.is_some()
            || self.ssl_ca_path.is_some()
            || self.ssl_ca_file.is_some()
            || self.ssl_version.is_some()
            || self.ssl_min_version.is_some()
            || self.ssl_max_version.is_some()
    }

    fn apply_ssl(&mut self, ssl: &SslOptions) {
        self.ssl_verify_peer = Some(ssl.verify.unwrap_or(true));
        // Transports block on TLS sockets; a non-blocking handshake is not supported.
        self.nonblock = Some(false);

        self.client_cert = ssl.client_cert.clone();
        self.client_key = ssl.client_key.clone();
        self.certificate = ssl.certificate.clone();
        self.private_key = ssl.private_key.clone();
        self.ssl_ca_path = ssl.ca_path.clone();
        self.ssl_ca_file = ssl.ca_file.clone();
        self.ssl_version = ssl.version;
        self.ssl_min_version = ssl.min_version;
        self.ssl_max_version = ssl.max_version;
    }

    fn apply_timeouts(&mut self, timeouts: PhaseTimeouts) {
        if timeouts.is_empty() {
            return;
        }
        self.read_timeout = timeouts.read;
        self.connect_timeout = timeouts.connect;
        self.write_timeout = timeouts.write;
    }
}
