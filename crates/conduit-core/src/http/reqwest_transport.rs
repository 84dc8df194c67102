//! Transport backed by the blocking `reqwest` client
//!
//! A client is built per connection from the merged transport options, so no
//! state is shared between calls.

use std::error::Error as StdError;
use std::fs;
use std::path::Path;

use reqwest::blocking::{Client, ClientBuilder};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::tls::{Certificate, Identity, Version};
use reqwest::{Method, Proxy};
use tracing::debug;
use url::Url;

use super::headers::Headers;
use super::network_errors::TransportError;
use super::options::TransportOptions;
use super::proxy::ProxyDescriptor;
use super::tls::TlsVersion;
use super::transport::{Connection, Transport, TransportRequest, TransportResponse};

/// [`Transport`] implementation over `reqwest::blocking`
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    user_agent: Option<String>,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send `user_agent` unless the request sets its own
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    fn build_client(&self, options: &TransportOptions) -> Result<Client, TransportError> {
        let mut builder = Client::builder();

        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        builder = apply_tls(builder, options)?;

        if let Some(connect_timeout) = options.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        if let Some(read_timeout) = options.read_timeout {
            builder = builder.timeout(read_timeout);
        }
        if let Some(write_timeout) = options.write_timeout {
            debug!(?write_timeout, "write timeout has no reqwest equivalent; covered by the overall timeout");
        }
        if let Some(proxy) = &options.proxy {
            builder = builder.proxy(build_proxy(proxy)?);
        }

        builder.build().map_err(TransportError::other)
    }
}

impl Transport for ReqwestTransport {
    type Connection = ReqwestConnection;

    fn connect(&self, url: &Url, options: &TransportOptions) -> Result<Self::Connection, TransportError> {
        Ok(ReqwestConnection {
            client: self.build_client(options)?,
            url: url.clone(),
        })
    }
}

/// Client bound to one target URL
#[derive(Debug)]
pub struct ReqwestConnection {
    client: Client,
    url: Url,
}

impl Connection for ReqwestConnection {
    fn request(&mut self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let method = Method::from_bytes(request.method.as_bytes()).map_err(TransportError::other)?;

        let mut builder = self
            .client
            .request(method, self.url.clone())
            .headers(header_map(&request.headers)?);
        if !request.body.is_empty() {
            builder = builder.body(request.body.to_vec());
        }

        let response = builder.send().map_err(map_reqwest_error)?;
        let status = response.status();
        let headers: Headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.bytes().map_err(map_reqwest_error)?;

        Ok(TransportResponse {
            status: status.as_u16(),
            headers,
            body,
            reason_phrase: status.canonical_reason().unwrap_or_default().to_string(),
        })
    }
}

fn apply_tls(mut builder: ClientBuilder, options: &TransportOptions) -> Result<ClientBuilder, TransportError> {
    if options.ssl_verify_peer == Some(false) {
        builder = builder.danger_accept_invalid_certs(true);
    }

    if let Some(ca_file) = &options.ssl_ca_file {
        builder = builder.add_root_certificate(load_certificate(ca_file)?);
    }
    if let Some(ca_path) = &options.ssl_ca_path {
        for certificate in load_certificate_dir(ca_path)? {
            builder = builder.add_root_certificate(certificate);
        }
    }

    if let Some(identity) = load_identity(options)? {
        builder = builder.identity(identity);
    }

    if let Some(min) = options.ssl_min_version {
        builder = builder.min_tls_version(tls_version(min));
    }
    if let Some(max) = options.ssl_max_version {
        builder = builder.max_tls_version(tls_version(max));
    }
    if let Some(exact) = options.ssl_version {
        builder = builder
            .min_tls_version(tls_version(exact))
            .max_tls_version(tls_version(exact));
    }

    Ok(builder)
}

fn tls_version(version: TlsVersion) -> Version {
    match version {
        TlsVersion::Tls1_0 => Version::TLS_1_0,
        TlsVersion::Tls1_1 => Version::TLS_1_1,
        TlsVersion::Tls1_2 => Version::TLS_1_2,
        TlsVersion::Tls1_3 => Version::TLS_1_3,
    }
}

fn load_certificate(path: &Path) -> Result<Certificate, TransportError> {
    let pem = fs::read(path).map_err(TransportError::other)?;
    Certificate::from_pem(&pem).map_err(TransportError::other)
}

fn load_certificate_dir(dir: &Path) -> Result<Vec<Certificate>, TransportError> {
    let mut certificates = Vec::new();
    for entry in fs::read_dir(dir).map_err(TransportError::other)? {
        let path = entry.map_err(TransportError::other)?.path();
        let is_cert = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("pem") | Some("crt")
        );
        if is_cert {
            certificates.push(load_certificate(&path)?);
        }
    }
    Ok(certificates)
}

/// Client identity from the file pair, else from the PEM pair
fn load_identity(options: &TransportOptions) -> Result<Option<Identity>, TransportError> {
    let mut pem = match (&options.client_cert, &options.client_key) {
        (Some(cert), Some(key)) => {
            let mut pem = fs::read(cert).map_err(TransportError::other)?;
            pem.push(b'\n');
            pem.extend(fs::read(key).map_err(TransportError::other)?);
            pem
        }
        _ => match (&options.certificate, &options.private_key) {
            (Some(cert), Some(key)) => format!("{}\n{}", cert, key).into_bytes(),
            _ => return Ok(None),
        },
    };
    pem.push(b'\n');
    Identity::from_pem(&pem).map(Some).map_err(TransportError::other)
}

fn build_proxy(descriptor: &ProxyDescriptor) -> Result<Proxy, TransportError> {
    let mut proxy = Proxy::all(descriptor.to_url()).map_err(TransportError::other)?;
    if let Some(user) = &descriptor.user {
        proxy = proxy.basic_auth(user, descriptor.password.as_deref().unwrap_or_default());
    }
    Ok(proxy)
}

fn header_map(headers: &Headers) -> Result<HeaderMap, TransportError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers.iter() {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(TransportError::other)?;
        let value = HeaderValue::from_str(value).map_err(TransportError::other)?;
        map.append(name, value);
    }
    Ok(map)
}

/// Sort a reqwest failure into the transport families
fn map_reqwest_error(error: reqwest::Error) -> TransportError {
    let message = chain_message(&error);
    if error.is_timeout() {
        TransportError::Timeout {
            message,
            source: Some(Box::new(error)),
        }
    } else if error.is_connect() || error.is_request() || error.is_body() || error.is_decode() {
        TransportError::Socket {
            message,
            source: Some(Box::new(error)),
        }
    } else {
        TransportError::Other(Box::new(error))
    }
}

/// Error text with every distinct source appended, joined by `": "`
fn chain_message(error: &dyn StdError) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(inner) = source {
        let text = inner.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = inner.source();
    }
    message
}
