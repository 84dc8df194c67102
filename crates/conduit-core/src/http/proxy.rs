//! Proxy settings and the normalized descriptor handed to transports

use serde::{Deserialize, Serialize};
use url::Url;

/// Proxy requested for one call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyOptions {
    pub uri: Url,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl ProxyOptions {
    pub fn new(uri: Url) -> Self {
        Self {
            uri,
            user: None,
            password: None,
        }
    }

    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }
}

/// Transport-shaped proxy settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyDescriptor {
    /// Host as written in the URI; IPv6 literals keep their brackets
    pub host: String,
    /// Host without IPv6 brackets
    pub hostname: String,
    /// Explicit port, or the scheme's default
    pub port: Option<u16>,
    pub scheme: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl ProxyDescriptor {
    pub fn from_options(proxy: &ProxyOptions) -> Self {
        let host = proxy.uri.host_str().unwrap_or_default().to_string();
        let hostname = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(&host)
            .to_string();

        Self {
            host,
            hostname,
            port: proxy.uri.port_or_known_default(),
            scheme: proxy.uri.scheme().to_string(),
            user: proxy.user.clone(),
            password: proxy.password.clone(),
        }
    }

    /// `scheme://host[:port]`, without credentials
    pub fn to_url(&self) -> String {
        match self.port {
            Some(port) => format!("{}://{}:{}", self.scheme, self.host, port),
            None => format!("{}://{}", self.scheme, self.host),
        }
    }
}
