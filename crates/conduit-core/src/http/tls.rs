//! TLS settings carried by a request environment
//!
//! Every field is optional: the adapter copies only what is present into the
//! transport options and never defaults an absent field in.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// TLS settings for one request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SslOptions {
    /// Whether to verify the peer certificate; `None` means verify
    pub verify: Option<bool>,
    /// Client certificate file (for mutual TLS)
    pub client_cert: Option<PathBuf>,
    /// Client private key file (for mutual TLS)
    pub client_key: Option<PathBuf>,
    /// Client certificate content (PEM format)
    pub certificate: Option<String>,
    /// Client private key content (PEM format)
    pub private_key: Option<String>,
    /// Directory of trusted CA certificates
    pub ca_path: Option<PathBuf>,
    /// File of trusted CA certificates
    pub ca_file: Option<PathBuf>,
    /// Exact protocol version to negotiate
    pub version: Option<TlsVersion>,
    /// Lowest protocol version to accept
    pub min_version: Option<TlsVersion>,
    /// Highest protocol version to offer
    pub max_version: Option<TlsVersion>,
}

impl SslOptions {
    /// True when no setting is present
    pub fn is_empty(&self) -> bool {
        self == &SslOptions::default()
    }

    /// Settings that only toggle peer verification
    pub fn verify(verify: bool) -> Self {
        Self {
            verify: Some(verify),
            ..Self::default()
        }
    }

    /// Add a CA certificate file
    pub fn with_ca_file(mut self, path: PathBuf) -> Self {
        self.ca_file = Some(path);
        self
    }

    /// Configure client certificate and key from files
    pub fn with_client_cert_files(mut self, cert_path: PathBuf, key_path: PathBuf) -> Self {
        self.client_cert = Some(cert_path);
        self.client_key = Some(key_path);
        self
    }

    /// Configure client certificate and key from PEM content
    pub fn with_client_cert_pem(mut self, cert_pem: String, key_pem: String) -> Self {
        self.certificate = Some(cert_pem);
        self.private_key = Some(key_pem);
        self
    }

    pub fn with_min_version(mut self, version: TlsVersion) -> Self {
        self.min_version = Some(version);
        self
    }

    pub fn with_max_version(mut self, version: TlsVersion) -> Self {
        self.max_version = Some(version);
        self
    }

    /// Check the settings for combinations no transport can honour.
    ///
    /// The adapter does not call this; hosts may before dispatching.
    pub fn validate(&self) -> Result<(), TlsConfigError> {
        if let (Some(min), Some(max)) = (self.min_version, self.max_version) {
            if max < min {
                return Err(TlsConfigError::InvalidVersionRange(min, max));
            }
        }

        match (&self.client_cert, &self.client_key) {
            (Some(_), None) | (None, Some(_)) => {
                return Err(TlsConfigError::IncompleteClientCertFiles);
            }
            _ => {}
        }

        match (&self.certificate, &self.private_key) {
            (Some(_), None) | (None, Some(_)) => {
                return Err(TlsConfigError::IncompleteClientCertPem);
            }
            _ => {}
        }

        Ok(())
    }
}

/// TLS protocol versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TlsVersion {
    #[serde(rename = "1.0")]
    Tls1_0,
    #[serde(rename = "1.1")]
    Tls1_1,
    #[serde(rename = "1.2")]
    Tls1_2,
    #[serde(rename = "1.3")]
    Tls1_3,
}

impl TlsVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            TlsVersion::Tls1_0 => "1.0",
            TlsVersion::Tls1_1 => "1.1",
            TlsVersion::Tls1_2 => "1.2",
            TlsVersion::Tls1_3 => "1.3",
        }
    }
}

impl fmt::Display for TlsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TLSv{}", self.as_str())
    }
}

impl FromStr for TlsVersion {
    type Err = TlsConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let bare = trimmed
            .strip_prefix("TLSv")
            .or_else(|| trimmed.strip_prefix("tlsv"))
            .unwrap_or(trimmed);
        match bare {
            "1.0" | "1" => Ok(TlsVersion::Tls1_0),
            "1.1" => Ok(TlsVersion::Tls1_1),
            "1.2" => Ok(TlsVersion::Tls1_2),
            "1.3" => Ok(TlsVersion::Tls1_3),
            _ => Err(TlsConfigError::UnknownVersion(s.to_string())),
        }
    }
}

/// TLS configuration errors
#[derive(Debug, thiserror::Error)]
pub enum TlsConfigError {
    #[error("Invalid TLS version range: min {0} > max {1}")]
    InvalidVersionRange(TlsVersion, TlsVersion),

    #[error("Incomplete client certificate configuration (files): both cert and key paths must be provided")]
    IncompleteClientCertFiles,

    #[error("Incomplete client certificate configuration (PEM): both cert and key content must be provided")]
    IncompleteClientCertPem,

    #[error("Unknown TLS version: {0}")]
    UnknownVersion(String),
}
