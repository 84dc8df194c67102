//! Transport failures and their classification into typed errors
//!
//! Transports report two recognised failure families: socket-level errors and
//! their own timeouts. Socket errors carry no structured code, so the family
//! is refined by looking at the message text. That heuristic lives in
//! [`classify`] and nowhere else so it can be replaced once a transport
//! exposes structured error codes.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{BoxError, Error, ErrorKind};

static TIMEOUT_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\btimeout\b").expect("valid timeout pattern"));

static CERTIFICATE_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bcertificate\b").expect("valid certificate pattern"));

/// Failure raised by a transport
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Socket-level failure: connect, read, write or TLS
    #[error("{message}")]
    Socket {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The transport's own deadline expired
    #[error("{message}")]
    Timeout {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Anything else; never reclassified
    #[error("{0}")]
    Other(#[source] BoxError),
}

impl TransportError {
    pub fn socket(message: impl Into<String>) -> Self {
        TransportError::Socket {
            message: message.into(),
            source: None,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        TransportError::Timeout {
            message: message.into(),
            source: None,
        }
    }

    pub fn other<E>(error: E) -> Self
    where
        E: Into<BoxError>,
    {
        TransportError::Other(error.into())
    }
}

/// Typed error kind for a transport failure, or `None` when unrecognised.
///
/// - socket failure mentioning the word `timeout` → [`ErrorKind::Timeout`]
/// - else mentioning the word `certificate` → [`ErrorKind::Ssl`]
/// - any other socket failure → [`ErrorKind::ConnectionFailed`]
/// - transport timeout → [`ErrorKind::Timeout`], whatever its message
///
/// Words match case-insensitively on word boundaries.
pub fn classify(error: &TransportError) -> Option<ErrorKind> {
    match error {
        TransportError::Socket { message, .. } => {
            if TIMEOUT_WORD.is_match(message) {
                Some(ErrorKind::Timeout)
            } else if CERTIFICATE_WORD.is_match(message) {
                Some(ErrorKind::Ssl)
            } else {
                Some(ErrorKind::ConnectionFailed)
            }
        }
        TransportError::Timeout { .. } => Some(ErrorKind::Timeout),
        TransportError::Other(_) => None,
    }
}

/// Wrap a recognised failure as the cause of a typed error.
///
/// An unrecognised failure is handed back untouched.
pub fn reclassify(error: TransportError) -> std::result::Result<Error, BoxError> {
    match classify(&error) {
        Some(kind) => {
            tracing::debug!(kind = %kind, error = %error, "classified transport failure");
            Ok(Error::from_cause(kind, error))
        }
        None => {
            tracing::debug!(error = %error, "transport failure left unclassified");
            match error {
                TransportError::Other(source) => Err(source),
                recognised => Err(Box::new(recognised)),
            }
        }
    }
}
