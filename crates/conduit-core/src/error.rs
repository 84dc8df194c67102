//! Error types for the Conduit core library
//!
//! Every failure surfaced to a pipeline is an [`Error`] tagged with an
//! [`ErrorKind`]. Kinds form a small closed hierarchy (4xx tags under
//! `ClientError`, `Timeout`/`NilStatus` under `ServerError`, independent leaves
//! under the plain base) so callers can branch on families as well as on
//! exact tags.
//!
//! An error is built from exactly one explanatory [`Origin`]: a lower-level
//! cause it wraps, a response it describes, or a bare message.

use std::backtrace::Backtrace;

// Alias keeps `thiserror` from auto-deriving the nightly-only `provide()` for
// a field whose type is literally named `Backtrace`.
type CapturedBacktrace = Backtrace;
use std::error::Error as StdError;
use std::fmt;

use crate::http::Response;

/// Boxed, thread-safe error used for wrapped causes.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Message used when a response carries no derivable status.
pub const NIL_STATUS_MESSAGE: &str = "http status could not be derived from the server response";

/// Tag identifying the family and exact variant of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Plain base error
    Error,
    /// 4xx family
    ClientError,
    /// 400
    BadRequest,
    /// 401
    Unauthorized,
    /// 403
    Forbidden,
    /// 404
    ResourceNotFound,
    /// 407
    ProxyAuth,
    /// 409
    Conflict,
    /// 422
    UnprocessableEntity,
    /// 5xx family
    ServerError,
    /// Connect, read or write deadline exceeded
    Timeout,
    /// The response had no derivable status
    NilStatus,
    /// The connection could not be established or was lost
    ConnectionFailed,
    /// TLS negotiation or certificate verification failed
    Ssl,
    /// A response body could not be parsed
    Parsing,
    /// Control signal for a retry stage; not a failure of its own
    RetriableResponse,
}

impl ErrorKind {
    /// Immediate parent in the hierarchy. Only the base has none.
    pub fn parent(self) -> Option<ErrorKind> {
        match self {
            ErrorKind::Error => None,
            ErrorKind::BadRequest
            | ErrorKind::Unauthorized
            | ErrorKind::Forbidden
            | ErrorKind::ResourceNotFound
            | ErrorKind::ProxyAuth
            | ErrorKind::Conflict
            | ErrorKind::UnprocessableEntity => Some(ErrorKind::ClientError),
            ErrorKind::Timeout | ErrorKind::NilStatus => Some(ErrorKind::ServerError),
            ErrorKind::ClientError
            | ErrorKind::ServerError
            | ErrorKind::ConnectionFailed
            | ErrorKind::Ssl
            | ErrorKind::Parsing
            | ErrorKind::RetriableResponse => Some(ErrorKind::Error),
        }
    }

    /// Whether `self` is `ancestor` or descends from it
    pub fn is_a(self, ancestor: ErrorKind) -> bool {
        let mut current = Some(self);
        while let Some(kind) = current {
            if kind == ancestor {
                return true;
            }
            current = kind.parent();
        }
        false
    }

    pub fn is_client_error(self) -> bool {
        self.is_a(ErrorKind::ClientError)
    }

    pub fn is_server_error(self) -> bool {
        self.is_a(ErrorKind::ServerError)
    }

    /// Stable name of the tag, used in diagnostic renderings
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Error => "Error",
            ErrorKind::ClientError => "ClientError",
            ErrorKind::BadRequest => "BadRequest",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::ResourceNotFound => "ResourceNotFound",
            ErrorKind::ProxyAuth => "ProxyAuth",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::UnprocessableEntity => "UnprocessableEntity",
            ErrorKind::ServerError => "ServerError",
            ErrorKind::Timeout => "Timeout",
            ErrorKind::NilStatus => "NilStatus",
            ErrorKind::ConnectionFailed => "ConnectionFailed",
            ErrorKind::Ssl => "SslError",
            ErrorKind::Parsing => "ParsingError",
            ErrorKind::RetriableResponse => "RetriableResponse",
        }
    }

    /// Message used when an error would otherwise carry an empty one
    pub fn default_message(self) -> &'static str {
        match self {
            ErrorKind::Error => "request failed",
            ErrorKind::ClientError => "client error",
            ErrorKind::BadRequest => "bad request",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::ResourceNotFound => "resource not found",
            ErrorKind::ProxyAuth => "proxy authentication required",
            ErrorKind::Conflict => "conflict",
            ErrorKind::UnprocessableEntity => "unprocessable entity",
            ErrorKind::ServerError => "server error",
            ErrorKind::Timeout => "timeout",
            ErrorKind::NilStatus => NIL_STATUS_MESSAGE,
            ErrorKind::ConnectionFailed => "connection failed",
            ErrorKind::Ssl => "ssl error",
            ErrorKind::Parsing => "parsing error",
            ErrorKind::RetriableResponse => "retriable response",
        }
    }

    /// Tag a status-inspection stage should raise for `status`.
    ///
    /// Returns `None` for statuses that are not failures.
    pub fn for_status(status: Option<u16>) -> Option<ErrorKind> {
        let Some(status) = status else {
            return Some(ErrorKind::NilStatus);
        };
        match status {
            400 => Some(ErrorKind::BadRequest),
            401 => Some(ErrorKind::Unauthorized),
            403 => Some(ErrorKind::Forbidden),
            404 => Some(ErrorKind::ResourceNotFound),
            407 => Some(ErrorKind::ProxyAuth),
            409 => Some(ErrorKind::Conflict),
            422 => Some(ErrorKind::UnprocessableEntity),
            400..=499 => Some(ErrorKind::ClientError),
            500..=599 => Some(ErrorKind::ServerError),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What an [`Error`] was built from
#[derive(Debug)]
pub enum Origin {
    /// A lower-level failure; its message becomes the error's message
    Cause(BoxError),
    /// A response record; the message is synthesized from its status
    Response(Response),
    /// A plain message
    Message(String),
}

impl From<Response> for Origin {
    fn from(response: Response) -> Self {
        Origin::Response(response)
    }
}

impl From<String> for Origin {
    fn from(message: String) -> Self {
        Origin::Message(message)
    }
}

impl From<&str> for Origin {
    fn from(message: &str) -> Self {
        Origin::Message(message.to_string())
    }
}

/// Typed pipeline error.
///
/// Carries a non-empty message and at most one explanatory payload chosen by
/// its [`Origin`]; a response may additionally be attached to cause- and
/// message-built errors. Immutable once built.
#[derive(thiserror::Error)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    #[source]
    cause: Option<BoxError>,
    response: Option<Response>,
    response_is_origin: bool,
    backtrace: CapturedBacktrace,
}

impl Error {
    /// Build an error of `kind` from one explicit origin
    pub fn new(kind: ErrorKind, origin: Origin) -> Self {
        let (message, cause, response) = match origin {
            Origin::Cause(cause) => (cause.to_string(), Some(cause), None),
            Origin::Response(response) => (status_message(response.status), None, Some(response)),
            Origin::Message(message) => (message, None, None),
        };
        let message = if message.is_empty() {
            kind.default_message().to_string()
        } else {
            message
        };

        Self {
            kind,
            message,
            cause,
            response_is_origin: response.is_some(),
            response,
            backtrace: Backtrace::capture(),
        }
    }

    /// Wrap a lower-level failure
    pub fn from_cause<E>(kind: ErrorKind, cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::new(kind, Origin::Cause(Box::new(cause)))
    }

    /// Describe a response
    pub fn from_response(kind: ErrorKind, response: Response) -> Self {
        Self::new(kind, Origin::Response(response))
    }

    pub fn from_message(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::new(kind, Origin::Message(message.into()))
    }

    /// Attach a response to an error built from a cause or a message.
    ///
    /// An error built from a response keeps that response; the argument is
    /// ignored.
    pub fn with_response(mut self, response: Response) -> Self {
        if !self.response_is_origin {
            self.response = Some(response);
        }
        self
    }

    /// Timeout with the default `"timeout"` message
    pub fn timeout() -> Self {
        Self::from_message(ErrorKind::Timeout, "timeout")
    }

    /// Timeout wrapping the failure that signalled it
    pub fn timeout_from<E>(cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::from_cause(ErrorKind::Timeout, cause)
    }

    /// Response whose status could not be derived
    pub fn nil_status(response: Response) -> Self {
        let mut error = Self::from_message(ErrorKind::NilStatus, NIL_STATUS_MESSAGE);
        error.response = Some(response);
        error.response_is_origin = true;
        error
    }

    /// Status-driven error for `response`, or `None` when the status is not
    /// a failure
    pub fn from_status(response: Response) -> Option<Self> {
        match ErrorKind::for_status(response.status)? {
            ErrorKind::NilStatus => Some(Self::nil_status(response)),
            kind => Some(Self::from_response(kind, response)),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Whether this error's kind is `kind` or descends from it
    pub fn is_a(&self, kind: ErrorKind) -> bool {
        self.kind.is_a(kind)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    /// The lower-level failure this error wraps, if any
    pub fn wrapped_cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Backtrace of the wrapped typed error when there is one, else the
    /// backtrace captured when this error was built
    pub fn backtrace(&self) -> &Backtrace {
        if let Some(inner) = self.cause.as_deref().and_then(|c| c.downcast_ref::<Error>()) {
            return inner.backtrace();
        }
        &self.backtrace
    }
}

fn status_message(status: Option<u16>) -> String {
    let status = status.map(|s| s.to_string()).unwrap_or_default();
    format!("the server responded with status {}", status)
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct(self.kind.name());
        if let Some(cause) = &self.cause {
            out.field("wrapped", cause);
        }
        if let Some(response) = &self.response {
            out.field("response", response);
        }
        if self.cause.is_none() && self.response.is_none() {
            out.field("message", &self.message);
        }
        out.finish()
    }
}
