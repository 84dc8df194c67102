//! Adapter delegating one HTTP exchange to a transport
//!
//! The adapter is the last stage of a request pipeline that does I/O. For
//! every call it:
//!
//! 1. builds [`TransportOptions`] from the environment,
//! 2. merges the static connection options and opens one connection,
//! 3. drains the request body into memory, keeping it in the environment,
//! 4. performs exactly one request,
//! 5. writes the response back into the environment and hands over to the
//!    next stage,
//! 6. or turns a recognised transport failure into a typed [`Error`].
//!
//! There are no retries here; an unrecognised failure propagates untouched.

use std::error::Error as StdError;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{BoxError, Error};

use super::env::RequestEnv;
use super::network_errors::{reclassify, TransportError};
use super::options::TransportOptions;
use super::transport::{Connection, Transport, TransportRequest};

/// Failure surfaced by a pipeline stage
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    /// Typed failure
    #[error(transparent)]
    Http(#[from] Error),

    /// The request body stream could not be read
    #[error("failed to read request body: {0}")]
    Body(#[source] std::io::Error),

    /// Transport failure outside the recognised families, unchanged
    #[error("{0}")]
    Unhandled(#[source] BoxError),
}

impl CallError {
    /// The typed error, when this is one
    pub fn as_http(&self) -> Option<&Error> {
        match self {
            CallError::Http(error) => Some(error),
            _ => None,
        }
    }

    /// Downcast an unhandled failure to its concrete type
    pub fn unhandled<E: StdError + 'static>(&self) -> Option<&E> {
        match self {
            CallError::Unhandled(source) => source.downcast_ref::<E>(),
            _ => None,
        }
    }
}

/// A pipeline stage
pub trait Handler: Send + Sync {
    fn call(&self, env: &mut RequestEnv) -> Result<(), CallError>;
}

impl<F> Handler for F
where
    F: Fn(&mut RequestEnv) -> Result<(), CallError> + Send + Sync,
{
    fn call(&self, env: &mut RequestEnv) -> Result<(), CallError> {
        self(env)
    }
}

/// Adapter performing one exchange per call through `T`
pub struct Adapter<T: Transport> {
    transport: T,
    connection_options: Arc<TransportOptions>,
    next: Option<Box<dyn Handler>>,
}

impl<T: Transport> Adapter<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            connection_options: Arc::new(TransportOptions::default()),
            next: None,
        }
    }

    /// Static options merged into every call; fixed for the adapter's lifetime
    pub fn with_connection_options(mut self, connection_options: TransportOptions) -> Self {
        self.connection_options = Arc::new(connection_options);
        self
    }

    /// Stage that receives the environment after a successful exchange
    pub fn with_next(mut self, next: impl Handler + 'static) -> Self {
        self.next = Some(Box::new(next));
        self
    }

    pub fn connection_options(&self) -> &TransportOptions {
        &self.connection_options
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn perform(&self, env: &mut RequestEnv) -> Result<(), CallError> {
        let options = TransportOptions::from_env(env).merge(&self.connection_options);
        let mut connection = self
            .transport
            .connect(&env.url, &options)
            .map_err(classify_failure)?;

        let body = match env.body.as_mut() {
            Some(body) => body.materialize().map_err(CallError::Body)?,
            None => Default::default(),
        };
        let request = TransportRequest {
            method: env.method.as_str().to_uppercase(),
            headers: env.request_headers.clone(),
            body,
        };

        let response = connection.request(request).map_err(classify_failure)?;
        debug!(status = response.status, bytes = response.body.len(), "transport responded");

        if let Some(on_data) = env.request.as_mut().and_then(|r| r.on_data.as_mut()) {
            warn!("streaming downloads are not implemented; delivering the whole body at once");
            (*on_data)(&response.body[..], response.body.len());
        }

        env.save_response(response.status, response.body, response.headers, response.reason_phrase);
        Ok(())
    }
}

impl<T: Transport> Handler for Adapter<T> {
    fn call(&self, env: &mut RequestEnv) -> Result<(), CallError> {
        let span = tracing::debug_span!("adapter_call", method = %env.method, url = %env.url);
        let _entered = span.enter();

        self.perform(env)?;

        match &self.next {
            Some(next) => next.call(env),
            None => Ok(()),
        }
    }
}

fn classify_failure(error: TransportError) -> CallError {
    match reclassify(error) {
        Ok(typed) => CallError::Http(typed),
        Err(source) => CallError::Unhandled(source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::http::{Headers, TransportResponse};
    use reqwest::Method;
    use std::sync::Mutex;
    use url::Url;

    struct FailingTransport(Mutex<Option<TransportError>>);

    struct FailingConnection(Option<TransportError>);

    impl Transport for FailingTransport {
        type Connection = FailingConnection;

        fn connect(&self, _url: &Url, _options: &TransportOptions) -> Result<FailingConnection, TransportError> {
            Ok(FailingConnection(self.0.lock().unwrap().take()))
        }
    }

    impl Connection for FailingConnection {
        fn request(&mut self, _request: TransportRequest) -> Result<TransportResponse, TransportError> {
            match self.0.take() {
                Some(error) => Err(error),
                None => Ok(TransportResponse {
                    status: 204,
                    headers: Headers::new(),
                    body: Default::default(),
                    reason_phrase: "No Content".to_string(),
                }),
            }
        }
    }

    fn adapter(error: Option<TransportError>) -> Adapter<FailingTransport> {
        Adapter::new(FailingTransport(Mutex::new(error)))
    }

    fn env() -> RequestEnv {
        RequestEnv::new(Method::DELETE, Url::parse("http://example.com/items/1").unwrap())
    }

    #[test]
    fn test_success_without_next_stage() {
        let mut env = env();
        adapter(None).call(&mut env).unwrap();
        assert_eq!(env.status(), Some(204));
        assert_eq!(env.reason_phrase(), Some("No Content"));
    }

    #[test]
    fn test_socket_failure_becomes_connection_failed() {
        let mut env = env();
        let err = adapter(Some(TransportError::socket("connection reset by peer")))
            .call(&mut env)
            .unwrap_err();
        let typed = err.as_http().unwrap();
        assert_eq!(typed.kind(), ErrorKind::ConnectionFailed);
        assert!(env.response.is_none());
    }

    #[test]
    fn test_other_failure_propagates_unchanged() {
        let err = adapter(Some(TransportError::other(std::io::Error::other("disk on fire"))))
            .call(&mut env())
            .unwrap_err();
        let io = err.unhandled::<std::io::Error>().unwrap();
        assert_eq!(io.to_string(), "disk on fire");
    }

    #[test]
    fn test_next_stage_errors_propagate() {
        let adapter = adapter(None).with_next(|_env: &mut RequestEnv| -> Result<(), CallError> {
            Err(Error::from_message(ErrorKind::Parsing, "unexpected token").into())
        });
        let mut env = env();
        let err = adapter.call(&mut env).unwrap_err();

        assert_eq!(err.as_http().unwrap().kind(), ErrorKind::Parsing);
        assert_eq!(env.status(), Some(204));
    }
}
