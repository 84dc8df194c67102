//! Tests for the public error taxonomy

use bytes::Bytes;
use conduit_core::http::{Headers, Response};
use conduit_core::{Error, ErrorKind, Origin, NIL_STATUS_MESSAGE};
use proptest::prelude::*;

const ALL_KINDS: [ErrorKind; 16] = [
    ErrorKind::Error,
    ErrorKind::ClientError,
    ErrorKind::BadRequest,
    ErrorKind::Unauthorized,
    ErrorKind::Forbidden,
    ErrorKind::ResourceNotFound,
    ErrorKind::ProxyAuth,
    ErrorKind::Conflict,
    ErrorKind::UnprocessableEntity,
    ErrorKind::ServerError,
    ErrorKind::Timeout,
    ErrorKind::NilStatus,
    ErrorKind::ConnectionFailed,
    ErrorKind::Ssl,
    ErrorKind::Parsing,
    ErrorKind::RetriableResponse,
];

fn response(status: Option<u16>) -> Response {
    Response {
        status,
        headers: Headers::new(),
        body: Bytes::new(),
        reason_phrase: String::new(),
    }
}

#[test]
fn test_three_origins() {
    let plain = Error::new(ErrorKind::ClientError, Origin::from("boom"));
    assert_eq!(plain.message(), "boom");
    assert!(plain.wrapped_cause().is_none());
    assert!(plain.response().is_none());

    let io = std::io::Error::other("socket closed");
    let wrapped = Error::new(ErrorKind::ClientError, Origin::Cause(Box::new(io)));
    assert_eq!(wrapped.message(), "socket closed");
    assert!(wrapped
        .wrapped_cause()
        .and_then(|cause| cause.downcast_ref::<std::io::Error>())
        .is_some());

    let described = Error::new(ErrorKind::ClientError, Origin::from(response(Some(404))));
    assert_eq!(described.message(), "the server responded with status 404");
    assert_eq!(described.response().unwrap().status, Some(404));
}

#[test]
fn test_missing_status_renders_empty() {
    let error = Error::from_response(ErrorKind::ServerError, response(None));
    assert_eq!(error.message(), "the server responded with status ");
}

#[test]
fn test_nil_status_from_status_lookup() {
    let error = Error::from_status(response(None)).unwrap();
    assert_eq!(error.kind(), ErrorKind::NilStatus);
    assert_eq!(error.message(), NIL_STATUS_MESSAGE);
    assert!(error.is_a(ErrorKind::ServerError));
}

#[test]
fn test_error_wraps_typed_error() {
    let inner = Error::from_status(response(Some(503))).unwrap();
    let outer = Error::from_cause(ErrorKind::Timeout, inner);
    assert_eq!(outer.message(), "the server responded with status 503");
    let source = std::error::Error::source(&outer).unwrap();
    assert!(source.downcast_ref::<Error>().is_some());
}

#[test]
fn test_retriable_response_is_not_an_http_family() {
    let kind = ErrorKind::RetriableResponse;
    assert!(kind.is_a(ErrorKind::Error));
    assert!(!kind.is_client_error());
    assert!(!kind.is_server_error());
}

#[test]
fn test_every_kind_reaches_base() {
    for kind in ALL_KINDS {
        assert!(kind.is_a(ErrorKind::Error), "{} must descend from the base", kind);
        assert!(!kind.default_message().is_empty());
    }
}

proptest! {
    #[test]
    fn prop_status_mapping_respects_families(status in 100u16..600) {
        match ErrorKind::for_status(Some(status)) {
            Some(kind) if (400..500).contains(&status) => prop_assert!(kind.is_client_error()),
            Some(kind) if (500..600).contains(&status) => prop_assert!(kind.is_server_error()),
            Some(kind) => prop_assert!(false, "unexpected {} for {}", kind, status),
            None => prop_assert!(status < 400),
        }
    }

    #[test]
    fn prop_message_origin_is_kept_verbatim(message in ".+") {
        let error = Error::from_message(ErrorKind::Conflict, message.clone());
        prop_assert_eq!(error.message(), message.as_str());
        prop_assert_eq!(error.to_string(), message);
    }
}
