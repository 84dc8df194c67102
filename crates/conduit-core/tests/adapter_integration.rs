//! Integration tests for the adapter stage
//!
//! These drive `Adapter` through a scripted transport and check what it
//! passes down, what it writes back and how it classifies failures.


use std::io::Cursor;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use conduit_core::http::{
    Adapter, CallError, Handler, Method, ProxyOptions, RequestBody, RequestEnv, RequestOptions, SslOptions,
    TlsVersion, TransportError, TransportOptions,
};
use conduit_core::{Error, ErrorKind};
use test_support::{env, response, ScriptedTransport, Step};
use url::Url;

fn expect_http(result: Result<(), CallError>) -> Error {
    match result {
        Err(CallError::Http(error)) => error,
        other => panic!("expected a typed error, got {:?}", other),
    }
}

// ============================================================================
// SUCCESS PATH
// ============================================================================

#[test]
fn test_success_writes_response_back() {
    let mut canned = response(201, "Created", r#"{"id":7}"#);
    canned.headers.append("Content-Type", "application/json");
    canned.headers.append("Set-Cookie", "a=1");
    canned.headers.append("Set-Cookie", "b=2");

    let adapter = Adapter::new(ScriptedTransport::new(vec![Step::Respond(canned)]));
    let mut env = env(Method::POST, "https://api.example.com/items")
        .with_header("Accept", "application/json")
        .with_header("X-Trace", "abc")
        .with_body(r#"{"name":"widget"}"#);

    adapter.call(&mut env).unwrap();

    assert_eq!(env.status(), Some(201));
    assert_eq!(env.reason_phrase(), Some("Created"));
    assert_eq!(env.response_body().unwrap().as_ref(), br#"{"id":7}"#);
    let headers = env.response_headers().unwrap();
    assert_eq!(headers.get("content-type"), Some("application/json"));
    assert_eq!(headers.iter().filter(|(name, _)| *name == "Set-Cookie").count(), 2);

    let call = adapter.transport().last_call();
    assert_eq!(call.url.as_str(), "https://api.example.com/items");
    let request = call.request.unwrap();
    assert_eq!(request.method, "POST");
    assert_eq!(
        request.headers.iter().collect::<Vec<_>>(),
        vec![("Accept", "application/json"), ("X-Trace", "abc")]
    );
    assert_eq!(request.body.as_ref(), br#"{"name":"widget"}"#);
}

#[test]
fn test_method_is_uppercased() {
    let adapter = Adapter::new(ScriptedTransport::default());
    let method = Method::from_bytes(b"patch").unwrap();
    let mut env = env(method, "http://example.com/items/1");

    adapter.call(&mut env).unwrap();

    assert_eq!(adapter.transport().last_call().request.unwrap().method, "PATCH");
}

#[test]
fn test_missing_body_sends_empty() {
    let adapter = Adapter::new(ScriptedTransport::default());
    let mut env = env(Method::GET, "http://example.com/");

    adapter.call(&mut env).unwrap();

    assert!(adapter.transport().last_call().request.unwrap().body.is_empty());
}

#[test]
fn test_stream_body_is_read_fully() {
    let payload = "x".repeat(64 * 1024);
    let adapter = Adapter::new(ScriptedTransport::default());
    let mut env = env(Method::PUT, "http://example.com/upload")
        .with_body(RequestBody::stream(Cursor::new(payload.clone().into_bytes())));

    adapter.call(&mut env).unwrap();

    let request = adapter.transport().last_call().request.unwrap();
    assert_eq!(request.body.len(), payload.len());
    assert!(matches!(&env.body, Some(RequestBody::Bytes(bytes)) if bytes.len() == payload.len()));
}

#[test]
fn test_on_data_receives_whole_body_once() {
    let chunks: Arc<Mutex<Vec<(Vec<u8>, usize)>>> = Arc::default();
    let sink = Arc::clone(&chunks);
    let request = RequestOptions::new().with_on_data(move |chunk, len| {
        sink.lock().unwrap().push((chunk.to_vec(), len));
    });

    let adapter = Adapter::new(ScriptedTransport::new(vec![Step::Respond(response(200, "OK", "hello world"))]));
    let mut env = env(Method::GET, "http://example.com/file").with_request(request);

    adapter.call(&mut env).unwrap();

    let chunks = chunks.lock().unwrap();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].0, b"hello world");
    assert_eq!(chunks[0].1, 11);
    assert_eq!(env.response_body().unwrap().as_ref(), b"hello world");
}

// ============================================================================
// OPTIONS PASSED TO THE TRANSPORT
// ============================================================================

#[test]
fn test_timeouts_reach_transport() {
    let adapter = Adapter::new(ScriptedTransport::default());
    let request = RequestOptions::new()
        .with_timeout(Duration::from_secs(5))
        .with_open_timeout(Duration::from_secs(2));
    let mut env = env(Method::GET, "http://example.com/").with_request(request);

    adapter.call(&mut env).unwrap();

    let options = adapter.transport().last_call().options;
    assert_eq!(options.read_timeout, Some(Duration::from_secs(5)));
    assert_eq!(options.connect_timeout, Some(Duration::from_secs(2)));
    assert_eq!(options.write_timeout, Some(Duration::from_secs(5)));
}

#[test]
fn test_open_timeout_alone_sets_nothing() {
    let adapter = Adapter::new(ScriptedTransport::default());
    let request = RequestOptions::new().with_open_timeout(Duration::from_secs(2));
    let mut env = env(Method::GET, "http://example.com/").with_request(request);

    adapter.call(&mut env).unwrap();

    assert_eq!(adapter.transport().last_call().options, TransportOptions::default());
}

#[test]
fn test_tls_only_for_https() {
    let ssl = SslOptions::default()
        .with_ca_file(PathBuf::from("ca.pem"))
        .with_min_version(TlsVersion::Tls1_2);

    let adapter = Adapter::new(ScriptedTransport::default());
    let mut plain = env(Method::GET, "http://example.com/").with_ssl(ssl.clone());
    adapter.call(&mut plain).unwrap();
    let options = adapter.transport().last_call().options;
    assert!(!options.has_tls_settings());

    let mut secure = env(Method::GET, "https://example.com/").with_ssl(ssl);
    adapter.call(&mut secure).unwrap();
    let options = adapter.transport().last_call().options;
    assert_eq!(options.ssl_verify_peer, Some(true));
    assert_eq!(options.nonblock, Some(false));
    assert_eq!(options.ssl_ca_file, Some(PathBuf::from("ca.pem")));
    assert_eq!(options.ssl_min_version, Some(TlsVersion::Tls1_2));
    assert!(options.ssl_max_version.is_none());
    assert!(options.client_cert.is_none());
}

#[test]
fn test_proxy_descriptor_reaches_transport() {
    let proxy = ProxyOptions::new(Url::parse("http://[2001:db8::1]:3128").unwrap()).with_credentials("ops", "pw");
    let adapter = Adapter::new(ScriptedTransport::default());
    let mut env = env(Method::GET, "http://example.com/").with_request(RequestOptions::new().with_proxy(proxy));

    adapter.call(&mut env).unwrap();

    let descriptor = adapter.transport().last_call().options.proxy.unwrap();
    assert_eq!(descriptor.host, "[2001:db8::1]");
    assert_eq!(descriptor.hostname, "2001:db8::1");
    assert_eq!(descriptor.port, Some(3128));
    assert_eq!(descriptor.user.as_deref(), Some("ops"));
    assert_eq!(descriptor.password.as_deref(), Some("pw"));
}

#[test]
fn test_connection_options_merged_into_every_call() {
    let connection = TransportOptions {
        read_timeout: Some(Duration::from_secs(60)),
        ssl_ca_path: Some(PathBuf::from("/etc/corp/ca")),
        ..TransportOptions::default()
    };
    let adapter = Adapter::new(ScriptedTransport::default()).with_connection_options(connection);

    let request = RequestOptions::new().with_timeout(Duration::from_secs(5));
    let mut env = env(Method::GET, "http://example.com/").with_request(request);
    adapter.call(&mut env).unwrap();

    let options = adapter.transport().last_call().options;
    assert_eq!(options.read_timeout, Some(Duration::from_secs(60)));
    assert_eq!(options.connect_timeout, Some(Duration::from_secs(5)));
    assert_eq!(options.ssl_ca_path, Some(PathBuf::from("/etc/corp/ca")));
    assert_eq!(adapter.connection_options().read_timeout, Some(Duration::from_secs(60)));
}

// ============================================================================
// FAILURE CLASSIFICATION
// ============================================================================

#[test]
fn test_socket_failures_are_classified_by_message() {
    let cases = [
        ("SSL certificate problem: self signed certificate", ErrorKind::Ssl),
        ("Connection timeout after 30s", ErrorKind::Timeout),
        ("connection reset by peer", ErrorKind::ConnectionFailed),
    ];

    for (message, kind) in cases {
        let adapter = Adapter::new(ScriptedTransport::new(vec![Step::FailRequest(TransportError::socket(message))]));
        let mut env = env(Method::GET, "https://example.com/");
        let error = expect_http(adapter.call(&mut env));

        assert_eq!(error.kind(), kind, "message: {}", message);
        assert_eq!(error.message(), message);
        assert!(error
            .wrapped_cause()
            .and_then(|cause| cause.downcast_ref::<TransportError>())
            .is_some());
        assert!(env.response.is_none());
    }
}

#[test]
fn test_connect_failure_is_connection_failed() {
    let adapter = Adapter::new(ScriptedTransport::new(vec![Step::FailConnect(TransportError::socket(
        "Failed to open TCP connection to 127.0.0.1:1 (Connection refused)",
    ))]));
    let mut env = env(Method::GET, "http://127.0.0.1:1/");

    let error = expect_http(adapter.call(&mut env));

    assert_eq!(error.kind(), ErrorKind::ConnectionFailed);
    assert!(adapter.transport().last_call().request.is_none());
}

#[test]
fn test_transport_timeout_always_times_out() {
    let adapter = Adapter::new(ScriptedTransport::new(vec![Step::FailRequest(TransportError::timeout(
        "certificate handshake stalled",
    ))]));
    let mut env = env(Method::GET, "https://example.com/");

    let error = expect_http(adapter.call(&mut env));

    assert_eq!(error.kind(), ErrorKind::Timeout);
    assert!(error.is_a(ErrorKind::ServerError));
    assert_eq!(error.message(), "certificate handshake stalled");
}

#[test]
fn test_unrecognised_failure_is_not_wrapped() {
    let adapter = Adapter::new(ScriptedTransport::new(vec![Step::FailRequest(TransportError::other(
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "unsupported scheme"),
    ))]));
    let mut env = env(Method::GET, "http://example.com/");

    let result = adapter.call(&mut env);

    match result {
        Err(err @ CallError::Unhandled(_)) => {
            let io = err.unhandled::<std::io::Error>().unwrap();
            assert_eq!(io.kind(), std::io::ErrorKind::InvalidInput);
        }
        other => panic!("expected an unhandled failure, got {:?}", other),
    }
}

#[test]
fn test_failed_call_leaves_body_for_another_attempt() {
    let adapter = Adapter::new(ScriptedTransport::new(vec![Step::FailRequest(TransportError::socket(
        "connection reset by peer",
    ))]));
    let mut env = env(Method::POST, "http://example.com/jobs").with_body("payload");

    let error = expect_http(adapter.call(&mut env));
    assert_eq!(error.kind(), ErrorKind::ConnectionFailed);
    assert!(env.body.is_some());
    assert!(env.response.is_none());

    adapter.call(&mut env).unwrap();

    let calls = adapter.transport().calls();
    assert_eq!(calls.len(), 2);
    for call in calls {
        assert_eq!(call.request.unwrap().body.as_ref(), b"payload");
    }
    assert_eq!(env.status(), Some(200));
}

#[test]
fn test_stream_body_survives_failed_call() {
    let adapter = Adapter::new(ScriptedTransport::new(vec![Step::FailRequest(TransportError::timeout(
        "read timeout",
    ))]));
    let mut env = env(Method::PUT, "http://example.com/upload")
        .with_body(RequestBody::stream(Cursor::new(b"streamed".to_vec())));

    let error = expect_http(adapter.call(&mut env));
    assert_eq!(error.kind(), ErrorKind::Timeout);

    adapter.call(&mut env).unwrap();
    let request = adapter.transport().last_call().request.unwrap();
    assert_eq!(request.body.as_ref(), b"streamed");
}

#[test]
fn test_unreadable_stream_body() {
    struct Broken;
    impl std::io::Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("pipe closed"))
        }
    }

    let adapter = Adapter::new(ScriptedTransport::default());
    let mut env = env(Method::POST, "http://example.com/").with_body(RequestBody::stream(Broken));

    assert!(matches!(adapter.call(&mut env), Err(CallError::Body(_))));
    assert!(adapter.transport().last_call().request.is_none());
}

// ============================================================================
// PIPELINE COMPOSITION
// ============================================================================

#[test]
fn test_status_check_stage_after_adapter() {
    let raise_for_status = |env: &mut RequestEnv| -> Result<(), CallError> {
        match env.response.clone().and_then(Error::from_status) {
            Some(error) => Err(error.into()),
            None => Ok(()),
        }
    };
    let adapter = Adapter::new(ScriptedTransport::new(vec![Step::Respond(response(404, "Not Found", "missing"))]))
        .with_next(raise_for_status);
    let mut env = env(Method::GET, "http://example.com/missing");

    let error = expect_http(adapter.call(&mut env));

    assert_eq!(error.kind(), ErrorKind::ResourceNotFound);
    assert!(error.is_a(ErrorKind::ClientError));
    assert_eq!(error.message(), "the server responded with status 404");
    assert_eq!(error.response().unwrap().body.as_ref(), b"missing");
}

#[test]
fn test_concurrent_calls_share_nothing_per_call() {
    let adapter = Adapter::new(ScriptedTransport::default()).with_connection_options(TransportOptions {
        ssl_verify_peer: Some(false),
        ..TransportOptions::default()
    });

    std::thread::scope(|scope| {
        for secs in 1..=8u64 {
            let adapter = &adapter;
            scope.spawn(move || {
                let request = RequestOptions::new().with_timeout(Duration::from_secs(secs));
                let mut env = env(Method::GET, &format!("http://example.com/{}", secs)).with_request(request);
                adapter.call(&mut env).unwrap();
                assert_eq!(env.status(), Some(200));
            });
        }
    });

    let calls = adapter.transport().calls();
    assert_eq!(calls.len(), 8);
    for call in calls {
        let secs: u64 = call.url.path().trim_start_matches('/').parse().unwrap();
        assert_eq!(call.options.read_timeout, Some(Duration::from_secs(secs)));
        assert_eq!(call.options.ssl_verify_peer, Some(false));
    }
}
