//! Request command handler
//!
//! Builds a request environment from the command line, runs it through the
//! adapter and prints the response.

use crate::cli::RequestArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging;
use crate::output::OutputWriter;
use conduit_core::http::{
    Adapter, CallError, Handler, Method, ProxyOptions, RequestBody, RequestEnv, RequestOptions, ReqwestTransport,
    SslOptions,
};
use std::fs::File;
use std::io::{self, Write};
use std::time::{Duration, Instant};

/// Handle the request command
pub fn handle_request(args: RequestArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let mut env = build_env(&args)?;
    if env.ssl.is_some() && env.url.scheme() != "https" {
        output.warning("TLS options are ignored for non-https URLs")?;
    }

    let user_agent = config
        .user_agent
        .clone()
        .unwrap_or_else(|| format!("conduit/{}", conduit_core::VERSION));
    let mut adapter = Adapter::new(ReqwestTransport::new().with_user_agent(user_agent))
        .with_connection_options(config.connection.clone());
    if args.fail {
        adapter = adapter.with_next(raise_for_status);
    }

    let span = tracing::info_span!(
        "request",
        request_id = logging::current_request_id().unwrap_or("unknown"),
        method = %env.method,
        url = %env.url,
    );
    let _entered = span.enter();

    let started = Instant::now();
    adapter.call(&mut env)?;
    tracing::info!(
        status = ?env.status(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Request completed"
    );

    let response = env
        .response
        .as_ref()
        .ok_or_else(|| Error::other("adapter finished without a response"))?;
    output.response(response, args.include, args.stream)
}

/// Status-inspection stage enabled by `--fail`
fn raise_for_status(env: &mut RequestEnv) -> std::result::Result<(), CallError> {
    match env.response.clone().and_then(conduit_core::Error::from_status) {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}

/// Translate command-line arguments into a request environment
fn build_env(args: &RequestArgs) -> Result<RequestEnv> {
    let method = Method::from_bytes(args.method.as_bytes())
        .map_err(|_| Error::invalid_args(format!("invalid HTTP method '{}'", args.method)))?;
    let mut env = RequestEnv::new(method, args.url.clone());

    for header in &args.headers {
        let (name, value) = parse_header(header)?;
        env.request_headers.append(name, value);
    }

    env.body = build_body(args)?;

    let ssl = build_ssl(args)?;
    if !ssl.is_empty() {
        env.ssl = Some(ssl);
    }

    env.request = Some(build_request_options(args)?);
    Ok(env)
}

/// Split `"Name: value"`
fn parse_header(header: &str) -> Result<(&str, &str)> {
    match header.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim(), value.trim())),
        _ => Err(Error::invalid_args(format!(
            "header '{}' must look like 'Name: value'",
            header
        ))),
    }
}

fn build_body(args: &RequestArgs) -> Result<Option<RequestBody>> {
    if let Some(data) = &args.data {
        return Ok(Some(RequestBody::from(data.clone())));
    }

    match &args.data_file {
        Some(path) if path.as_os_str() == "-" => Ok(Some(RequestBody::stream(io::stdin()))),
        Some(path) => {
            if !path.exists() {
                return Err(Error::FileNotFound { path: path.clone() });
            }
            Ok(Some(RequestBody::stream(File::open(path)?)))
        }
        None => Ok(None),
    }
}

fn build_ssl(args: &RequestArgs) -> Result<SslOptions> {
    let mut ssl = if args.insecure {
        SslOptions::verify(false)
    } else {
        SslOptions::default()
    };

    ssl.ca_file = args.cacert.clone();
    ssl.ca_path = args.capath.clone();
    ssl.client_cert = args.cert.clone();
    ssl.client_key = args.key.clone();
    ssl.version = args.tls_version.as_deref().map(str::parse).transpose()?;
    ssl.min_version = args.tls_min.as_deref().map(str::parse).transpose()?;
    ssl.max_version = args.tls_max.as_deref().map(str::parse).transpose()?;

    ssl.validate()?;
    Ok(ssl)
}

fn build_request_options(args: &RequestArgs) -> Result<RequestOptions> {
    let mut request = RequestOptions::new();
    request.timeout = args.timeout.map(|secs| seconds("--timeout", secs)).transpose()?;
    request.open_timeout = args
        .open_timeout
        .map(|secs| seconds("--open-timeout", secs))
        .transpose()?;

    if let Some(uri) = &args.proxy {
        let mut proxy = ProxyOptions::new(uri.clone());
        proxy.user = args.proxy_user.clone();
        proxy.password = args.proxy_password.clone();
        request.proxy = Some(proxy);
    }

    if args.stream {
        let mut stdout = io::stdout();
        request = request.with_on_data(move |chunk, _len| {
            if let Err(e) = stdout.write_all(chunk).and_then(|_| stdout.flush()) {
                tracing::warn!(error = %e, "Failed to write streamed body");
            }
        });
    }

    Ok(request)
}

fn seconds(flag: &str, secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs)
        .map_err(|_| Error::invalid_args(format!("{} must be a non-negative number of seconds", flag)))
}
