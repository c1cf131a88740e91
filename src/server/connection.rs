// Connection handling module
// Accepts individual TCP connections and serves HTTP/1.1 on them

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::header::{HeaderValue, CONTENT_LENGTH, REFERER, SERVER, USER_AGENT};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, Version};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::config::AppState;
use crate::http;
use crate::logger::{self, AccessLogEntry};

/// Accept and process a connection, checking limits and logging.
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: std::net::SocketAddr,
    state: &Arc<AppState>,
    conn_counter: &Arc<AtomicUsize>,
) {
    // Increment counter first, then check limit (prevents race condition)
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            // Exceeded limit: rollback counter and reject
            conn_counter.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection rejected."
            ));
            drop(stream);
            return;
        }
    }

    // Check if access logging is enabled (lock-free)
    if state.cached_access_log.load(Ordering::Relaxed) {
        logger::log_connection_accepted(&peer_addr);
    }

    handle_connection(stream, peer_addr, Arc::clone(state), Arc::clone(conn_counter));
}

/// Serve a single connection in a spawned task: HTTP/1.1 with keep-alive,
/// bounded by the configured read/write timeout, counter decremented when
/// the connection closes.
fn handle_connection(
    stream: tokio::net::TcpStream,
    peer_addr: std::net::SocketAddr,
    state: Arc<AppState>,
    conn_counter: Arc<AtomicUsize>,
) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let keep_alive_timeout = state.config.performance.keep_alive_timeout;
        let timeout_duration = std::time::Duration::from_secs(std::cmp::max(
            state.config.performance.read_timeout,
            state.config.performance.write_timeout,
        ));

        let mut builder = http1::Builder::new();
        if keep_alive_timeout > 0 {
            builder.keep_alive(true);
        }

        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                let state = Arc::clone(&state);
                async move { Ok::<_, Infallible>(serve_request(req, &state, peer_addr).await) }
            }),
        );

        match tokio::time::timeout(timeout_duration, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => {
                logger::log_warning(&format!(
                    "Connection timeout after {} seconds",
                    timeout_duration.as_secs()
                ));
            }
        }

        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}

/// One request end to end: buffer the body, run the pipeline, stamp the
/// Server header, write the access log line.
async fn serve_request(
    req: Request<Incoming>,
    state: &Arc<AppState>,
    peer_addr: std::net::SocketAddr,
) -> Response<Full<Bytes>> {
    let started = Instant::now();
    let mut entry = access_entry(&req, peer_addr);

    let mut res = match buffer_request(req, state.config.http.max_body_size).await {
        Ok(req) => state.pipeline.dispatch(req, &state.router).await,
        Err(BufferError::TooLarge) => http::build_payload_too_large_response(),
        Err(BufferError::ReadFailed(e)) => {
            logger::log_error(&format!("Failed to read request body: {e}"));
            http::build_bad_request_response()
        }
    };

    if !res.headers().contains_key(SERVER) {
        if let Ok(value) = HeaderValue::from_str(&state.config.http.server_name) {
            res.headers_mut().insert(SERVER, value);
        }
    }

    if state.cached_access_log.load(Ordering::Relaxed) {
        entry.status = res.status().as_u16();
        entry.body_bytes = res.body().len();
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    res.map(Full::new)
}

enum BufferError {
    TooLarge,
    ReadFailed(hyper::Error),
}

/// Collect the request body into memory, capped at `max_body_size`.
///
/// A Content-Length past the cap is rejected before any body byte is read;
/// the collected size is checked again afterwards for requests that lie.
async fn buffer_request(
    req: Request<Incoming>,
    max_body_size: u64,
) -> Result<Request<Bytes>, BufferError> {
    if let Some(declared) = req
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
    {
        if declared > max_body_size {
            return Err(BufferError::TooLarge);
        }
    }

    let (parts, body) = req.into_parts();
    let collected = body
        .collect()
        .await
        .map_err(BufferError::ReadFailed)?
        .to_bytes();
    if collected.len() as u64 > max_body_size {
        return Err(BufferError::TooLarge);
    }

    Ok(Request::from_parts(parts, collected))
}

/// Access log fields captured from the request before it is consumed.
fn access_entry(req: &Request<Incoming>, peer_addr: std::net::SocketAddr) -> AccessLogEntry {
    let header = |name| {
        req.headers()
            .get(name)
            .and_then(|v: &HeaderValue| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = match req.version() {
        Version::HTTP_10 => "1.0".to_string(),
        Version::HTTP_2 => "2".to_string(),
        _ => "1.1".to_string(),
    };
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry
}
