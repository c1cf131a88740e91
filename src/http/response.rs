//! HTTP response building module
//!
//! Builders for the canned status responses the pipeline and the file
//! service produce. Bodies are plain text with a trailing newline; error
//! builders set their own Content-Length so they stay correct even when
//! the buffering middleware is disabled.

use crate::logger;
use hyper::body::Bytes;
use hyper::Response;

/// Build a plain-text response with an explicit status.
fn build_text_response(status: u16, message: &str) -> Response<Bytes> {
    let body = format!("{message}\n");
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain")
        .header("Content-Length", body.len())
        .body(Bytes::from(body))
        .unwrap_or_else(|e| {
            log_build_error(status, &e);
            Response::new(Bytes::new())
        })
}

/// Build 304 Not Modified response (no entity headers, empty body)
pub fn build_not_modified_response() -> Response<Bytes> {
    Response::builder()
        .status(304)
        .body(Bytes::new())
        .unwrap_or_else(|e| {
            log_build_error(304, &e);
            Response::new(Bytes::new())
        })
}

/// Build 400 Bad Request response
pub fn build_bad_request_response() -> Response<Bytes> {
    build_text_response(400, "400 Bad Request")
}

/// Build 404 Not Found response
pub fn build_not_found_response(message: &str) -> Response<Bytes> {
    build_text_response(404, message)
}

/// Build 405 Method Not Allowed response with an Allow header
pub fn build_method_not_allowed_response(allow: &str) -> Response<Bytes> {
    let body = "405 Method Not Allowed\n";
    Response::builder()
        .status(405)
        .header("Content-Type", "text/plain")
        .header("Content-Length", body.len())
        .header("Allow", allow)
        .body(Bytes::from(body))
        .unwrap_or_else(|e| {
            log_build_error(405, &e);
            Response::new(Bytes::new())
        })
}

/// Build an OPTIONS response advertising the allowed methods
pub fn build_options_response(allow: &str) -> Response<Bytes> {
    Response::builder()
        .status(200)
        .header("Allow", allow)
        .header("Content-Length", 0)
        .body(Bytes::new())
        .unwrap_or_else(|e| {
            log_build_error(200, &e);
            Response::new(Bytes::new())
        })
}

/// Build 413 Payload Too Large response
pub fn build_payload_too_large_response() -> Response<Bytes> {
    build_text_response(413, "413 Payload Too Large")
}

/// Build 416 Range Not Satisfiable response, advertising the file size
pub fn build_range_not_satisfiable_response(file_size: u64) -> Response<Bytes> {
    let body = "Byte range unsatisfiable\n";
    Response::builder()
        .status(416)
        .header("Content-Type", "text/plain")
        .header("Content-Length", body.len())
        .header("Content-Range", format!("bytes */{file_size}"))
        .body(Bytes::from(body))
        .unwrap_or_else(|e| {
            log_build_error(416, &e);
            Response::new(Bytes::new())
        })
}

/// Build 302 redirect response
pub fn build_redirect_response(target: &str) -> Response<Bytes> {
    let body = "Redirecting...\n";
    Response::builder()
        .status(302)
        .header("Location", target)
        .header("Content-Type", "text/plain")
        .header("Content-Length", body.len())
        .body(Bytes::from(body))
        .unwrap_or_else(|e| {
            log_build_error(302, &e);
            Response::new(Bytes::new())
        })
}

/// Log response build error
fn log_build_error(status: u16, error: &hyper::http::Error) {
    logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found() {
        let res = build_not_found_response("File not found: /missing");
        assert_eq!(res.status(), 404);
        assert_eq!(res.headers()["Content-Type"], "text/plain");
        assert_eq!(res.body().as_ref(), b"File not found: /missing\n");
        assert_eq!(
            res.headers()["Content-Length"],
            res.body().len().to_string().as_str()
        );
    }

    #[test]
    fn test_method_not_allowed_carries_allow() {
        let res = build_method_not_allowed_response("GET, HEAD, OPTIONS");
        assert_eq!(res.status(), 405);
        assert_eq!(res.headers()["Allow"], "GET, HEAD, OPTIONS");
    }

    #[test]
    fn test_options_has_empty_body() {
        let res = build_options_response("GET, HEAD, OPTIONS");
        assert_eq!(res.status(), 200);
        assert_eq!(res.headers()["Content-Length"], "0");
        assert!(res.body().is_empty());
    }

    #[test]
    fn test_range_not_satisfiable_advertises_size() {
        let res = build_range_not_satisfiable_response(1234);
        assert_eq!(res.status(), 416);
        assert_eq!(res.headers()["Content-Range"], "bytes */1234");
    }

    #[test]
    fn test_not_modified_is_bare() {
        let res = build_not_modified_response();
        assert_eq!(res.status(), 304);
        assert!(res.body().is_empty());
        assert!(!res.headers().contains_key("Content-Type"));
    }

    #[test]
    fn test_redirect_location() {
        let res = build_redirect_response("/elsewhere");
        assert_eq!(res.status(), 302);
        assert_eq!(res.headers()["Location"], "/elsewhere");
    }
}
