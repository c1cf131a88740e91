//! Conditional GET middleware
//!
//! Compares request validators (`If-None-Match`, `If-Modified-Since`)
//! against the validators the handler put on the response (`ETag`,
//! `Last-Modified`). A fresh GET or HEAD response is rewritten to
//! 304 Not Modified with an empty body, so the client re-uses its cache.

use crate::http::conditional;
use hyper::body::Bytes;
use hyper::header::{CONTENT_LENGTH, CONTENT_TYPE, ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};
use hyper::{Method, Request, Response, StatusCode};

/// Rewrite a fresh 200 response to 304.
pub fn apply(req: &Request<Bytes>, mut res: Response<Bytes>) -> Response<Bytes> {
    let method = req.method();
    if method != Method::GET && method != Method::HEAD {
        return res;
    }
    if res.status() != StatusCode::OK || !fresh(req, &res) {
        return res;
    }

    *res.status_mut() = StatusCode::NOT_MODIFIED;
    res.headers_mut().remove(CONTENT_TYPE);
    res.headers_mut().remove(CONTENT_LENGTH);
    *res.body_mut() = Bytes::new();
    res
}

/// A response is fresh when the client sent at least one validator and
/// every validator it sent matches.
fn fresh(req: &Request<Bytes>, res: &Response<Bytes>) -> bool {
    let if_none_match = header_str(req.headers(), IF_NONE_MATCH);
    let if_modified_since = header_str(req.headers(), IF_MODIFIED_SINCE);

    if if_none_match.is_none() && if_modified_since.is_none() {
        return false;
    }

    let mut fresh = true;
    if let Some(since) = if_modified_since {
        fresh &= match header_str(res.headers(), LAST_MODIFIED) {
            Some(last_modified) => conditional::not_modified_since(since, last_modified),
            None => false,
        };
    }
    if fresh {
        if let Some(none_match) = if_none_match {
            fresh &= match header_str(res.headers(), ETAG) {
                Some(etag) => conditional::etag_matches(none_match, etag),
                None => false,
            };
        }
    }
    fresh
}

fn header_str(headers: &hyper::HeaderMap, name: hyper::header::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LM_EARLIER: &str = "Sun, 06 Nov 1994 08:49:37 GMT";
    const LM_LATER: &str = "Mon, 07 Nov 1994 08:49:37 GMT";

    fn get_request(headers: &[(&str, &str)]) -> Request<Bytes> {
        let mut builder = Request::builder().method(Method::GET).uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Bytes::new()).unwrap()
    }

    fn ok_response(headers: &[(&str, &str)]) -> Response<Bytes> {
        let mut builder = Response::builder()
            .status(200)
            .header("Content-Type", "text/plain");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Bytes::from("payload")).unwrap()
    }

    #[test]
    fn test_matching_etag_yields_304() {
        let req = get_request(&[("If-None-Match", "\"tag\"")]);
        let res = apply(&req, ok_response(&[("ETag", "\"tag\"")]));

        assert_eq!(res.status(), 304);
        assert!(res.body().is_empty());
        assert!(!res.headers().contains_key("Content-Type"));
        assert!(!res.headers().contains_key("Content-Length"));
        // The validator itself survives
        assert_eq!(res.headers()["ETag"], "\"tag\"");
    }

    #[test]
    fn test_mismatched_etag_passes_through() {
        let req = get_request(&[("If-None-Match", "\"other\"")]);
        let res = apply(&req, ok_response(&[("ETag", "\"tag\"")]));
        assert_eq!(res.status(), 200);
        assert_eq!(res.body().as_ref(), b"payload");
    }

    #[test]
    fn test_not_modified_since_yields_304() {
        let req = get_request(&[("If-Modified-Since", LM_LATER)]);
        let res = apply(&req, ok_response(&[("Last-Modified", LM_EARLIER)]));
        assert_eq!(res.status(), 304);
    }

    #[test]
    fn test_modified_since_passes_through() {
        let req = get_request(&[("If-Modified-Since", LM_EARLIER)]);
        let res = apply(&req, ok_response(&[("Last-Modified", LM_LATER)]));
        assert_eq!(res.status(), 200);
    }

    #[test]
    fn test_both_validators_must_match() {
        let req = get_request(&[
            ("If-None-Match", "\"tag\""),
            ("If-Modified-Since", LM_EARLIER),
        ]);
        // ETag matches but the resource was modified since
        let res = apply(
            &req,
            ok_response(&[("ETag", "\"tag\""), ("Last-Modified", LM_LATER)]),
        );
        assert_eq!(res.status(), 200);
    }

    #[test]
    fn test_no_validators_passes_through() {
        let req = get_request(&[]);
        let res = apply(&req, ok_response(&[("ETag", "\"tag\"")]));
        assert_eq!(res.status(), 200);
    }

    #[test]
    fn test_non_get_head_untouched() {
        let mut req = get_request(&[("If-None-Match", "\"tag\"")]);
        *req.method_mut() = Method::POST;
        let res = apply(&req, ok_response(&[("ETag", "\"tag\"")]));
        assert_eq!(res.status(), 200);
    }

    #[test]
    fn test_non_200_untouched() {
        let req = get_request(&[("If-None-Match", "\"tag\"")]);
        let mut res = ok_response(&[("ETag", "\"tag\"")]);
        *res.status_mut() = StatusCode::CREATED;
        let res = apply(&req, res);
        assert_eq!(res.status(), 201);
    }

    #[test]
    fn test_head_is_eligible() {
        let mut req = get_request(&[("If-None-Match", "\"tag\"")]);
        *req.method_mut() = Method::HEAD;
        let res = apply(&req, ok_response(&[("ETag", "\"tag\"")]));
        assert_eq!(res.status(), 304);
    }
}
