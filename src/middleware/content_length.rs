//! Content-Length middleware
//!
//! Responses are fully buffered by the time they reach this layer, so the
//! entity size is simply the body length. The header is set unless the
//! status forbids an entity body, the header already exists, or the
//! response is chunked.

use crate::http::status_allows_body;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_LENGTH, TRANSFER_ENCODING};
use hyper::Response;

/// Set Content-Length from the buffered body where appropriate.
pub fn apply(mut res: Response<Bytes>) -> Response<Bytes> {
    if !status_allows_body(res.status())
        || res.headers().contains_key(CONTENT_LENGTH)
        || res.headers().contains_key(TRANSFER_ENCODING)
    {
        return res;
    }

    let len = res.body().len();
    res.headers_mut()
        .insert(CONTENT_LENGTH, HeaderValue::from(len));
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::StatusCode;

    #[test]
    fn test_sets_length_from_body() {
        let res = apply(Response::new(Bytes::from("hello world")));
        assert_eq!(res.headers()[CONTENT_LENGTH], "11");
    }

    #[test]
    fn test_empty_body_gets_zero() {
        let res = apply(Response::new(Bytes::new()));
        assert_eq!(res.headers()[CONTENT_LENGTH], "0");
    }

    #[test]
    fn test_existing_header_untouched() {
        let res = Response::builder()
            .header("Content-Length", "999")
            .body(Bytes::from("abc"))
            .unwrap();
        let res = apply(res);
        assert_eq!(res.headers()[CONTENT_LENGTH], "999");
    }

    #[test]
    fn test_chunked_response_skipped() {
        let res = Response::builder()
            .header("Transfer-Encoding", "chunked")
            .body(Bytes::from("abc"))
            .unwrap();
        let res = apply(res);
        assert!(!res.headers().contains_key(CONTENT_LENGTH));
    }

    #[test]
    fn test_bodyless_statuses_skipped() {
        for status in [StatusCode::NO_CONTENT, StatusCode::NOT_MODIFIED] {
            let res = Response::builder()
                .status(status)
                .body(Bytes::new())
                .unwrap();
            let res = apply(res);
            assert!(!res.headers().contains_key(CONTENT_LENGTH), "{status}");
        }
    }
}
