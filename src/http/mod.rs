//! HTTP protocol layer module
//!
//! Protocol-level helpers shared by the middleware pipeline and the static
//! file service: byte-range parsing, conditional-request evaluation, body
//! digests, MIME lookup, and canned response builders.

pub mod conditional;
pub mod etag;
pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used items
pub use range::{parse_range, ByteRange, RangeOutcome};
pub use response::{
    build_bad_request_response, build_method_not_allowed_response, build_not_found_response,
    build_not_modified_response, build_options_response, build_payload_too_large_response,
    build_range_not_satisfiable_response, build_redirect_response,
};

/// Statuses that must not carry an entity body (1xx, 204, 304).
///
/// Responses with these statuses never get a Content-Length from the
/// buffering middleware and are served with empty bodies.
pub fn status_allows_body(status: hyper::StatusCode) -> bool {
    !(status.is_informational()
        || status == hyper::StatusCode::NO_CONTENT
        || status == hyper::StatusCode::NOT_MODIFIED)
}
