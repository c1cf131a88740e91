//! ETag middleware
//!
//! Digests buffered response bodies into a weak `ETag` header, and fills
//! in a default `Cache-Control` when the handler set none. Responses that
//! already carry a validator (`ETag` or `Last-Modified`) are left for the
//! handler to manage.

use crate::http::etag;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CACHE_CONTROL, ETAG, LAST_MODIFIED};
use hyper::{Request, Response, StatusCode};

/// Cache-Control defaults applied when the response has none.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Used when an entity tag was produced
    pub cache_control: Option<String>,
    /// Used when no entity tag was produced (empty or validator-bearing body)
    pub no_cache_control: Option<String>,
}

/// Statuses whose bodies get an entity tag.
fn etag_status(status: StatusCode) -> bool {
    status == StatusCode::OK || status == StatusCode::CREATED
}

/// Tag the response body and default the Cache-Control header.
pub fn apply(
    settings: &Settings,
    req: &Request<Bytes>,
    mut res: Response<Bytes>,
) -> Response<Bytes> {
    let mut digest = None;

    if etag_status(res.status()) && !skip_caching(req, &res) {
        digest = etag::digest(res.body());
        if let Some(digest) = &digest {
            if let Ok(value) = HeaderValue::from_str(&etag::weak(digest)) {
                res.headers_mut().insert(ETAG, value);
            }
        }
    }

    if !res.headers().contains_key(CACHE_CONTROL) {
        let default = if digest.is_some() {
            settings.cache_control.as_deref()
        } else {
            settings.no_cache_control.as_deref()
        };
        if let Some(default) = default {
            if let Ok(value) = HeaderValue::from_str(default) {
                res.headers_mut().insert(CACHE_CONTROL, value);
            }
        }
    }

    res
}

/// Skip tagging when the handler already set a validator, or the client
/// asked for an uncached response.
fn skip_caching(req: &Request<Bytes>, res: &Response<Bytes>) -> bool {
    if res.headers().contains_key(ETAG) || res.headers().contains_key(LAST_MODIFIED) {
        return true;
    }
    req.headers()
        .get(CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("no-cache"))
}
