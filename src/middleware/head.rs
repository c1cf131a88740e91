//! HEAD response middleware
//!
//! HEAD requests get the same status and headers a GET would produce, with
//! the body dropped. Content-Length is left alone so the client still
//! learns the representation size.

use hyper::body::Bytes;
use hyper::{Method, Request, Response};

/// Empty the body for HEAD requests; all other requests pass through.
pub fn apply(req: &Request<Bytes>, mut res: Response<Bytes>) -> Response<Bytes> {
    if req.method() == Method::HEAD {
        *res.body_mut() = Bytes::new();
    }
    res
}
