//! Request timing middleware
//!
//! Sets an `X-Runtime` response header with the time spent handling the
//! request, in seconds with microsecond precision. Measured on the
//! monotonic clock.

use hyper::body::Bytes;
use hyper::header::HeaderValue;
use hyper::Response;
use std::time::Instant;

const HEADER_NAME: &str = "X-Runtime";

/// Header name for a timer, optionally suffixed: `X-Runtime-<name>`.
///
/// The suffix distinguishes multiple timing points when the header is
/// emitted by more than one hop.
pub fn header_name(name: Option<&str>) -> String {
    match name {
        Some(name) => format!("{HEADER_NAME}-{name}"),
        None => HEADER_NAME.to_string(),
    }
}

/// A started request timer.
pub struct RequestTimer {
    start: Instant,
}

impl RequestTimer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Stamp the elapsed time onto the response, unless the header is
    /// already present (an upstream hop's measurement wins).
    pub fn finish(self, header: &str, mut res: Response<Bytes>) -> Response<Bytes> {
        if res.headers().contains_key(header) {
            return res;
        }

        let elapsed = format!("{:.6}", self.start.elapsed().as_secs_f64());
        match (
            header.parse::<hyper::header::HeaderName>(),
            HeaderValue::from_str(&elapsed),
        ) {
            (Ok(name), Ok(value)) => {
                res.headers_mut().insert(name, value);
            }
            _ => {
                crate::logger::log_warning(&format!("Invalid runtime header name: {header}"));
            }
        }
        res
    }
}
