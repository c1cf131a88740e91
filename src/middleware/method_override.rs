//! Method override middleware
//!
//! Lets HTML forms, which can only submit GET and POST, express the full
//! method set: a POST carrying a `_method` form field or an
//! `X-HTTP-Method-Override` header is rewritten to the named method before
//! routing. The original method is preserved in the request extensions.

use hyper::body::Bytes;
use hyper::header::CONTENT_TYPE;
use hyper::{Method, Request};

const OVERRIDE_PARAM: &str = "_method";
const OVERRIDE_HEADER: &str = "x-http-method-override";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Methods an override is allowed to name.
const HTTP_METHODS: [&str; 9] = [
    "GET", "HEAD", "PUT", "POST", "DELETE", "OPTIONS", "PATCH", "LINK", "UNLINK",
];

/// The request method as received on the wire, before any override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginalMethod(pub Method);

/// Rewrite the request method when a valid override is present.
///
/// Only POST requests are eligible. An override naming anything outside
/// the known method set leaves the request untouched.
pub fn apply(req: &mut Request<Bytes>) {
    if req.method() != Method::POST {
        return;
    }

    let Some(name) = override_name(req) else {
        return;
    };
    let name = name.to_ascii_uppercase();
    if !HTTP_METHODS.contains(&name.as_str()) {
        return;
    }
    // Validated against the allowlist above, from_bytes cannot fail here
    let Ok(method) = Method::from_bytes(name.as_bytes()) else {
        return;
    };

    let original = OriginalMethod(req.method().clone());
    *req.method_mut() = method;
    req.extensions_mut().insert(original);
}

/// The override value: the `_method` form field wins over the header.
fn override_name(req: &Request<Bytes>) -> Option<String> {
    if let Some(value) = form_param(req, OVERRIDE_PARAM) {
        return Some(value);
    }
    req.headers()
        .get(OVERRIDE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

/// Extract one field from a urlencoded form body.
fn form_param(req: &Request<Bytes>, key: &str) -> Option<String> {
    let content_type = req.headers().get(CONTENT_TYPE)?.to_str().ok()?;
    let media_type = content_type
        .split(';')
        .next()
        .map_or(content_type, str::trim);
    if !media_type.eq_ignore_ascii_case(FORM_CONTENT_TYPE) {
        return None;
    }

    let body = std::str::from_utf8(req.body()).ok()?;
    body.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
        (k == key).then(|| form_decode(v))
    })
}

/// Percent-decode a form value, with `+` as space.
fn form_decode(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => match hex_pair(bytes.get(i + 1).copied(), bytes.get(i + 2).copied()) {
                Some(decoded) => {
                    out.push(decoded);
                    i += 3;
                }
                None => {
                    out.push(b'%');
                    i += 1;
                }
            },
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_pair(hi: Option<u8>, lo: Option<u8>) -> Option<u8> {
    let hi = (hi? as char).to_digit(16)?;
    let lo = (lo? as char).to_digit(16)?;
    u8::try_from(hi * 16 + lo).ok()
}
