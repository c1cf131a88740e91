//! Static file serving module
//!
//! Serves files below a root directory: conditional requests against the
//! file mtime, single-range partial content, and OPTIONS/405 method
//! handling. Paths are percent-decoded and dot-segment-cleaned before they
//! touch the filesystem, and the resolved file must stay inside the root.

use crate::handler::router::RequestContext;
use crate::http::range::RangeOutcome;
use crate::http::{self, conditional, mime};
use crate::logger;
use hyper::body::Bytes;
use hyper::header::{HeaderName, HeaderValue};
use hyper::{Method, Response};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Methods the file service answers.
pub const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// A file service rooted at one directory.
///
/// Extra headers from configuration are applied to every successful
/// response; the default content type covers unknown extensions.
pub struct FileService {
    root: PathBuf,
    extra_headers: Vec<(HeaderName, HeaderValue)>,
    default_mime: String,
}

impl FileService {
    pub fn new(root: impl Into<PathBuf>, headers: &HashMap<String, String>, default_mime: &str) -> Self {
        let mut extra_headers = Vec::with_capacity(headers.len());
        for (name, value) in headers {
            match (
                name.parse::<HeaderName>(),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => extra_headers.push((name, value)),
                _ => logger::log_warning(&format!("Ignoring invalid static header: {name}")),
            }
        }
        Self {
            root: root.into(),
            extra_headers,
            default_mime: default_mime.to_string(),
        }
    }

    /// Serve the file named by the request path, relative to the root.
    ///
    /// `route_prefix` is the mount point; it is stripped from the request
    /// path before resolution.
    pub async fn serve(&self, ctx: &RequestContext<'_>, route_prefix: &str) -> Response<Bytes> {
        if let Some(early) = precheck(ctx) {
            return early;
        }

        let relative = resolve_path(ctx.path, route_prefix);
        let path = self.root.join(&relative);

        if !self.contains(&path).await {
            logger::log_warning(&format!("Path escapes static root, refused: {}", ctx.path));
            return not_found(ctx.path);
        }

        self.serve_path(ctx, &path).await
    }

    /// Serve one specific file, bypassing path resolution. Used for
    /// single-file routes where the target comes from configuration.
    pub async fn serve_file(&self, ctx: &RequestContext<'_>, path: &Path) -> Response<Bytes> {
        if let Some(early) = precheck(ctx) {
            return early;
        }
        self.serve_path(ctx, path).await
    }

    /// Containment check: the canonicalized target must sit under the
    /// canonicalized root. A target that does not resolve is handled as a
    /// plain miss later.
    async fn contains(&self, path: &Path) -> bool {
        let Ok(root) = fs::canonicalize(&self.root).await else {
            logger::log_warning(&format!(
                "Static root not found or inaccessible: {}",
                self.root.display()
            ));
            return false;
        };
        match fs::canonicalize(path).await {
            Ok(resolved) => resolved.starts_with(&root),
            Err(_) => true, // nonexistent, becomes a 404 in serve_path
        }
    }

    async fn serve_path(&self, ctx: &RequestContext<'_>, path: &Path) -> Response<Bytes> {
        let Ok(meta) = fs::metadata(path).await else {
            return not_found(ctx.path);
        };
        if !meta.is_file() {
            return not_found(ctx.path);
        }

        let last_modified = meta.modified().ok().map(conditional::http_date);

        // Exact-match revalidation against the mtime
        if let (Some(since), Some(last_modified)) = (ctx.if_modified_since, &last_modified) {
            if since == last_modified {
                return http::build_not_modified_response();
            }
        }

        let content_type = mime::content_type(
            path.extension().and_then(|e| e.to_str()),
            &self.default_mime,
        );

        if ctx.is_head {
            // Size from metadata, the body is never read
            return self.build_response(200, content_type, &last_modified, meta.len(), None, Bytes::new());
        }

        let data = match fs::read(path).await {
            Ok(data) => data,
            Err(e) => {
                logger::log_error(&format!("Failed to read file '{}': {e}", path.display()));
                return not_found(ctx.path);
            }
        };
        let size = data.len() as u64;

        match http::parse_range(ctx.range, size) {
            RangeOutcome::Ignored => {
                self.build_response(200, content_type, &last_modified, size, None, Bytes::from(data))
            }
            RangeOutcome::Unsatisfiable => http::build_range_not_satisfiable_response(size),
            RangeOutcome::Single(range) => {
                let start = usize::try_from(range.start).unwrap_or(usize::MAX);
                let end = usize::try_from(range.end).unwrap_or(usize::MAX);
                let body = Bytes::from(data[start..=end].to_vec());
                self.build_response(
                    206,
                    content_type,
                    &last_modified,
                    range.len(),
                    Some(range.to_content_range(size)),
                    body,
                )
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn build_response(
        &self,
        status: u16,
        content_type: &str,
        last_modified: &Option<String>,
        content_length: u64,
        content_range: Option<String>,
        body: Bytes,
    ) -> Response<Bytes> {
        let mut builder = Response::builder()
            .status(status)
            .header("Content-Type", content_type)
            .header("Content-Length", content_length)
            .header("Accept-Ranges", "bytes");
        if let Some(last_modified) = last_modified {
            builder = builder.header("Last-Modified", last_modified);
        }
        if let Some(content_range) = content_range {
            builder = builder.header("Content-Range", content_range);
        }
        let mut res = builder.body(body).unwrap_or_else(|e| {
            logger::log_error(&format!("Failed to build file response: {e}"));
            Response::new(Bytes::new())
        });
        for (name, value) in &self.extra_headers {
            res.headers_mut().insert(name.clone(), value.clone());
        }
        res
    }
}

/// Method gate shared by both entry points.
fn precheck(ctx: &RequestContext<'_>) -> Option<Response<Bytes>> {
    match *ctx.method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response(ALLOWED_METHODS)),
        _ => {
            logger::log_warning(&format!("Method not allowed for file service: {}", ctx.method));
            Some(http::build_method_not_allowed_response(ALLOWED_METHODS))
        }
    }
}

fn not_found(path: &str) -> Response<Bytes> {
    http::build_not_found_response(&format!("File not found: {path}"))
}

/// Strip the mount prefix, percent-decode, and remove dot segments.
///
/// Decoding happens before cleaning so encoded dot segments cannot slip
/// through; `..` at the top level pops nothing.
fn resolve_path(path: &str, route_prefix: &str) -> String {
    let rest = path.strip_prefix(route_prefix).unwrap_or(path);
    let decoded = percent_decode_path(rest);

    let mut parts: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            segment => parts.push(segment),
        }
    }
    parts.join("/")
}

/// Percent-decode a URL path. Unlike form decoding, `+` stays literal.
fn percent_decode_path(path: &str) -> String {
    let bytes = path.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if let Some(decoded) = hex_pair(bytes.get(i + 1).copied(), bytes.get(i + 2).copied()) {
                out.push(decoded);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_pair(hi: Option<u8>, lo: Option<u8>) -> Option<u8> {
    let hi = (hi? as char).to_digit(16)?;
    let lo = (lo? as char).to_digit(16)?;
    u8::try_from(hi * 16 + lo).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn service(root: &Path) -> FileService {
        FileService::new(root, &HashMap::new(), "text/plain")
    }

    fn ctx<'a>(
        method: &'a Method,
        path: &'a str,
        range: Option<&'a str>,
        if_modified_since: Option<&'a str>,
    ) -> RequestContext<'a> {
        RequestContext {
            method,
            path,
            is_head: *method == Method::HEAD,
            if_modified_since,
            range,
        }
    }

    fn temp_root(name: &str, content: &[u8]) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("midway-static-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let mut file = std::fs::File::create(dir.join("data.bin")).unwrap();
        file.write_all(content).unwrap();
        dir
    }

    #[test]
    fn test_resolve_path() {
        assert_eq!(resolve_path("/assets/app.js", "/assets"), "app.js");
        assert_eq!(resolve_path("/a/b/c.txt", ""), "a/b/c.txt");
        assert_eq!(resolve_path("/a/../../etc/passwd", ""), "etc/passwd");
        assert_eq!(resolve_path("/a/%2e%2e/%2e%2e/secret", ""), "secret");
        assert_eq!(resolve_path("/hello%20world.txt", ""), "hello world.txt");
        assert_eq!(resolve_path("/a//b/./c", ""), "a/b/c");
    }

    #[test]
    fn test_percent_decode_path_keeps_plus() {
        assert_eq!(percent_decode_path("a+b"), "a+b");
        assert_eq!(percent_decode_path("a%2Fb"), "a/b");
        assert_eq!(percent_decode_path("100%"), "100%");
    }

    #[tokio::test]
    async fn test_serves_full_file() {
        let root = temp_root("full", b"0123456789");
        let res = service(&root)
            .serve(&ctx(&Method::GET, "/data.bin", None, None), "")
            .await;

        assert_eq!(res.status(), 200);
        assert_eq!(res.body().as_ref(), b"0123456789");
        assert_eq!(res.headers()["Content-Length"], "10");
        assert_eq!(res.headers()["Accept-Ranges"], "bytes");
        assert!(res.headers().contains_key("Last-Modified"));
    }

    #[tokio::test]
    async fn test_partial_content() {
        let root = temp_root("partial", b"0123456789");
        let res = service(&root)
            .serve(&ctx(&Method::GET, "/data.bin", Some("bytes=2-5"), None), "")
            .await;

        assert_eq!(res.status(), 206);
        assert_eq!(res.body().as_ref(), b"2345");
        assert_eq!(res.headers()["Content-Range"], "bytes 2-5/10");
        assert_eq!(res.headers()["Content-Length"], "4");
    }

    #[tokio::test]
    async fn test_suffix_range() {
        let root = temp_root("suffix", b"0123456789");
        let res = service(&root)
            .serve(&ctx(&Method::GET, "/data.bin", Some("bytes=-3"), None), "")
            .await;

        assert_eq!(res.status(), 206);
        assert_eq!(res.body().as_ref(), b"789");
        assert_eq!(res.headers()["Content-Range"], "bytes 7-9/10");
    }

    #[tokio::test]
    async fn test_unsatisfiable_range() {
        let root = temp_root("unsat", b"0123456789");
        let res = service(&root)
            .serve(&ctx(&Method::GET, "/data.bin", Some("bytes=50-"), None), "")
            .await;

        assert_eq!(res.status(), 416);
        assert_eq!(res.headers()["Content-Range"], "bytes */10");
    }

    #[tokio::test]
    async fn test_multi_range_served_in_full() {
        let root = temp_root("multi", b"0123456789");
        let res = service(&root)
            .serve(
                &ctx(&Method::GET, "/data.bin", Some("bytes=0-1,4-5"), None),
                "",
            )
            .await;

        assert_eq!(res.status(), 200);
        assert_eq!(res.body().as_ref(), b"0123456789");
    }

    #[tokio::test]
    async fn test_missing_file_is_404() {
        let root = temp_root("missing", b"x");
        let res = service(&root)
            .serve(&ctx(&Method::GET, "/nope.bin", None, None), "")
            .await;

        assert_eq!(res.status(), 404);
        assert_eq!(res.body().as_ref(), b"File not found: /nope.bin\n");
    }

    #[tokio::test]
    async fn test_directory_is_404() {
        let root = temp_root("dir", b"x");
        let res = service(&root)
            .serve(&ctx(&Method::GET, "/", None, None), "")
            .await;
        assert_eq!(res.status(), 404);
    }

    #[tokio::test]
    async fn test_method_not_allowed() {
        let root = temp_root("method", b"x");
        let method = Method::POST;
        let res = service(&root)
            .serve(&ctx(&method, "/data.bin", None, None), "")
            .await;

        assert_eq!(res.status(), 405);
        assert_eq!(res.headers()["Allow"], "GET, HEAD, OPTIONS");
    }

    #[tokio::test]
    async fn test_options() {
        let root = temp_root("options", b"x");
        let method = Method::OPTIONS;
        let res = service(&root)
            .serve(&ctx(&method, "/data.bin", None, None), "")
            .await;

        assert_eq!(res.status(), 200);
        assert_eq!(res.headers()["Allow"], "GET, HEAD, OPTIONS");
        assert_eq!(res.headers()["Content-Length"], "0");
    }

    #[tokio::test]
    async fn test_head_has_size_but_no_body() {
        let root = temp_root("head", b"0123456789");
        let res = service(&root)
            .serve(&ctx(&Method::HEAD, "/data.bin", None, None), "")
            .await;

        assert_eq!(res.status(), 200);
        assert!(res.body().is_empty());
        assert_eq!(res.headers()["Content-Length"], "10");
    }

    #[tokio::test]
    async fn test_if_modified_since_exact_match() {
        let root = temp_root("ims", b"0123456789");
        let svc = service(&root);

        let first = svc
            .serve(&ctx(&Method::GET, "/data.bin", None, None), "")
            .await;
        let last_modified = first.headers()["Last-Modified"].to_str().unwrap().to_string();

        let second = svc
            .serve(
                &ctx(&Method::GET, "/data.bin", None, Some(&last_modified)),
                "",
            )
            .await;
        assert_eq!(second.status(), 304);
        assert!(second.body().is_empty());
    }

    #[tokio::test]
    async fn test_traversal_is_refused() {
        let root = temp_root("traverse", b"x");
        // Cleaning pops the dot segments, so this resolves inside the root
        // and simply misses; either way nothing outside the root is read.
        let res = service(&root)
            .serve(&ctx(&Method::GET, "/../../../etc/passwd", None, None), "")
            .await;
        assert_eq!(res.status(), 404);
    }

    #[tokio::test]
    async fn test_extra_headers_applied() {
        let root = temp_root("headers", b"x");
        let mut headers = HashMap::new();
        headers.insert("X-Static".to_string(), "yes".to_string());
        let svc = FileService::new(&root, &headers, "text/plain");

        let res = svc
            .serve(&ctx(&Method::GET, "/data.bin", None, None), "")
            .await;
        assert_eq!(res.headers()["X-Static"], "yes");
    }

    #[tokio::test]
    async fn test_mount_prefix_stripped() {
        let root = temp_root("mount", b"0123456789");
        let res = service(&root)
            .serve(&ctx(&Method::GET, "/files/data.bin", None, None), "/files")
            .await;
        assert_eq!(res.status(), 200);
    }
}
