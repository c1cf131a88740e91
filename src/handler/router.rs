//! Request routing dispatch module
//!
//! Matches request paths against the configured route table and dispatches
//! to the file service or a redirect. Exact matches win; otherwise the
//! longest matching prefix does.

use crate::config::{HttpConfig, RouteHandler, RoutesConfig};
use crate::handler::static_files::FileService;
use crate::http;
use hyper::body::Bytes;
use hyper::{Method, Request, Response};
use std::path::PathBuf;

/// Request fields the file service cares about, borrowed from the request.
pub struct RequestContext<'a> {
    pub method: &'a Method,
    pub path: &'a str,
    pub is_head: bool,
    pub if_modified_since: Option<&'a str>,
    pub range: Option<&'a str>,
}

impl<'a> RequestContext<'a> {
    pub fn from_request(req: &'a Request<Bytes>) -> Self {
        let header = |name: &str| req.headers().get(name).and_then(|v| v.to_str().ok());
        Self {
            method: req.method(),
            path: req.uri().path(),
            is_head: req.method() == Method::HEAD,
            if_modified_since: header("if-modified-since"),
            range: header("range"),
        }
    }
}

enum RouteTarget {
    Dir(FileService),
    File(FileService, PathBuf),
    Redirect(String),
}

/// The route table, built once from configuration.
pub struct Router {
    /// Sorted longest prefix first so prefix dispatch is deterministic
    routes: Vec<(String, RouteTarget)>,
}

impl Router {
    pub fn new(routes: &RoutesConfig, http: &HttpConfig) -> Self {
        let mut entries: Vec<(String, RouteTarget)> = routes
            .custom_routes
            .iter()
            .map(|(prefix, handler)| {
                let target = match handler {
                    RouteHandler::Dir { path } => RouteTarget::Dir(FileService::new(
                        path,
                        &routes.static_headers,
                        &http.default_mime,
                    )),
                    RouteHandler::File { path } => RouteTarget::File(
                        FileService::new(
                            PathBuf::from(path).parent().unwrap_or_else(|| std::path::Path::new(".")),
                            &routes.static_headers,
                            &http.default_mime,
                        ),
                        PathBuf::from(path),
                    ),
                    RouteHandler::Redirect { target } => RouteTarget::Redirect(target.clone()),
                };
                (prefix.clone(), target)
            })
            .collect();
        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        Self { routes: entries }
    }

    /// Dispatch a request to its route; unmatched paths are 404.
    pub async fn dispatch(&self, req: &Request<Bytes>) -> Response<Bytes> {
        let ctx = RequestContext::from_request(req);

        // Exact match first
        if let Some((prefix, target)) = self.routes.iter().find(|(p, _)| p == ctx.path) {
            return run_target(&ctx, prefix, target).await;
        }

        // Longest prefix match (routes are pre-sorted)
        if let Some((prefix, target)) = self
            .routes
            .iter()
            .find(|(p, _)| ctx.path.starts_with(p.as_str()))
        {
            return run_target(&ctx, prefix, target).await;
        }

        http::build_not_found_response("404 Not Found")
    }
}

async fn run_target(
    ctx: &RequestContext<'_>,
    prefix: &str,
    target: &RouteTarget,
) -> Response<Bytes> {
    match target {
        RouteTarget::Dir(service) => service.serve(ctx, prefix).await,
        RouteTarget::File(service, path) => service.serve_file(ctx, path).await,
        RouteTarget::Redirect(location) => http::build_redirect_response(location),
    }
}
