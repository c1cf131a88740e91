//! Middleware pipeline module
//!
//! The processing layers wrapped around the router. Requests arrive fully
//! buffered (`Request<Bytes>`) and responses leave fully buffered
//! (`Response<Bytes>`), so every response layer is a plain function from
//! response to response.
//!
//! Pipeline order (request flows down, response flows back up):
//!
//! 1. `runtime` - record a monotonic start instant
//! 2. `lock` - optionally serialize the whole request
//! 3. `method_override` - rewrite POST per `_method` / override header
//! 4. router - static files, redirects, 404
//! 5. `etag` - weak entity tag + Cache-Control defaulting
//! 6. `conditional_get` - rewrite fresh GET/HEAD responses to 304
//! 7. `content_length` - set Content-Length from the buffered body
//! 8. `head` - drop the body for HEAD requests
//! 9. `runtime` - set the X-Runtime header
//!
//! Each layer is toggled from the `[middleware]` configuration table.

pub mod conditional_get;
pub mod content_length;
pub mod etag;
pub mod head;
pub mod lock;
pub mod method_override;
pub mod runtime;

use crate::config::MiddlewareConfig;
use crate::handler::Router;
use hyper::body::Bytes;
use hyper::{Request, Response};

/// The assembled pipeline. Built once at startup from configuration and
/// shared across connections.
pub struct Pipeline {
    runtime_enabled: bool,
    runtime_header: Option<String>,
    method_override_enabled: bool,
    conditional_get_enabled: bool,
    content_length_enabled: bool,
    head_enabled: bool,
    etag_settings: Option<etag::Settings>,
    lock: Option<lock::RequestLock>,
}

impl Pipeline {
    pub fn new(cfg: &MiddlewareConfig) -> Self {
        Self {
            runtime_enabled: cfg.runtime,
            runtime_header: cfg
                .runtime
                .then(|| runtime::header_name(cfg.runtime_name.as_deref())),
            method_override_enabled: cfg.method_override,
            conditional_get_enabled: cfg.conditional_get,
            content_length_enabled: cfg.content_length,
            head_enabled: cfg.head,
            etag_settings: cfg.etag.then(|| etag::Settings {
                cache_control: cfg.etag_cache_control.clone(),
                no_cache_control: cfg.etag_no_cache_control.clone(),
            }),
            lock: cfg.serialize_requests.then(lock::RequestLock::new),
        }
    }

    /// Run a buffered request through the pipeline.
    pub async fn dispatch(&self, mut req: Request<Bytes>, router: &Router) -> Response<Bytes> {
        let timer = self.runtime_enabled.then(runtime::RequestTimer::start);

        // Held across the handler and every response layer
        let _guard = match &self.lock {
            Some(lock) => Some(lock.acquire().await),
            None => None,
        };

        if self.method_override_enabled {
            method_override::apply(&mut req);
        }

        let mut res = router.dispatch(&req).await;

        if let Some(settings) = &self.etag_settings {
            res = etag::apply(settings, &req, res);
        }
        if self.conditional_get_enabled {
            res = conditional_get::apply(&req, res);
        }
        if self.content_length_enabled {
            res = content_length::apply(res);
        }
        if self.head_enabled {
            res = head::apply(&req, res);
        }
        if let (Some(timer), Some(header)) = (timer, &self.runtime_header) {
            res = timer.finish(header, res);
        }

        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HttpConfig, RouteHandler, RoutesConfig};
    use hyper::Method;
    use std::collections::HashMap;

    fn test_router() -> Router {
        let mut custom_routes = HashMap::new();
        custom_routes.insert(
            "/away".to_string(),
            RouteHandler::Redirect {
                target: "/elsewhere".to_string(),
            },
        );
        let routes = RoutesConfig {
            custom_routes,
            static_headers: HashMap::new(),
        };
        Router::new(&routes, &HttpConfig::default())
    }

    fn full_pipeline() -> Pipeline {
        Pipeline::new(&MiddlewareConfig::default())
    }

    #[tokio::test]
    async fn test_unmatched_path_is_404_with_runtime_header() {
        let req = Request::builder()
            .method(Method::GET)
            .uri("/nothing-here")
            .body(Bytes::new())
            .unwrap();

        let res = full_pipeline().dispatch(req, &test_router()).await;
        assert_eq!(res.status(), 404);
        assert!(res.headers().contains_key("X-Runtime"));
        assert!(res.headers().contains_key("Content-Length"));
    }

    #[tokio::test]
    async fn test_redirect_route() {
        let req = Request::builder()
            .method(Method::GET)
            .uri("/away")
            .body(Bytes::new())
            .unwrap();

        let res = full_pipeline().dispatch(req, &test_router()).await;
        assert_eq!(res.status(), 302);
        assert_eq!(res.headers()["Location"], "/elsewhere");
    }

    #[tokio::test]
    async fn test_head_request_gets_empty_body() {
        let req = Request::builder()
            .method(Method::HEAD)
            .uri("/nothing-here")
            .body(Bytes::new())
            .unwrap();

        let res = full_pipeline().dispatch(req, &test_router()).await;
        assert_eq!(res.status(), 404);
        assert!(res.body().is_empty());
        // Headers survive the body strip
        assert!(res.headers().contains_key("Content-Length"));
    }

    #[tokio::test]
    async fn test_disabled_layers_leave_response_alone() {
        let cfg = MiddlewareConfig {
            runtime: false,
            head: false,
            ..MiddlewareConfig::default()
        };
        let pipeline = Pipeline::new(&cfg);

        let req = Request::builder()
            .method(Method::HEAD)
            .uri("/nothing-here")
            .body(Bytes::new())
            .unwrap();

        let res = pipeline.dispatch(req, &test_router()).await;
        assert!(!res.headers().contains_key("X-Runtime"));
        // head layer disabled, 404 body kept even for HEAD
        assert!(!res.body().is_empty());
    }
}
