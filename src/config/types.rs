// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    #[serde(default)]
    pub middleware: MiddlewareConfig,
    #[serde(default)]
    pub routes: RoutesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            performance: PerformanceConfig::default(),
            http: HttpConfig::default(),
            middleware: MiddlewareConfig::default(),
            routes: RoutesConfig::default(),
        }
    }
}

/// Server configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            workers: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_log_file: Option<String>,
}

fn default_access_log_format() -> String {
    "combined".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            access_log: true,
            access_log_format: default_access_log_format(),
            access_log_file: None,
            error_log_file: None,
        }
    }
}

/// Performance configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u64>,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            keep_alive_timeout: 75,
            read_timeout: 30,
            write_timeout: 30,
            max_connections: None,
        }
    }
}

/// HTTP configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub max_body_size: u64,
    /// Content-Type for files with unrecognized extensions
    #[serde(default = "default_mime")]
    pub default_mime: String,
}

fn default_mime() -> String {
    "text/plain".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            server_name: "midway/0.3".to_string(),
            max_body_size: 10_485_760, // 10MB
            default_mime: default_mime(),
        }
    }
}

/// Middleware pipeline configuration. Every layer can be toggled on its
/// own; the defaults give the full stack minus request serialization.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MiddlewareConfig {
    /// X-Runtime response timing header
    #[serde(default = "default_true")]
    pub runtime: bool,
    /// Optional suffix for the timing header (X-Runtime-<name>)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_name: Option<String>,
    /// POST method rewriting via _method / X-HTTP-Method-Override
    #[serde(default = "default_true")]
    pub method_override: bool,
    /// Weak ETag tagging of buffered bodies
    #[serde(default = "default_true")]
    pub etag: bool,
    /// Cache-Control default when an entity tag was produced
    #[serde(default = "default_etag_cache_control", skip_serializing_if = "Option::is_none")]
    pub etag_cache_control: Option<String>,
    /// Cache-Control default when no entity tag was produced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag_no_cache_control: Option<String>,
    /// 304 rewriting of fresh GET/HEAD responses
    #[serde(default = "default_true")]
    pub conditional_get: bool,
    /// Content-Length from the buffered body
    #[serde(default = "default_true")]
    pub content_length: bool,
    /// Empty bodies for HEAD responses
    #[serde(default = "default_true")]
    pub head: bool,
    /// Serialize all request handling through one lock
    #[serde(default)]
    pub serialize_requests: bool,
}

const fn default_true() -> bool {
    true
}

fn default_etag_cache_control() -> Option<String> {
    Some("max-age=0, private, must-revalidate".to_string())
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            runtime: true,
            runtime_name: None,
            method_override: true,
            etag: true,
            etag_cache_control: default_etag_cache_control(),
            etag_no_cache_control: None,
            conditional_get: true,
            content_length: true,
            head: true,
            serialize_requests: false,
        }
    }
}

/// Routes configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RoutesConfig {
    pub custom_routes: HashMap<String, RouteHandler>,
    /// Extra headers set on every response the file service produces
    #[serde(default)]
    pub static_headers: HashMap<String, String>,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        let mut custom_routes = HashMap::new();
        custom_routes.insert(
            "/".to_string(),
            RouteHandler::Dir {
                path: "public".to_string(),
            },
        );
        Self {
            custom_routes,
            static_headers: HashMap::new(),
        }
    }
}

/// Route handler types
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RouteHandler {
    Dir { path: String },
    File { path: String },
    Redirect { target: String },
}
