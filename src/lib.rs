//! HTTP middleware toolkit and static file server built on hyper.
//!
//! The crate is organized around a concrete middleware pipeline over fully
//! buffered requests and responses:
//!
//! - [`middleware`] - the pipeline layers: method override, request
//!   timing, request serialization, ETag tagging, conditional GET,
//!   Content-Length buffering, HEAD handling
//! - [`handler`] - route dispatch and the static file service with
//!   byte-range support
//! - [`http`] - protocol helpers (range parsing, conditional requests,
//!   body digests, MIME lookup, response builders)
//! - [`server`] - the hyper/tokio server adapter: listener, connections,
//!   signals
//! - [`config`] / [`logger`] - layered configuration and access logging

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod middleware;
pub mod server;
