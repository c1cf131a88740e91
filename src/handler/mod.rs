//! Request handler module
//!
//! The inner end of the pipeline: route matching and the static file
//! service.

pub mod router;
pub mod static_files;

pub use router::{RequestContext, Router};
pub use static_files::FileService;
