// Application state module
// Configuration plus the structures derived from it at startup

use std::sync::atomic::AtomicBool;

use super::types::Config;
use crate::handler::Router;
use crate::middleware::Pipeline;

/// Application state shared by every connection.
pub struct AppState {
    pub config: Config,
    pub router: Router,
    pub pipeline: Pipeline,

    // Cached config value for fast access without locks
    pub cached_access_log: AtomicBool,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let router = Router::new(&config.routes, &config.http);
        let pipeline = Pipeline::new(&config.middleware);
        let cached_access_log = AtomicBool::new(config.logging.access_log);

        Self {
            config,
            router,
            pipeline,
            cached_access_log,
        }
    }
}
