// Application state module
// Read-only state shared by every connection

use super::types::Config;
use crate::handler::resolver::{LocalPrefix, PathResolver};
use crate::http::CachePolicy;
use crate::logger::AccessLogFormat;
use std::io;

/// Application state
pub struct AppState {
    pub config: Config,
    pub resolver: PathResolver,
    pub cache: CachePolicy,
    /// Access log format, `None` when access logging is off
    pub access_log: Option<AccessLogFormat>,
}

impl AppState {
    /// Fails if the media base directory is missing or not a directory
    pub fn new(config: Config) -> io::Result<Self> {
        let local_prefix = config
            .media
            .local_prefix
            .as_deref()
            .and_then(|prefix| LocalPrefix::new(config.media.local_hosts.clone(), prefix));
        let resolver = PathResolver::new(&config.media.base_dir, local_prefix)?;
        let cache = CachePolicy::public(config.media.max_age);
        let access_log = config
            .logging
            .access_log
            .then_some(config.logging.access_log_format);

        Ok(Self {
            config,
            resolver,
            cache,
            access_log,
        })
    }
}
