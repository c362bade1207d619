// Application state module
// Holds the validated configuration and one handler per static root

use super::types::Config;
use crate::error::Result;
use crate::static_files::StaticFiles;

/// Application state, shared read-only by every connection
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    /// Same order as `config.static_files`; tried first to last
    pub static_files: Vec<StaticFiles>,
}

impl AppState {
    /// Create `AppState`, checking that every root directory exists
    pub fn new(config: Config) -> Result<Self> {
        let static_files = config
            .static_files
            .iter()
            .cloned()
            .map(StaticFiles::new)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            config,
            static_files,
        })
    }

    pub const fn access_log(&self) -> bool {
        self.config.logging.access_log
    }
}
