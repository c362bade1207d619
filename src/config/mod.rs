// Configuration module entry point
// Loads, validates and exposes the server configuration

mod state;
mod types;

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::{Error, Result};

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, HealthConfig, LoggingConfig, PerformanceConfig, ServerConfig, StaticFilesConfig,
    UnhandledPolicy, DEFAULT_BLOCK_SIZE, DEFAULT_INDEX_FILE,
};

/// Default config file name (without extension)
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Command-line values that take precedence over file and environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Replaces the root of the first static file entry, or adds one
    pub root: Option<PathBuf>,
    pub port: Option<u16>,
}

impl Config {
    /// Load configuration from specified file path (extension optional)
    ///
    /// The file may be absent; environment variables prefixed with `STATICD`
    /// (e.g. `STATICD_SERVER__PORT=9000`) override file values.
    pub fn load_from(config_path: &str) -> Result<Self> {
        Self::load_with(config_path, &Overrides::default())
    }

    /// Load configuration, then apply command-line overrides before validating
    pub fn load_with(config_path: &str, overrides: &Overrides) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("STATICD")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.connection_timeout", 0)?
            .build()?;

        let mut cfg: Self = settings.try_deserialize()?;
        cfg.apply(overrides);
        cfg.validate()?;
        Ok(cfg)
    }

    fn apply(&mut self, overrides: &Overrides) {
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(root) = &overrides.root {
            match self.static_files.first_mut() {
                Some(entry) => entry.root.clone_from(root),
                None => self.static_files.push(StaticFilesConfig::new(root)),
            }
        }
    }

    /// Check values that deserialization alone cannot enforce
    pub fn validate(&self) -> Result<()> {
        if self.server.workers == Some(0) {
            return Err(Error::invalid_value(
                "server.workers",
                "must be greater than zero",
            ));
        }

        if self.static_files.is_empty() {
            return Err(Error::invalid_value(
                "static_files",
                "at least one static file root must be configured",
            ));
        }

        for (idx, entry) in self.static_files.iter().enumerate() {
            if entry.block_size == 0 {
                return Err(Error::invalid_value(
                    format!("static_files[{idx}].block_size"),
                    "must be greater than zero",
                ));
            }
            if entry.index_file.is_empty() {
                return Err(Error::invalid_value(
                    format!("static_files[{idx}].index_file"),
                    "must not be empty",
                ));
            }
        }

        self.get_socket_addr().map(|_| ())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse().map_err(|_| Error::InvalidAddress(addr))
    }
}
