// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    #[serde(default)]
    pub health: HealthConfig,
    /// Static file handlers, consulted in order
    #[serde(default)]
    pub static_files: Vec<StaticFilesConfig>,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
}

/// Connection-level settings owned by the transport
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    /// Seconds a connection may stay open; 0 disables the limit
    pub connection_timeout: u64,
}

/// Health check configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HealthConfig {
    /// Enable health check endpoints
    #[serde(default = "default_health_enabled")]
    pub enabled: bool,
    /// Liveness probe path (default: /healthz)
    #[serde(default = "default_healthz_path")]
    pub liveness_path: String,
    /// Readiness probe path (default: /readyz)
    #[serde(default = "default_readyz_path")]
    pub readiness_path: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_health_enabled() -> bool {
    true
}

#[allow(clippy::missing_const_for_fn)]
fn default_healthz_path() -> String {
    "/healthz".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_readyz_path() -> String {
    "/readyz".to_string()
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: default_health_enabled(),
            liveness_path: default_healthz_path(),
            readiness_path: default_readyz_path(),
        }
    }
}

/// What the pipeline does when a static file handler cannot serve a request
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnhandledPolicy {
    /// Defer to the next handler in the chain
    #[default]
    Next,
    /// Answer 404 immediately
    NotFound,
}

/// One static file handler: a single read-only root directory
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct StaticFilesConfig {
    pub root: PathBuf,
    #[serde(default = "default_index_file")]
    pub index_file: String,
    /// Extensions (dot-prefixed) that are never served
    #[serde(default)]
    pub ignored_extensions: Vec<String>,
    /// Streaming chunk size in bytes
    #[serde(default = "default_block_size")]
    pub block_size: usize,
    #[serde(default)]
    pub on_unhandled: UnhandledPolicy,
}

pub const DEFAULT_INDEX_FILE: &str = "index.html";
pub const DEFAULT_BLOCK_SIZE: usize = 65536;

#[allow(clippy::missing_const_for_fn)]
fn default_index_file() -> String {
    DEFAULT_INDEX_FILE.to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_block_size() -> usize {
    DEFAULT_BLOCK_SIZE
}

impl StaticFilesConfig {
    /// Configuration for `root` with every other setting at its default
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index_file: default_index_file(),
            ignored_extensions: Vec::new(),
            block_size: default_block_size(),
            on_unhandled: UnhandledPolicy::default(),
        }
    }

    /// Add an extension to the ignore list; a missing leading dot is added
    #[must_use]
    pub fn ignore_extension(mut self, extension: &str) -> Self {
        self.ignored_extensions.push(normalize_extension(extension));
        self
    }

    /// Whether files with `extension` (dot-prefixed, as returned for a path)
    /// must not be served
    pub fn is_ignored(&self, extension: &str) -> bool {
        self.ignored_extensions
            .iter()
            .any(|ignored| normalize_extension(ignored).eq_ignore_ascii_case(extension))
    }
}

fn normalize_extension(extension: &str) -> String {
    if extension.starts_with('.') {
        extension.to_string()
    } else {
        format!(".{extension}")
    }
}
