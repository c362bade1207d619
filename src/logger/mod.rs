//! Logger module
//!
//! Thin helpers over `tracing` so call sites stay one line:
//! - Server lifecycle logging
//! - Access logging (switchable via `logging.access_log`)
//! - Static file decisions at debug level
//! - Error and warning logging

use std::net::SocketAddr;
use std::time::Duration;

use hyper::{Method, StatusCode, Uri};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, LoggingConfig};
use crate::error::Result;

/// Install the global subscriber
///
/// `RUST_LOG` wins over the configured level. Should be called once at
/// application startup.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("staticd={}", config.level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;
    Ok(())
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!("Listening on: http://{addr}");
    tracing::info!("Log level: {}", config.logging.level);
    if let Some(workers) = config.server.workers {
        tracing::info!("Worker threads: {workers}");
    }
    for (idx, entry) in config.static_files.iter().enumerate() {
        tracing::info!(
            root = %entry.root.display(),
            index_file = %entry.index_file,
            block_size = entry.block_size,
            on_unhandled = ?entry.on_unhandled,
            "Static files [{idx}]"
        );
    }
}

pub fn log_shutdown() {
    tracing::info!("Shutdown signal received, no longer accepting connections");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!("[Connection] Accepted from: {peer_addr}");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::warn!("Failed to serve connection: {err:?}");
}

/// One line per answered request
pub fn log_access(method: &Method, uri: &Uri, status: StatusCode, elapsed: Duration) {
    tracing::info!(
        target: "staticd::access",
        "{method} {uri} {} {}us",
        status.as_u16(),
        elapsed.as_micros()
    );
}

pub fn log_unhandled(path: &str, reason: &impl std::fmt::Display) {
    tracing::debug!("Not handled: {path} ({reason})");
}

pub fn log_precondition(path: &str, outcome: &impl std::fmt::Debug) {
    tracing::debug!("Precondition for {path}: {outcome:?}");
}

pub fn log_stream_finished(path: &std::path::Path, bytes: u64, chunks: u64) {
    tracing::debug!("Streamed {} ({bytes} bytes in {chunks} chunks)", path.display());
}

pub fn log_stream_cancelled(path: &std::path::Path, bytes: u64) {
    tracing::debug!(
        "Stream of {} cancelled by client after {bytes} bytes",
        path.display()
    );
}

pub fn log_stream_aborted(path: &std::path::Path, err: &std::io::Error) {
    tracing::debug!("Stream of {} aborted: {err}", path.display());
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}
