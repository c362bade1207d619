//! Static file serving
//!
//! One [`StaticFiles`] instance serves a single read-only root directory.
//! Per request it resolves the path, evaluates the conditional headers
//! against the file's metadata and writes the response. Requests it cannot
//! serve come back as [`HandleResult::Unhandled`] so the pipeline can defer
//! to the next handler.

pub mod precondition;
pub mod resolver;
pub mod resource;
pub mod sink;
pub mod writer;

use std::io;
use std::path::PathBuf;

use hyper::http::request::Parts;
use hyper::{Method, Response};
use tokio_util::sync::CancellationToken;

use crate::config::StaticFilesConfig;
use crate::error::{Error, Result};
use crate::http::{self, mime, ConditionalHeaders, ResponseBody};
use crate::logger;

pub use precondition::{evaluate, PreconditionOutcome};
pub use resolver::{resolve, Resolution, ResolvedPath, UnhandledReason};
pub use resource::Resource;
pub use sink::HyperSink;
pub use writer::{respond, stream_body, ResponseSink, Streamed, WriteOptions};

#[derive(Debug)]
pub enum HandleResult {
    Handled(Response<ResponseBody>),
    Unhandled(UnhandledReason),
}

#[derive(Debug)]
pub struct StaticFiles {
    config: StaticFilesConfig,
}

impl StaticFiles {
    /// Build a handler; fails when the root directory is missing
    pub fn new(mut config: StaticFilesConfig) -> Result<Self> {
        let root = std::fs::canonicalize(&config.root).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::RootNotFound(config.root.clone()),
            _ => Error::Io(e),
        })?;
        if !root.is_dir() {
            return Err(Error::RootNotDirectory(root));
        }
        if config.block_size == 0 {
            return Err(Error::invalid_value("block_size", "must be greater than zero"));
        }

        config.root = root;
        Ok(Self { config })
    }

    /// Effective configuration, with the root made absolute
    pub const fn config(&self) -> &StaticFilesConfig {
        &self.config
    }

    pub fn root(&self) -> &PathBuf {
        &self.config.root
    }

    /// Serve one request
    ///
    /// The returned response carries the head only; the body, if any, is
    /// streamed by a background task that stops when the client goes away.
    pub async fn handle(&self, request: &Parts) -> HandleResult {
        let path = request.uri.path();

        let resolved = match resolver::resolve(path, &self.config).await {
            Resolution::Resolved(resolved) => resolved,
            Resolution::Unhandled(reason) => {
                logger::log_unhandled(path, &reason);
                return HandleResult::Unhandled(reason);
            }
        };

        let resource = match Resource::from_metadata(resolved.path, &resolved.metadata) {
            Ok(resource) => resource,
            Err(e) => {
                logger::log_error(&format!("Cannot read modification time for {path}: {e}"));
                return HandleResult::Handled(http::build_500_response());
            }
        };

        let headers = ConditionalHeaders::from_headers(&request.headers);
        let outcome = precondition::evaluate(&headers, &resource.etag, resource.last_modified);
        if !headers.is_empty() {
            logger::log_precondition(path, &outcome);
        }

        let options = WriteOptions {
            block_size: self.config.block_size,
            include_body: request.method != Method::HEAD,
        };
        HandleResult::Handled(send_response(outcome, resource, options).await)
    }
}

/// Run the writer in its own task and wait for the response head
async fn send_response(
    outcome: PreconditionOutcome,
    resource: Resource,
    options: WriteOptions,
) -> Response<ResponseBody> {
    let cancel = CancellationToken::new();
    let (mut sink, pending) = HyperSink::new(cancel.clone());

    tokio::spawn(async move {
        let content_type = mime::content_type_for(&resource.path);
        let result =
            writer::respond(outcome, &resource, content_type, &mut sink, options, &cancel).await;

        if let Err(e) = sink.finish(result).await {
            if cancel.is_cancelled() || e.kind() == io::ErrorKind::BrokenPipe {
                logger::log_stream_aborted(&resource.path, &e);
            } else {
                logger::log_error(&format!(
                    "Failed to send '{}': {e}",
                    resource.path.display()
                ));
            }
        }
    });

    // The writer dropped the head: it failed before anything was sent
    pending.await.unwrap_or_else(|_| http::build_500_response())
}
