//! staticd: a static file server that honours HTTP conditional requests
//!
//! Requests pass through an ordered chain of static file handlers. Each one
//! maps the request path onto a file below its root, evaluates `If-Match`,
//! `If-None-Match`, `If-Modified-Since` and `If-Unmodified-Since`, and then
//! answers 200, 304 or 412, streaming the body in fixed-size chunks that
//! stop as soon as the client goes away.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
pub mod static_files;

pub use error::{Error, Result};
