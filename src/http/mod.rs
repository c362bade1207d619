//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from the
//! static file logic: wire dates, conditional headers, content types, bodies
//! and canned responses.

pub mod body;
pub mod date;
pub mod headers;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use body::ResponseBody;
pub use headers::{ConditionalHeaders, EntityTag};
pub use response::{
    build_404_response, build_405_response, build_500_response, build_health_response,
    build_options_response, build_status_response,
};
