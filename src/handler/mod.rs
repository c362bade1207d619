//! Request handler module
//!
//! Responsible for request routing dispatch. Static file handlers are
//! consulted in order; each may serve the request or pass it on.

pub mod router;

// Re-export main entry point
pub use router::handle_request;
