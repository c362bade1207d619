//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, health
//! probes, then the static file chain in configuration order.

use crate::config::{AppState, UnhandledPolicy};
use crate::http::{self, ResponseBody};
use crate::logger;
use crate::static_files::HandleResult;
use hyper::http::request::Parts;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
///
/// Request bodies are never read, so any body type is accepted.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<ResponseBody>, Infallible> {
    let started = Instant::now();
    let (parts, _) = req.into_parts();

    let response = route_request(&parts, &state).await;

    if state.access_log() {
        logger::log_access(&parts.method, &parts.uri, response.status(), started.elapsed());
    }
    Ok(response)
}

async fn route_request(parts: &Parts, state: &AppState) -> Response<ResponseBody> {
    // 1. Check HTTP method
    if let Some(resp) = check_http_method(&parts.method) {
        return resp;
    }

    // 2. Health check endpoints
    let health = &state.config.health;
    if health.enabled
        && (parts.uri.path() == health.liveness_path || parts.uri.path() == health.readiness_path)
    {
        return http::build_health_response("ok");
    }

    // 3. Static file handlers, first to last
    for handler in &state.static_files {
        match handler.handle(parts).await {
            HandleResult::Handled(resp) => return resp,
            HandleResult::Unhandled(_) => {
                if handler.config().on_unhandled == UnhandledPolicy::NotFound {
                    return http::build_404_response();
                }
            }
        }
    }

    // 4. End of chain
    http::build_404_response()
}

/// Only GET and HEAD reach the handlers; OPTIONS is answered directly
fn check_http_method(method: &Method) -> Option<Response<ResponseBody>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response()),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}
