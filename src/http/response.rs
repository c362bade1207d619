//! HTTP response building module
//!
//! Provides builders for the status responses the server emits outside the
//! file streaming path.

use hyper::header::{HeaderValue, ALLOW, CONTENT_TYPE};
use hyper::{Response, StatusCode};

use super::body::{self, ResponseBody};

const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Response carrying only a status code
pub fn build_status_response(status: StatusCode) -> Response<ResponseBody> {
    let mut response = Response::new(body::empty());
    *response.status_mut() = status;
    response
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<ResponseBody> {
    build_text_response(StatusCode::NOT_FOUND, "404 Not Found")
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<ResponseBody> {
    let mut response = build_text_response(StatusCode::METHOD_NOT_ALLOWED, "405 Method Not Allowed");
    response
        .headers_mut()
        .insert(ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
    response
}

/// Build 500 Internal Server Error response
pub fn build_500_response() -> Response<ResponseBody> {
    build_text_response(StatusCode::INTERNAL_SERVER_ERROR, "500 Internal Server Error")
}

/// Build OPTIONS response
pub fn build_options_response() -> Response<ResponseBody> {
    let mut response = build_status_response(StatusCode::NO_CONTENT);
    response
        .headers_mut()
        .insert(ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
    response
}

/// Build health probe response
pub fn build_health_response(status: &'static str) -> Response<ResponseBody> {
    build_text_response(StatusCode::OK, status)
}

fn build_text_response(status: StatusCode, text: &'static str) -> Response<ResponseBody> {
    let mut response = Response::new(body::full(text));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(build_404_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(build_500_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            build_status_response(StatusCode::NOT_MODIFIED).status(),
            StatusCode::NOT_MODIFIED
        );
    }

    #[test]
    fn test_allow_header() {
        let response = build_405_response();
        assert_eq!(response.headers()[ALLOW], ALLOWED_METHODS);
        let response = build_options_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers()[ALLOW], ALLOWED_METHODS);
    }
}
