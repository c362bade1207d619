//! HTTP date module
//!
//! The one date representation used on the wire, e.g.
//! `Sun, 06 Nov 1994 08:49:37 GMT`. Parsing is strict: any other shape
//! (RFC 850, asctime, numeric offsets, extra whitespace) yields `None`.

use chrono::{DateTime, NaiveDateTime, Utc};

/// `chrono` pattern for the fixed-length HTTP date
pub const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Format a timestamp for `Last-Modified` and friends
pub fn format_http_date(time: &DateTime<Utc>) -> String {
    time.format(HTTP_DATE_FORMAT).to_string()
}

/// Parse a header value in the fixed HTTP date format
///
/// Returns `None` for anything that is not exactly that format.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let parsed = NaiveDateTime::parse_from_str(value, HTTP_DATE_FORMAT)
        .ok()?
        .and_utc();
    // chrono is lenient about padding, whitespace and case; only the
    // canonical spelling counts
    (format_http_date(&parsed) == value).then_some(parsed)
}
