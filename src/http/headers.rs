//! Conditional request header access
//!
//! Turns the raw `If-*` request headers into a [`ConditionalHeaders`]
//! snapshot. Entity tags come back unquoted, dates come back parsed;
//! anything unreadable is reported as absent.

use chrono::{DateTime, Utc};
use hyper::header::{
    HeaderMap, HeaderName, IF_MATCH, IF_MODIFIED_SINCE, IF_NONE_MATCH, IF_UNMODIFIED_SINCE,
};

use super::date::parse_http_date;

/// One member of an `If-Match` / `If-None-Match` list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityTag {
    /// `*`, matches any current representation
    Wildcard,
    /// Opaque tag with the surrounding quotes removed
    Opaque(String),
}

impl EntityTag {
    /// Ordinal, case-sensitive comparison against an unquoted tag
    pub fn matches(&self, etag: &str) -> bool {
        match self {
            Self::Wildcard => true,
            Self::Opaque(tag) => tag == etag,
        }
    }
}

impl From<&str> for EntityTag {
    fn from(segment: &str) -> Self {
        let unquoted = strip_quotes(segment);
        if unquoted == "*" {
            Self::Wildcard
        } else {
            Self::Opaque(unquoted.to_string())
        }
    }
}

/// Snapshot of the four precondition headers of one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionalHeaders {
    pub if_match: Option<Vec<EntityTag>>,
    pub if_none_match: Option<Vec<EntityTag>>,
    pub if_modified_since: Option<DateTime<Utc>>,
    pub if_unmodified_since: Option<DateTime<Utc>>,
}

impl ConditionalHeaders {
    /// Extract the conditional headers from a request header map
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            if_match: tag_list(headers, &IF_MATCH),
            if_none_match: tag_list(headers, &IF_NONE_MATCH),
            if_modified_since: date(headers, &IF_MODIFIED_SINCE),
            if_unmodified_since: date(headers, &IF_UNMODIFIED_SINCE),
        }
    }

    /// True when none of the four headers is usable
    pub const fn is_empty(&self) -> bool {
        self.if_match.is_none()
            && self.if_none_match.is_none()
            && self.if_modified_since.is_none()
            && self.if_unmodified_since.is_none()
    }
}

/// Collect every comma separated member over all lines of `name`
fn tag_list(headers: &HeaderMap, name: &HeaderName) -> Option<Vec<EntityTag>> {
    let mut values = headers.get_all(name).iter().peekable();
    values.peek()?;

    let mut tags = Vec::new();
    for value in values {
        let Ok(text) = value.to_str() else {
            return None;
        };
        tags.extend(split_comma_separated(text).map(EntityTag::from));
    }
    Some(tags)
}

fn date(headers: &HeaderMap, name: &HeaderName) -> Option<DateTime<Utc>> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_http_date)
}

/// Split on commas that are not inside a quoted string, dropping empty members
fn split_comma_separated(value: &str) -> impl Iterator<Item = &str> {
    let mut segments = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (idx, ch) in value.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                segments.push(&value[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    segments.push(&value[start..]);

    segments
        .into_iter()
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
}

fn strip_quotes(segment: &str) -> &str {
    segment
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(segment)
}
