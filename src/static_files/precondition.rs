//! Precondition evaluation
//!
//! Each of the four conditional headers is judged on its own, then the
//! verdicts are reduced with `max`. The ordering of [`PreconditionOutcome`]
//! therefore encodes priority: a failed precondition beats everything,
//! "should process" beats "not modified", and an absent header contributes
//! nothing.

use chrono::{DateTime, Utc};

use crate::http::headers::{ConditionalHeaders, EntityTag};

/// Ordered lowest to highest; do not reorder the variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum PreconditionOutcome {
    /// No usable conditional header; served like `ShouldProcess`
    #[default]
    Unspecified,
    NotModified,
    ShouldProcess,
    PreconditionFailed,
}

/// Combine all conditional headers into one outcome
pub fn evaluate(
    headers: &ConditionalHeaders,
    etag: &str,
    last_modified: DateTime<Utc>,
) -> PreconditionOutcome {
    [
        if_match(headers.if_match.as_deref(), etag),
        if_none_match(headers.if_none_match.as_deref(), etag),
        if_modified_since(headers.if_modified_since, last_modified),
        if_unmodified_since(headers.if_unmodified_since, last_modified),
    ]
    .into_iter()
    .max()
    .unwrap_or_default()
}

fn any_matches(tags: &[EntityTag], etag: &str) -> bool {
    tags.iter().any(|tag| tag.matches(etag))
}

fn if_match(tags: Option<&[EntityTag]>, etag: &str) -> PreconditionOutcome {
    match tags {
        None => PreconditionOutcome::Unspecified,
        Some(tags) if any_matches(tags, etag) => PreconditionOutcome::ShouldProcess,
        Some(_) => PreconditionOutcome::PreconditionFailed,
    }
}

fn if_none_match(tags: Option<&[EntityTag]>, etag: &str) -> PreconditionOutcome {
    match tags {
        None => PreconditionOutcome::Unspecified,
        Some(tags) if any_matches(tags, etag) => PreconditionOutcome::NotModified,
        Some(_) => PreconditionOutcome::ShouldProcess,
    }
}

fn if_modified_since(
    since: Option<DateTime<Utc>>,
    last_modified: DateTime<Utc>,
) -> PreconditionOutcome {
    match since {
        None => PreconditionOutcome::Unspecified,
        Some(since) if since < last_modified => PreconditionOutcome::ShouldProcess,
        Some(_) => PreconditionOutcome::NotModified,
    }
}

fn if_unmodified_since(
    since: Option<DateTime<Utc>>,
    last_modified: DateTime<Utc>,
) -> PreconditionOutcome {
    match since {
        None => PreconditionOutcome::Unspecified,
        Some(since) if since >= last_modified => PreconditionOutcome::ShouldProcess,
        Some(_) => PreconditionOutcome::PreconditionFailed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    use super::PreconditionOutcome::{NotModified, PreconditionFailed, ShouldProcess, Unspecified};

    const ETAG: &str = "xyz";

    fn modified() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn tags(list: &[&str]) -> Option<Vec<EntityTag>> {
        Some(list.iter().map(|t| EntityTag::from(*t)).collect())
    }

    fn eval(headers: &ConditionalHeaders) -> PreconditionOutcome {
        evaluate(headers, ETAG, modified())
    }

    #[test]
    fn test_outcome_ordering() {
        assert!(Unspecified < NotModified);
        assert!(NotModified < ShouldProcess);
        assert!(ShouldProcess < PreconditionFailed);
    }

    #[test]
    fn test_no_headers_unspecified() {
        assert_eq!(eval(&ConditionalHeaders::default()), Unspecified);
    }

    #[test]
    fn test_if_match() {
        let mut headers = ConditionalHeaders {
            if_match: tags(&["abc"]),
            ..Default::default()
        };
        assert_eq!(eval(&headers), PreconditionFailed);

        headers.if_match = tags(&["abc", "xyz"]);
        assert_eq!(eval(&headers), ShouldProcess);

        headers.if_match = tags(&["*"]);
        assert_eq!(eval(&headers), ShouldProcess);

        headers.if_match = tags(&["XYZ"]);
        assert_eq!(eval(&headers), PreconditionFailed);

        headers.if_match = tags(&[]);
        assert_eq!(eval(&headers), PreconditionFailed);
    }

    #[test]
    fn test_if_none_match() {
        let mut headers = ConditionalHeaders {
            if_none_match: tags(&["*"]),
            ..Default::default()
        };
        assert_eq!(eval(&headers), NotModified);
        assert_eq!(evaluate(&headers, "anything-at-all", modified()), NotModified);

        headers.if_none_match = tags(&["xyz"]);
        assert_eq!(eval(&headers), NotModified);

        headers.if_none_match = tags(&["abc"]);
        assert_eq!(eval(&headers), ShouldProcess);
    }

    #[test]
    fn test_if_modified_since_is_strict() {
        let mut headers = ConditionalHeaders {
            if_modified_since: Some(modified()),
            ..Default::default()
        };
        assert_eq!(eval(&headers), NotModified);

        headers.if_modified_since = Some(modified() + Duration::seconds(1));
        assert_eq!(eval(&headers), NotModified);

        headers.if_modified_since = Some(modified() - Duration::seconds(1));
        assert_eq!(eval(&headers), ShouldProcess);
    }

    #[test]
    fn test_if_unmodified_since_inclusive() {
        let mut headers = ConditionalHeaders {
            if_unmodified_since: Some(modified()),
            ..Default::default()
        };
        assert_eq!(eval(&headers), ShouldProcess);

        headers.if_unmodified_since = Some(modified() + Duration::seconds(1));
        assert_eq!(eval(&headers), ShouldProcess);

        headers.if_unmodified_since = Some(modified() - Duration::seconds(1));
        assert_eq!(eval(&headers), PreconditionFailed);
    }

    #[test]
    fn test_failed_unmodified_since_overrides_passing_if_match() {
        let headers = ConditionalHeaders {
            if_match: tags(&["xyz"]),
            if_unmodified_since: Some(modified() - Duration::seconds(60)),
            ..Default::default()
        };
        assert_eq!(eval(&headers), PreconditionFailed);
    }

    #[test]
    fn test_should_process_beats_not_modified() {
        // Tag matches but the date says modified
        let headers = ConditionalHeaders {
            if_none_match: tags(&["xyz"]),
            if_modified_since: Some(modified() - Duration::days(1)),
            ..Default::default()
        };
        assert_eq!(eval(&headers), ShouldProcess);
    }

    #[test]
    fn test_failure_beats_not_modified() {
        let headers = ConditionalHeaders {
            if_match: tags(&["abc"]),
            if_none_match: tags(&["*"]),
            ..Default::default()
        };
        assert_eq!(eval(&headers), PreconditionFailed);
    }
}
