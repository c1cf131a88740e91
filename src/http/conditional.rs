//! Conditional request evaluation module
//!
//! Validator comparison for `If-None-Match` / `If-Modified-Since`, plus
//! HTTP date parsing and formatting (RFC 7231 IMF-fixdate, with the
//! obsolete RFC 2822 forms accepted on input).

use chrono::{DateTime, FixedOffset, Utc};
use std::time::SystemTime;

/// Shortest possible valid HTTP date is the obsolete `1 Nov 97 09:55 A`.
/// Anything shorter is rejected without attempting a parse; the most common
/// short value by far is the empty string.
const MIN_HTTP_DATE_LEN: usize = 16;

/// Check whether a client's `If-None-Match` value matches the server `ETag`.
///
/// Supports a single entity tag, a comma-separated list, and the `*`
/// wildcard.
///
/// # Examples
/// ```
/// use midway::http::conditional::etag_matches;
///
/// assert!(etag_matches(r#"W/"abc""#, r#"W/"abc""#));
/// assert!(etag_matches(r#""xyz", "abc""#, r#""abc""#));
/// assert!(etag_matches("*", r#""anything""#));
/// assert!(!etag_matches(r#""other""#, r#""abc""#));
/// ```
pub fn etag_matches(if_none_match: &str, etag: &str) -> bool {
    if_none_match
        .split(',')
        .any(|candidate| candidate.trim() == etag || candidate.trim() == "*")
}

/// Parse an HTTP date header value.
///
/// Accepts IMF-fixdate (`Sun, 06 Nov 1994 08:49:37 GMT`) and the obsolete
/// RFC 2822 forms chrono understands. Returns `None` for anything
/// malformed or too short to be a date.
pub fn parse_http_date(value: &str) -> Option<DateTime<FixedOffset>> {
    if value.len() < MIN_HTTP_DATE_LEN {
        return None;
    }
    DateTime::parse_from_rfc2822(value).ok()
}

/// True when `if_modified_since` is at or after `last_modified`.
///
/// Both values are parsed as HTTP dates; an unparseable value on either
/// side means the resource counts as modified.
pub fn not_modified_since(if_modified_since: &str, last_modified: &str) -> bool {
    match (parse_http_date(if_modified_since), parse_http_date(last_modified)) {
        (Some(since), Some(modified)) => since >= modified,
        _ => false,
    }
}

/// Format a timestamp as an IMF-fixdate string for `Last-Modified`.
pub fn http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn test_etag_matches() {
        let etag = "\"abc123\"";
        assert!(etag_matches("\"abc123\"", etag));
        assert!(etag_matches("\"xyz\", \"abc123\"", etag));
        assert!(etag_matches("*", etag));
        assert!(!etag_matches("\"different\"", etag));
        assert!(!etag_matches("", etag));
    }

    #[test]
    fn test_parse_http_date() {
        let parsed = parse_http_date("Sun, 06 Nov 1994 08:49:37 GMT");
        assert!(parsed.is_some());

        // Too short to be a date, rejected without a parse attempt
        assert!(parse_http_date("").is_none());
        assert!(parse_http_date("0").is_none());
        assert!(parse_http_date("not a date at all").is_none());
    }

    #[test]
    fn test_not_modified_since() {
        let earlier = "Sun, 06 Nov 1994 08:49:37 GMT";
        let later = "Mon, 07 Nov 1994 08:49:37 GMT";

        assert!(not_modified_since(later, earlier));
        assert!(not_modified_since(earlier, earlier));
        assert!(!not_modified_since(earlier, later));

        // Unparseable on either side means modified
        assert!(!not_modified_since("garbage but long enough", earlier));
        assert!(!not_modified_since(later, "garbage but long enough"));
    }

    #[test]
    fn test_http_date_round_trip() {
        let time = UNIX_EPOCH + Duration::from_secs(784_111_777);
        let formatted = http_date(time);
        assert_eq!(formatted, "Sun, 06 Nov 1994 08:49:37 GMT");

        let parsed = parse_http_date(&formatted).unwrap();
        assert_eq!(parsed.timestamp(), 784_111_777);
    }
}
