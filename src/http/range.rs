//! HTTP Range request parsing module
//!
//! Range header parsing for partial-content responses, compliant with RFC 7233.

/// A single parsed byte range with inclusive bounds.
///
/// Invariant: `start <= end`, and `end` is always below the file size the
/// range was parsed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// First byte position
    pub start: u64,
    /// Last byte position (inclusive)
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes covered by the range
    #[inline]
    pub const fn len(self) -> u64 {
        self.end - self.start + 1
    }

    /// Content-Range header value for a 206 response
    pub fn to_content_range(self, file_size: u64) -> String {
        format!("bytes {}-{}/{file_size}", self.start, self.end)
    }
}

/// Range header parse result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOutcome {
    /// Valid single range, clamped to the file size
    Single(ByteRange),
    /// Range understood but not satisfiable - should return 416
    Unsatisfiable,
    /// No Range header, wrong unit, multiple ranges, or malformed
    /// (ignore, serve full content)
    Ignored,
}

/// Parse an HTTP Range header against a known file size.
///
/// Single ranges with the `bytes` unit only. Multi-range requests are
/// deliberately ignored and answered with the full representation.
///
/// Supported formats:
/// - `bytes=start-end` - Specific range
/// - `bytes=start-` - From start to end of file
/// - `bytes=-suffix` - Last suffix bytes
///
/// # Examples
/// ```
/// use midway::http::range::{parse_range, RangeOutcome};
///
/// // Fixed range
/// let outcome = parse_range(Some("bytes=0-99"), 1000);
/// assert!(matches!(outcome, RangeOutcome::Single(_)));
///
/// // No Range header
/// let outcome = parse_range(None, 1000);
/// assert!(matches!(outcome, RangeOutcome::Ignored));
///
/// // Start past the end of the file
/// let outcome = parse_range(Some("bytes=2000-"), 1000);
/// assert!(matches!(outcome, RangeOutcome::Unsatisfiable));
/// ```
pub fn parse_range(range_header: Option<&str>, file_size: u64) -> RangeOutcome {
    let Some(header) = range_header else {
        return RangeOutcome::Ignored;
    };

    let Some(spec) = header.strip_prefix("bytes=") else {
        return RangeOutcome::Ignored; // Not bytes unit, ignore
    };

    // Single range only; multi-range answers would need multipart bodies
    if spec.contains(',') {
        return RangeOutcome::Ignored;
    }

    let Some((start_str, end_str)) = spec.split_once('-') else {
        return RangeOutcome::Ignored;
    };
    let (start_str, end_str) = (start_str.trim(), end_str.trim());

    // Suffix range: "-500" means last 500 bytes
    if start_str.is_empty() {
        return parse_suffix_range(end_str, file_size);
    }

    // Standard range: "start-" or "start-end"
    parse_standard_range(start_str, end_str, file_size)
}

/// Parse suffix range (e.g., "-500")
fn parse_suffix_range(suffix_str: &str, file_size: u64) -> RangeOutcome {
    let Ok(suffix) = suffix_str.parse::<u64>() else {
        return RangeOutcome::Ignored;
    };

    if suffix == 0 || file_size == 0 {
        return RangeOutcome::Unsatisfiable;
    }

    // Suffix larger than the file is valid, the whole file is the range
    let start = file_size.saturating_sub(suffix);
    RangeOutcome::Single(ByteRange {
        start,
        end: file_size - 1,
    })
}

/// Parse standard range (e.g., "0-99" or "100-")
fn parse_standard_range(start_str: &str, end_str: &str, file_size: u64) -> RangeOutcome {
    let Ok(start) = start_str.parse::<u64>() else {
        return RangeOutcome::Ignored;
    };

    // Start beyond the last byte is not satisfiable
    if start >= file_size {
        return RangeOutcome::Unsatisfiable;
    }

    let end = if end_str.is_empty() {
        file_size - 1 // Open-ended range
    } else {
        let Ok(e) = end_str.parse::<u64>() else {
            return RangeOutcome::Ignored;
        };
        if start > e {
            return RangeOutcome::Unsatisfiable;
        }
        // Clamp end to the last byte
        e.min(file_size - 1)
    };

    RangeOutcome::Single(ByteRange { start, end })
}
