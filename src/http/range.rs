//! HTTP Range request parsing module
//!
//! Single `bytes=<start>-<end>` ranges for media seeking. Anything that does
//! not look like that form is ignored and the whole file is served.

/// Inclusive byte span inside a file, always within `0..file_size`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes covered by the range
    #[inline]
    pub const fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Value for the `Content-Range` header of a 206 response
    pub fn content_range(&self, file_size: u64) -> String {
        format!("bytes {}-{}/{file_size}", self.start, self.end)
    }
}

/// Range header parse result
#[derive(Debug, PartialEq, Eq)]
pub enum RangeParseResult {
    /// Satisfiable single range
    Valid(ByteRange),
    /// Out-of-bounds or multi-range request, answered with 416
    NotSatisfiable,
    /// No Range header or not in the supported form (serve full content)
    None,
}

/// Parse HTTP Range header against the current file size
///
/// Only `bytes=start-` and `bytes=start-end` are recognised. Suffix ranges,
/// other units and non-numeric bounds fall back to `None`. Multiple ranges
/// are refused with `NotSatisfiable` since multipart bodies are not produced.
/// An end past the last byte is clamped.
///
/// # Examples
/// ```
/// use mediasrv::http::range::{parse_range_header, ByteRange, RangeParseResult};
///
/// let result = parse_range_header(Some("bytes=0-99"), 1000);
/// assert_eq!(result, RangeParseResult::Valid(ByteRange { start: 0, end: 99 }));
///
/// let result = parse_range_header(Some("bytes=1000-"), 1000);
/// assert_eq!(result, RangeParseResult::NotSatisfiable);
///
/// let result = parse_range_header(None, 1000);
/// assert_eq!(result, RangeParseResult::None);
/// ```
pub fn parse_range_header(range_header: Option<&str>, file_size: u64) -> RangeParseResult {
    let Some(header) = range_header else {
        return RangeParseResult::None;
    };

    let Some(ranges) = header.trim().strip_prefix("bytes=") else {
        return RangeParseResult::None;
    };

    if ranges.contains(',') {
        return RangeParseResult::NotSatisfiable;
    }

    let Some((start_str, end_str)) = ranges.split_once('-') else {
        return RangeParseResult::None;
    };
    let (start_str, end_str) = (start_str.trim(), end_str.trim());

    if !is_digits(start_str) || !(end_str.is_empty() || is_digits(end_str)) {
        return RangeParseResult::None;
    }

    // Digits that overflow u64 are necessarily past the end of the file
    let Ok(start) = start_str.parse::<u64>() else {
        return RangeParseResult::NotSatisfiable;
    };

    let Some(last_byte) = file_size.checked_sub(1) else {
        return RangeParseResult::NotSatisfiable;
    };

    if start > last_byte {
        return RangeParseResult::NotSatisfiable;
    }

    let end = if end_str.is_empty() {
        last_byte
    } else {
        end_str.parse::<u64>().map_or(last_byte, |e| e.min(last_byte))
    };

    if end < start {
        return RangeParseResult::NotSatisfiable;
    }

    RangeParseResult::Valid(ByteRange { start, end })
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid(start: u64, end: u64) -> RangeParseResult {
        RangeParseResult::Valid(ByteRange { start, end })
    }

    #[test]
    fn test_no_range() {
        assert_eq!(parse_range_header(None, 100), RangeParseResult::None);
    }

    #[test]
    fn test_standard_range() {
        assert_eq!(parse_range_header(Some("bytes=0-9"), 100), valid(0, 9));
        assert_eq!(parse_range_header(Some("bytes=0-0"), 100), valid(0, 0));
        assert_eq!(parse_range_header(Some(" bytes=10 - 19 "), 100), valid(10, 19));
    }

    #[test]
    fn test_open_range() {
        let result = parse_range_header(Some("bytes=50-"), 100);
        assert_eq!(result, valid(50, 99));
        if let RangeParseResult::Valid(r) = result {
            assert_eq!(r.len(), 50);
            assert_eq!(r.content_range(100), "bytes 50-99/100");
        }
    }

    #[test]
    fn test_end_clamped_to_file() {
        assert_eq!(parse_range_header(Some("bytes=90-500"), 100), valid(90, 99));
        assert_eq!(
            parse_range_header(Some("bytes=0-99999999999999999999999"), 100),
            valid(0, 99)
        );
    }

    #[test]
    fn test_not_satisfiable() {
        for header in ["bytes=100-", "bytes=200-", "bytes=100-150", "bytes=50-10"] {
            assert_eq!(
                parse_range_header(Some(header), 100),
                RangeParseResult::NotSatisfiable,
                "{header}"
            );
        }
        assert_eq!(
            parse_range_header(Some("bytes=99999999999999999999999-"), 100),
            RangeParseResult::NotSatisfiable
        );
    }

    #[test]
    fn test_empty_file_is_never_satisfiable() {
        assert_eq!(
            parse_range_header(Some("bytes=0-"), 0),
            RangeParseResult::NotSatisfiable
        );
    }

    #[test]
    fn test_multi_range_rejected() {
        assert_eq!(
            parse_range_header(Some("bytes=0-9,20-29"), 100),
            RangeParseResult::NotSatisfiable
        );
    }

    #[test]
    fn test_unsupported_forms_fall_back() {
        for header in ["bytes=a-b", "bytes=-20", "bytes=5", "items=0-9", "0-9", "bytes=1-x"] {
            assert_eq!(
                parse_range_header(Some(header), 100),
                RangeParseResult::None,
                "{header}"
            );
        }
    }
}
