//! Validation of pointer strings and index segments.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PointerError {
    #[error("POINTER_INVALID: {0:?} must be empty or start with '/'")]
    PointerInvalid(String),
    #[error("NO_PARENT")]
    NoParent,
}

/// Check if a segment is a canonical non-negative integer index.
///
/// # Example
///
/// ```
/// use case_json_pointer::is_valid_index;
///
/// assert!(is_valid_index("0"));
/// assert!(is_valid_index("42"));
/// assert!(!is_valid_index("007"));
/// assert!(!is_valid_index("-1"));
/// assert!(!is_valid_index("-"));
/// ```
pub fn is_valid_index(segment: &str) -> bool {
    if segment.is_empty() {
        return false;
    }
    let bytes = segment.as_bytes();
    if bytes.len() > 1 && bytes[0] == b'0' {
        return false;
    }
    bytes.iter().all(|b| b.is_ascii_digit())
}

/// Parse a segment as a sequence index.
pub fn parse_index(segment: &str) -> Option<usize> {
    if !is_valid_index(segment) {
        return None;
    }
    segment.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_indices() {
        assert_eq!(parse_index("0"), Some(0));
        assert_eq!(parse_index("17"), Some(17));
        assert_eq!(parse_index("017"), None);
        assert_eq!(parse_index(""), None);
        assert_eq!(parse_index("1e3"), None);
    }
}
