//! Structural token checks.
//!
//! Signatures are never verified client-side; only the shape is checked.

/// Number of dot-separated segments in a well-formed token.
const TOKEN_SEGMENTS: usize = 3;

/// Returns `true` if `token` is non-empty and splits into exactly three
/// dot-separated segments.
pub fn is_well_formed_token(token: &str) -> bool {
    !token.is_empty() && token.split('.').count() == TOKEN_SEGMENTS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed() {
        assert!(is_well_formed_token("eyJhbGciOi.eyJzdWIiOi.c2lnbmF0dXJl"));
        assert!(is_well_formed_token("a.b.c"));
    }

    #[test]
    fn test_malformed() {
        assert!(!is_well_formed_token(""));
        assert!(!is_well_formed_token("opaque-token"));
        assert!(!is_well_formed_token("a.b"));
        assert!(!is_well_formed_token("a.b.c.d"));
    }

    #[test]
    fn test_segment_count_only() {
        // Segment contents are not inspected.
        assert!(is_well_formed_token(".."));
        assert!(is_well_formed_token("a..c"));
    }
}
