//! Session identifier normalization.

use percent_encoding::percent_decode_str;

/// Normalize a raw session identifier into a lookup key.
///
/// Surrounding whitespace is trimmed, percent-escapes are decoded, and the
/// result is trimmed again so `" id "`, `"id"` and `"%20id%20"` share a key.
/// Returns `None` when nothing usable remains or the decoded bytes are not
/// UTF-8.
#[must_use]
pub fn normalize_session_id(raw: &str) -> Option<String> {
    let decoded = percent_decode_str(raw.trim()).decode_utf8().ok()?;
    let key = decoded.trim();
    if key.is_empty() {
        None
    } else {
        Some(key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_and_encoding_share_key() {
        let expected = Some("42:token".to_string());
        assert_eq!(normalize_session_id("42:token"), expected);
        assert_eq!(normalize_session_id("  42:token\n"), expected);
        assert_eq!(normalize_session_id("42%3Atoken"), expected);
        assert_eq!(normalize_session_id("%2042%3atoken%20"), expected);
    }

    #[test]
    fn test_unusable_identifiers() {
        assert_eq!(normalize_session_id(""), None);
        assert_eq!(normalize_session_id("   "), None);
        assert_eq!(normalize_session_id("%20%20"), None);
        // lone continuation byte
        assert_eq!(normalize_session_id("%80"), None);
    }

    #[test]
    fn test_plus_is_not_a_space() {
        assert_eq!(normalize_session_id("a+b").as_deref(), Some("a+b"));
    }
}
