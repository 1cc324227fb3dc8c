//! Interaction tokens, the callback payload carried by toggle buttons.
//!
//! A token is `toggle_` followed by the canonical decimal form of a positive
//! task id. Only canonical forms decode, so every id has exactly one token and
//! every accepted token names exactly one id.

use crate::error::TokenError;

const TOGGLE_PREFIX: &str = "toggle_";

/// Encode a task id as a toggle token.
pub fn encode(id: i64) -> String {
    format!("{TOGGLE_PREFIX}{id}")
}

/// Decode a toggle token back into a task id.
pub fn decode(token: &str) -> Result<i64, TokenError> {
    let malformed = || TokenError::MalformedToken(token.to_string());

    let digits = token.strip_prefix(TOGGLE_PREFIX).ok_or_else(malformed)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    if digits.starts_with('0') {
        return Err(malformed());
    }
    digits.parse::<i64>().map_err(|_| malformed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_format() {
        assert_eq!(encode(42), "toggle_42");
    }

    #[test]
    fn roundtrip_boundaries() {
        for id in [1, 9, 10, 12345, i64::MAX] {
            assert_eq!(decode(&encode(id)).unwrap(), id);
        }
    }

    #[test]
    fn distinct_ids_distinct_tokens() {
        assert_ne!(encode(1), encode(11));
        assert_ne!(encode(12), encode(1));
    }

    #[test]
    fn rejects_wrong_prefix() {
        assert!(decode("delete_5").is_err());
        assert!(decode("Toggle_5").is_err());
        assert!(decode("5").is_err());
        assert!(decode("").is_err());
    }

    #[test]
    fn rejects_non_canonical_numbers() {
        for bad in ["toggle_", "toggle_-3", "toggle_+3", "toggle_03", "toggle_0", "toggle_3 ", "toggle_3a", "toggle_١"] {
            assert_eq!(
                decode(bad),
                Err(TokenError::MalformedToken(bad.to_string())),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_overflow() {
        assert!(decode("toggle_9223372036854775808").is_err());
    }
}
