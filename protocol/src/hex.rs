//! `0x`-prefixed hex, the textual form every byte string takes on the wire.

use data_encoding::{HEXLOWER, HEXLOWER_PERMISSIVE};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HexError {
    #[error("missing `0x` prefix")]
    MissingPrefix,
    #[error("invalid hex: {0}")]
    Invalid(String),
}

/// Encode bytes as lowercase hex with a `0x` prefix.
pub fn encode(bytes: &[u8]) -> String {
    format!("0x{}", HEXLOWER.encode(bytes))
}

/// Decode `0x`-prefixed hex of either letter case.
pub fn decode(text: &str) -> Result<Vec<u8>, HexError> {
    let digits = strip_prefix(text).ok_or(HexError::MissingPrefix)?;
    HEXLOWER_PERMISSIVE
        .decode(digits.as_bytes())
        .map_err(|e| HexError::Invalid(e.to_string()))
}

pub(crate) fn strip_prefix(text: &str) -> Option<&str> {
    text.strip_prefix("0x").or_else(|| text.strip_prefix("0X"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_accepts_mixed_case() {
        assert_eq!(decode("0xDeadBEEF"), Ok(vec![0xde, 0xad, 0xbe, 0xef]));
        assert_eq!(encode(&[0xde, 0xad, 0xbe, 0xef]), "0xdeadbeef");
    }

    #[test]
    fn decode_rejects_bad_input() {
        assert_eq!(decode("deadbeef"), Err(HexError::MissingPrefix));
        assert!(matches!(decode("0xabc"), Err(HexError::Invalid(_))));
        assert!(matches!(decode("0xzz"), Err(HexError::Invalid(_))));
    }
}
