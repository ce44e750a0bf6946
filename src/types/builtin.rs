//! Built-in decoders.

use std::sync::Arc;

use ::base64::Engine as _;
use ::base64::engine::general_purpose::STANDARD;

use super::{DecodeError, Decoder};

/// Width of a `uint64` value in bytes.
const UINT64_WIDTH: usize = 8;

/// The built-in `(name, decoder)` pairs.
pub(crate) fn decoders() -> [(&'static str, Decoder); 4] {
    [
        ("string", Arc::new(string) as Decoder),
        ("hex", Arc::new(hex) as Decoder),
        ("base64", Arc::new(base64) as Decoder),
        ("uint64", Arc::new(uint64) as Decoder),
    ]
}

/// UTF-8 passthrough. Invalid sequences become U+FFFD rather than failing.
pub fn string(value: &[u8]) -> Result<String, DecodeError> {
    Ok(String::from_utf8_lossy(value).into_owned())
}

/// Lowercase hex.
pub fn hex(value: &[u8]) -> Result<String, DecodeError> {
    Ok(::hex::encode(value))
}

/// Standard padded base64.
pub fn base64(value: &[u8]) -> Result<String, DecodeError> {
    Ok(STANDARD.encode(value))
}

/// Big-endian unsigned 64-bit integer in decimal.
pub fn uint64(value: &[u8]) -> Result<String, DecodeError> {
    let bytes: [u8; UINT64_WIDTH] = value.try_into().map_err(|_| {
        DecodeError::new(format!(
            "expected {UINT64_WIDTH} bytes, got {}",
            value.len()
        ))
    })?;
    Ok(u64::from_be_bytes(bytes).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hex() {
        assert_eq!(hex(&[0xDE, 0xAD, 0xBE, 0xEF]).unwrap(), "deadbeef");
        assert_eq!(hex(&[]).unwrap(), "");
    }

    #[test]
    fn test_base64() {
        assert_eq!(base64(b"hello").unwrap(), "aGVsbG8=");
        assert_eq!(base64(&[0xff, 0xfe]).unwrap(), "//4=");
    }

    #[test]
    fn test_string() {
        assert_eq!(string("grüße".as_bytes()).unwrap(), "grüße");
        assert_eq!(string(&[b'a', 0xff, b'b']).unwrap(), "a\u{fffd}b");
    }

    #[test]
    fn test_uint64() {
        assert_eq!(uint64(&[0, 0, 0, 0, 0, 0, 0, 1]).unwrap(), "1");
        assert_eq!(uint64(&[0xff; 8]).unwrap(), u64::MAX.to_string());
    }

    #[test]
    fn test_uint64_rejects_wrong_width() {
        let err = uint64(&[0, 0, 0, 0, 0, 0, 1]).unwrap_err();
        assert_eq!(err.reason(), "expected 8 bytes, got 7");
        assert!(uint64(&[0; 9]).is_err());
        assert!(uint64(&[]).is_err());
    }

    proptest! {
        #[test]
        fn prop_uint64_matches_be_bytes(n in any::<u64>()) {
            prop_assert_eq!(uint64(&n.to_be_bytes()).unwrap(), n.to_string());
        }

        #[test]
        fn prop_hex_is_lowercase_and_double_width(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
            let text = hex(&bytes).unwrap();
            prop_assert_eq!(text.len(), bytes.len() * 2);
            prop_assert!(text.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        }

        #[test]
        fn prop_string_roundtrips_utf8(s in ".*") {
            prop_assert_eq!(string(s.as_bytes()).unwrap(), s);
        }
    }
}
