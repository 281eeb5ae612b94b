//! Byte-sequence materialization.
//!
//! A string token can be reinterpreted as bytes two ways: as Base64, or,
//! when it is exactly GUID-shaped, as the 16-byte binary form of that
//! GUID (mixed-endian: the first three groups little-endian, the last two
//! as written).

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Decodes Base64 text; `None` when the text is not valid Base64.
pub(crate) fn from_base64(text: &str) -> Option<Vec<u8>> {
    STANDARD.decode(text).ok()
}

/// Encodes bytes as Base64 for the writer.
pub(crate) fn to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Whether `text` has the `8-4-4-4-12` hex shape of a GUID.
pub(crate) fn looks_like_guid(text: &str) -> bool {
    text.len() == 36
        && text.bytes().enumerate().all(|(i, b)| match i {
            8 | 13 | 18 | 23 => b == b'-',
            _ => b.is_ascii_hexdigit(),
        })
}

/// Parses a 36-character GUID string into its 16-byte binary form.
pub(crate) fn guid_bytes(text: &str) -> Option<[u8; 16]> {
    if !looks_like_guid(text) {
        return None;
    }
    let mut hex = [0u8; 16];
    let mut i = 0;
    let bytes = text.as_bytes();
    let mut pos = 0;
    while pos < 36 {
        if matches!(pos, 8 | 13 | 18 | 23) {
            pos += 1;
            continue;
        }
        hex[i] = (hex_val(bytes[pos])? << 4) | hex_val(bytes[pos + 1])?;
        i += 1;
        pos += 2;
    }
    // First three groups are stored little-endian.
    let mut out = [0u8; 16];
    out[0..4].copy_from_slice(&[hex[3], hex[2], hex[1], hex[0]]);
    out[4..6].copy_from_slice(&[hex[5], hex[4]]);
    out[6..8].copy_from_slice(&[hex[7], hex[6]]);
    out[8..16].copy_from_slice(&hex[8..16]);
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64_round_trip() {
        let data = b"any carnal pleasure";
        assert_eq!(from_base64(&to_base64(data)).unwrap(), data);
        assert!(from_base64("not//legal**base64!").is_none());
    }

    #[test]
    fn guid_shape_detection() {
        assert!(looks_like_guid("00000000-0000-0000-0000-000000000000"));
        assert!(!looks_like_guid("00000000-0000-0000-0000-00000000000"));
        assert!(!looks_like_guid("g0000000-0000-0000-0000-000000000000"));
    }

    #[test]
    fn guid_bytes_use_mixed_endian_layout() {
        let bytes = guid_bytes("01020304-0506-0708-090a-0b0c0d0e0f10").unwrap();
        assert_eq!(
            bytes,
            [
                0x04, 0x03, 0x02, 0x01, // group 1 reversed
                0x06, 0x05, // group 2 reversed
                0x08, 0x07, // group 3 reversed
                0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f, 0x10,
            ]
        );
    }
}
