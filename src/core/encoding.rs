//! XML Encoding Detection and Conversion
//!
//! Handles detection of UTF-16 based on BOM or byte patterns and converts
//! raw document bytes into a UTF-8 string for scanning.

/// Detected encoding of XML input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XmlEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
}

impl XmlEncoding {
    /// Detect encoding from byte order mark or initial bytes
    pub fn detect(input: &[u8]) -> Self {
        match input {
            [0xFF, 0xFE, ..] => XmlEncoding::Utf16Le,
            [0xFE, 0xFF, ..] => XmlEncoding::Utf16Be,
            // No BOM - check for UTF-16 pattern (< followed by null or null followed by <)
            [0x00, b'<', ..] => XmlEncoding::Utf16Be,
            [b'<', 0x00, ..] => XmlEncoding::Utf16Le,
            _ => XmlEncoding::Utf8,
        }
    }
}

/// Decode document bytes into UTF-8 text.
///
/// A UTF-8 BOM is dropped. On failure returns the byte offset of the first
/// undecodable unit together with a message.
pub fn decode_document(input: &[u8]) -> Result<String, (usize, String)> {
    match XmlEncoding::detect(input) {
        XmlEncoding::Utf8 => {
            let body = input.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(input);
            let bom = input.len() - body.len();
            std::str::from_utf8(body)
                .map(str::to_owned)
                .map_err(|e| (bom + e.valid_up_to(), format!("Invalid UTF-8: {e}")))
        }
        XmlEncoding::Utf16Le => decode_utf16(input, &[0xFF, 0xFE], u16::from_le_bytes, "LE"),
        XmlEncoding::Utf16Be => decode_utf16(input, &[0xFE, 0xFF], u16::from_be_bytes, "BE"),
    }
}

fn decode_utf16(
    input: &[u8],
    bom: &[u8],
    unit: fn([u8; 2]) -> u16,
    label: &str,
) -> Result<String, (usize, String)> {
    let bytes = input.strip_prefix(bom).unwrap_or(input);
    let skipped = input.len() - bytes.len();

    if bytes.len() % 2 != 0 {
        return Err((
            input.len() - 1,
            format!("Invalid UTF-16 {label}: odd number of bytes"),
        ));
    }

    let mut out = String::with_capacity(bytes.len() / 2);
    let units = bytes.chunks_exact(2).map(|c| unit([c[0], c[1]]));
    for (i, decoded) in char::decode_utf16(units).enumerate() {
        match decoded {
            Ok(c) => out.push(c),
            Err(e) => {
                return Err((
                    skipped + i * 2,
                    format!("Invalid UTF-16 {label}: unpaired surrogate {:#06x}", e.unpaired_surrogate()),
                ))
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_utf8() {
        assert_eq!(XmlEncoding::detect(b"<root/>"), XmlEncoding::Utf8);
        assert_eq!(XmlEncoding::detect(&[0xEF, 0xBB, 0xBF, b'<']), XmlEncoding::Utf8);
    }

    #[test]
    fn test_detect_utf16() {
        assert_eq!(XmlEncoding::detect(&[0xFF, 0xFE, b'<', 0x00]), XmlEncoding::Utf16Le);
        assert_eq!(XmlEncoding::detect(&[0xFE, 0xFF, 0x00, b'<']), XmlEncoding::Utf16Be);
        assert_eq!(XmlEncoding::detect(&[b'<', 0x00, b'r', 0x00]), XmlEncoding::Utf16Le);
    }

    #[test]
    fn test_utf8_bom_stripped() {
        let decoded = decode_document(&[0xEF, 0xBB, 0xBF, b'<', b'r', b'/', b'>']).unwrap();
        assert_eq!(decoded, "<r/>");
    }

    #[test]
    fn test_convert_utf16_le() {
        let utf16_le = [0xFF, 0xFE, b'<', 0x00, b'r', 0x00, b'/', 0x00, b'>', 0x00];
        assert_eq!(decode_document(&utf16_le).unwrap(), "<r/>");
    }

    #[test]
    fn test_convert_utf16_be() {
        let utf16_be = [0xFE, 0xFF, 0x00, b'<', 0x00, b'r', 0x00, b'/', 0x00, b'>'];
        assert_eq!(decode_document(&utf16_be).unwrap(), "<r/>");
    }

    #[test]
    fn test_invalid_utf8_reports_offset() {
        let (offset, message) = decode_document(b"<r>\xFF</r>").unwrap_err();
        assert_eq!(offset, 3);
        assert!(message.starts_with("Invalid UTF-8"));
    }

    #[test]
    fn test_odd_utf16_length() {
        assert!(decode_document(&[0xFF, 0xFE, b'<']).is_err());
    }
}
