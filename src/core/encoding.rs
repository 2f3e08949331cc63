//! Input Decoding
//!
//! The scanner works on Unicode text. Byte input is decoded once, up front:
//! UTF-16 is detected from its byte order mark or from the `<` byte pattern
//! of an undeclared document, everything else must be UTF-8.

use std::borrow::Cow;

use crate::error::SaxError;

/// Encoding detected from the first bytes of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XmlEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
}

impl XmlEncoding {
    /// Detect encoding from byte order mark or initial bytes
    pub fn detect(input: &[u8]) -> Self {
        if input.len() < 2 {
            return XmlEncoding::Utf8;
        }

        match (input[0], input[1]) {
            // UTF-16 LE BOM: 0xFF 0xFE
            (0xFF, 0xFE) => XmlEncoding::Utf16Le,
            // UTF-16 BE BOM: 0xFE 0xFF
            (0xFE, 0xFF) => XmlEncoding::Utf16Be,
            // No BOM - check for UTF-16 pattern (< followed by null or null followed by <)
            (0x00, b'<') => XmlEncoding::Utf16Be,
            (b'<', 0x00) => XmlEncoding::Utf16Le,
            _ => XmlEncoding::Utf8,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            XmlEncoding::Utf8 => "UTF-8",
            XmlEncoding::Utf16Le => "UTF-16LE",
            XmlEncoding::Utf16Be => "UTF-16BE",
        }
    }
}

/// Decode a whole document to text, dropping any byte order mark.
///
/// UTF-8 input is borrowed, UTF-16 input is converted.
pub fn decode(input: &[u8]) -> Result<Cow<'_, str>, SaxError> {
    let encoding = XmlEncoding::detect(input);
    log::debug!("input encoding detected as {}", encoding.as_str());
    match encoding {
        XmlEncoding::Utf8 => {
            let bytes = input.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(input);
            std::str::from_utf8(bytes)
                .map(Cow::Borrowed)
                .map_err(|e| SaxError::fatal(format!("Invalid UTF-8: {}", e)))
        }
        XmlEncoding::Utf16Le => decode_utf16(input, [0xFF, 0xFE], u16::from_le_bytes, encoding),
        XmlEncoding::Utf16Be => decode_utf16(input, [0xFE, 0xFF], u16::from_be_bytes, encoding),
    }
}

fn decode_utf16(
    input: &[u8],
    bom: [u8; 2],
    unit: fn([u8; 2]) -> u16,
    encoding: XmlEncoding,
) -> Result<Cow<'static, str>, SaxError> {
    let bytes = input.strip_prefix(&bom).unwrap_or(input);

    if bytes.len() % 2 != 0 {
        return Err(SaxError::fatal(format!(
            "Invalid {}: odd number of bytes",
            encoding.as_str()
        )));
    }

    let code_units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|chunk| unit([chunk[0], chunk[1]]))
        .collect();

    String::from_utf16(&code_units)
        .map(Cow::Owned)
        .map_err(|e| SaxError::fatal(format!("Invalid {}: {}", encoding.as_str(), e)))
}
