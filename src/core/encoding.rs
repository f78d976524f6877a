//! XML Encoding Detection and Conversion
//!
//! The scanner works on bytes in which every ASCII character is one byte.
//! UTF-8 input is used as-is (its BOM is skipped, not copied away); UTF-16
//! input is transcoded to UTF-8 once, up front.

use crate::error::EncodingError;

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Detect the encoding of XML input based on BOM or byte patterns
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
            (0xFF, 0xFE) => XmlEncoding::Utf16Le,
            (0xFE, 0xFF) => XmlEncoding::Utf16Be,
            // No BOM - '<' next to a NUL is UTF-16
            (0x00, b'<') => XmlEncoding::Utf16Be,
            (b'<', 0x00) => XmlEncoding::Utf16Le,
            _ => XmlEncoding::Utf8,
        }
    }

    fn endian(self) -> &'static str {
        match self {
            XmlEncoding::Utf16Be => "BE",
            _ => "LE",
        }
    }
}

/// Input ready for scanning
#[derive(Debug)]
pub struct Prepared {
    pub buffer: Vec<u8>,
    /// Where scanning starts (past a UTF-8 BOM)
    pub start: usize,
    pub encoding: XmlEncoding,
}

/// Bring `input` into the scanner's encoding
pub fn prepare(input: Vec<u8>) -> Result<Prepared, EncodingError> {
    let encoding = XmlEncoding::detect(&input);

    match encoding {
        XmlEncoding::Utf8 => {
            let start = if input.starts_with(&UTF8_BOM) { UTF8_BOM.len() } else { 0 };
            Ok(Prepared { buffer: input, start, encoding })
        }
        XmlEncoding::Utf16Le | XmlEncoding::Utf16Be => Ok(Prepared {
            buffer: convert_utf16(&input, encoding)?,
            start: 0,
            encoding,
        }),
    }
}

/// Convert UTF-16 (BOM optional) to UTF-8
fn convert_utf16(input: &[u8], encoding: XmlEncoding) -> Result<Vec<u8>, EncodingError> {
    let little = encoding == XmlEncoding::Utf16Le;
    let bom: [u8; 2] = if little { [0xFF, 0xFE] } else { [0xFE, 0xFF] };
    let bytes = input.strip_prefix(&bom).unwrap_or(input);

    if bytes.len() % 2 != 0 {
        return Err(EncodingError::OddLength { endian: encoding.endian() });
    }

    let code_units = bytes.chunks_exact(2).map(|chunk| {
        if little {
            u16::from_le_bytes([chunk[0], chunk[1]])
        } else {
            u16::from_be_bytes([chunk[0], chunk[1]])
        }
    });

    let mut out = Vec::with_capacity(bytes.len());
    let mut scratch = [0u8; 4];
    for unit in char::decode_utf16(code_units) {
        let c = unit.map_err(|_| EncodingError::UnpairedSurrogate { endian: encoding.endian() })?;
        out.extend_from_slice(c.encode_utf8(&mut scratch).as_bytes());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_utf8() {
        assert_eq!(XmlEncoding::detect(b"<root/>"), XmlEncoding::Utf8);
        assert_eq!(XmlEncoding::detect(b"<?xml"), XmlEncoding::Utf8);
        assert_eq!(XmlEncoding::detect(&[0xEF, 0xBB, 0xBF, b'<']), XmlEncoding::Utf8);
    }

    #[test]
    fn test_detect_utf16_bom() {
        assert_eq!(XmlEncoding::detect(&[0xFF, 0xFE, b'<', 0x00]), XmlEncoding::Utf16Le);
        assert_eq!(XmlEncoding::detect(&[0xFE, 0xFF, 0x00, b'<']), XmlEncoding::Utf16Be);
    }

    #[test]
    fn test_utf8_bom_is_skipped_in_place() {
        let prepared = prepare(vec![0xEF, 0xBB, 0xBF, b'<', b'a', b'/', b'>']).unwrap();
        assert_eq!(prepared.start, 3);
        assert_eq!(&prepared.buffer[prepared.start..], b"<a/>");
    }

    #[test]
    fn test_convert_utf16_le() {
        // "<r/>" in UTF-16 LE with BOM
        let utf16_le = vec![0xFF, 0xFE, b'<', 0x00, b'r', 0x00, b'/', 0x00, b'>', 0x00];
        let prepared = prepare(utf16_le).unwrap();
        assert_eq!(prepared.buffer, b"<r/>");
        assert_eq!(prepared.encoding, XmlEncoding::Utf16Le);
    }

    #[test]
    fn test_convert_utf16_be_non_ascii() {
        // "<é/>" in UTF-16 BE with BOM
        let utf16_be = vec![0xFE, 0xFF, 0x00, b'<', 0x00, 0xE9, 0x00, b'/', 0x00, b'>'];
        let prepared = prepare(utf16_be).unwrap();
        assert_eq!(prepared.buffer, "<é/>".as_bytes());
    }

    #[test]
    fn test_odd_length() {
        let err = prepare(vec![0xFF, 0xFE, b'<', 0x00, b'r']).unwrap_err();
        assert_eq!(err, EncodingError::OddLength { endian: "LE" });
    }

    #[test]
    fn test_unpaired_surrogate() {
        // lone high surrogate 0xD800
        let err = prepare(vec![0xFF, 0xFE, 0x00, 0xD8, b'<', 0x00]).unwrap_err();
        assert_eq!(err, EncodingError::UnpairedSurrogate { endian: "LE" });
    }

    #[test]
    fn test_utf8_passthrough() {
        let utf8 = b"<root>hello</root>".to_vec();
        let prepared = prepare(utf8.clone()).unwrap();
        assert_eq!(prepared.buffer, utf8);
        assert_eq!(prepared.start, 0);
    }
}
