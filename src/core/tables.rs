//! Byte classification table
//!
//! One 256-entry table indexed by raw byte value. Each entry carries one bit
//! per grammar context, so every classification in the scanning loops is a
//! single load and mask:
//!
//! - `NAME`: element names, attribute names, PI targets and closing tags
//! - `WHITESPACE`: exactly space, tab, CR and LF
//! - `ATTR_SQ` / `ATTR_DQ`: attribute value bytes under `'` / `"` quoting
//! - `TEXT`: element content bytes
//!
//! The `*_PURE` variants additionally exclude `&`, which lets a run with no
//! entity references be skipped without touching the buffer.

use bitflags::bitflags;

bitflags! {
    /// Set of grammar contexts a byte may appear in
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CharClass: u16 {
        const NAME = 1 << 0;
        const WHITESPACE = 1 << 1;
        const ATTR_SQ = 1 << 2;
        const ATTR_SQ_PURE = 1 << 3;
        const ATTR_DQ = 1 << 4;
        const ATTR_DQ_PURE = 1 << 5;
        const TEXT = 1 << 6;
        const TEXT_PURE = 1 << 7;
    }
}

static TABLE: [u16; 256] = build_table();

const fn build_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;
    while i < 256 {
        let b = i as u8;
        let mut bits = 0u16;

        let whitespace = matches!(b, b' ' | b'\t' | b'\n' | b'\r');
        if whitespace {
            bits |= CharClass::WHITESPACE.bits();
        }

        if b != 0
            && !whitespace
            && !matches!(b, b'/' | b'>' | b'?' | b'<' | b'=' | b'!' | b'"' | b'\'')
        {
            bits |= CharClass::NAME.bits();
        }

        if b != 0 && b != b'\'' {
            bits |= CharClass::ATTR_SQ.bits();
            if b != b'&' {
                bits |= CharClass::ATTR_SQ_PURE.bits();
            }
        }

        if b != 0 && b != b'"' {
            bits |= CharClass::ATTR_DQ.bits();
            if b != b'&' {
                bits |= CharClass::ATTR_DQ_PURE.bits();
            }
        }

        if b != 0 && b != b'<' {
            bits |= CharClass::TEXT.bits();
            if b != b'&' {
                bits |= CharClass::TEXT_PURE.bits();
            }
        }

        table[i] = bits;
        i += 1;
    }
    table
}

/// Check whether `b` belongs to any class in `class`
#[inline(always)]
pub fn is(b: u8, class: CharClass) -> bool {
    TABLE[b as usize] & class.bits() != 0
}

/// All classes `b` belongs to
#[inline]
pub fn classify(b: u8) -> CharClass {
    CharClass::from_bits_retain(TABLE[b as usize])
}

/// The (full, pure) class pair for an attribute value opened by `quote`
#[inline]
pub fn attribute_classes(quote: u8) -> (CharClass, CharClass) {
    if quote == b'\'' {
        (CharClass::ATTR_SQ, CharClass::ATTR_SQ_PURE)
    } else {
        (CharClass::ATTR_DQ, CharClass::ATTR_DQ_PURE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_is_exactly_four_bytes() {
        let ws: Vec<u8> = (0..=255u8).filter(|&b| is(b, CharClass::WHITESPACE)).collect();
        assert_eq!(ws, vec![b'\t', b'\n', b'\r', b' ']);
    }

    #[test]
    fn test_name_exclusions() {
        for b in [0u8, b' ', b'\t', b'\n', b'\r', b'/', b'>', b'?', b'<', b'=', b'!'] {
            assert!(!is(b, CharClass::NAME), "byte {:?} must end a name", b as char);
        }
        for b in [b'a', b'Z', b'0', b'_', b'-', b'.', b':', 0xC3] {
            assert!(is(b, CharClass::NAME));
        }
    }

    #[test]
    fn test_attribute_quotes() {
        assert!(!is(b'\'', CharClass::ATTR_SQ));
        assert!(is(b'"', CharClass::ATTR_SQ));
        assert!(!is(b'"', CharClass::ATTR_DQ));
        assert!(is(b'\'', CharClass::ATTR_DQ));
        assert!(is(b'&', CharClass::ATTR_DQ));
        assert!(!is(b'&', CharClass::ATTR_DQ_PURE));
    }

    #[test]
    fn test_text_classes() {
        assert!(!is(b'<', CharClass::TEXT));
        assert!(!is(0, CharClass::TEXT));
        assert!(is(b'&', CharClass::TEXT));
        assert!(!is(b'&', CharClass::TEXT_PURE));
        assert!(is(b'>', CharClass::TEXT_PURE));
    }

    #[test]
    fn test_pure_is_subset() {
        for b in 0..=255u8 {
            let c = classify(b);
            if c.contains(CharClass::TEXT_PURE) {
                assert!(c.contains(CharClass::TEXT));
            }
            if c.contains(CharClass::ATTR_SQ_PURE) {
                assert!(c.contains(CharClass::ATTR_SQ));
            }
            if c.contains(CharClass::ATTR_DQ_PURE) {
                assert!(c.contains(CharClass::ATTR_DQ));
            }
        }
    }
}
