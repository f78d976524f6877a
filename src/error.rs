//! Parse errors
//!
//! Every failure carries the byte position it was detected at together with a
//! window of the surrounding input, so a message from a multi-hundred-MB dump
//! can still be located by eye.

use std::fmt;

use thiserror::Error;

/// Bytes of input shown on each side of the failure position
pub const CONTEXT_SIZE: usize = 40;

pub type Result<T> = std::result::Result<T, Error>;

/// Error returned by the parse entry points
#[derive(Debug, Error)]
pub enum Error {
    /// Input is not well-formed
    #[error("{kind} at byte {position}\n{context}")]
    Syntax {
        kind: SyntaxError,
        position: usize,
        context: ErrorContext,
    },

    /// BOM-driven transcoding failed
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// Spans are 32-bit offsets into the buffer
    #[error("document of {len} bytes exceeds the 4 GiB span range")]
    TooLarge { len: usize },

    /// Element nesting went past `ParseOptions::max_depth`
    #[error("element nesting exceeds {depth} levels at byte {position}\n{context}")]
    TooDeep {
        depth: usize,
        position: usize,
        context: ErrorContext,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Byte offset of the failure, when the error came from the scanner
    pub fn position(&self) -> Option<usize> {
        match self {
            Error::Syntax { position, .. } | Error::TooDeep { position, .. } => Some(*position),
            _ => None,
        }
    }

    /// The well-formedness violation, if this is a syntax error
    pub fn syntax(&self) -> Option<&SyntaxError> {
        match self {
            Error::Syntax { kind, .. } => Some(kind),
            _ => None,
        }
    }
}

/// Structural well-formedness violations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("expected {expected} but found {found}")]
    ExpectedByte { expected: &'static str, found: Found },

    #[error("unexpected end of input inside {construct}")]
    UnexpectedEof { construct: &'static str },

    #[error("closing tag </{found}> does not match <{expected}>")]
    MismatchedClosingTag { expected: String, found: String },

    #[error("unrecognized node")]
    UnrecognizedNode,

    #[error("'--' is not allowed inside a comment")]
    DoubleHyphenInComment,

    #[error("missing {construct} name")]
    MissingName { construct: &'static str },

    #[error("unexpected NUL byte")]
    UnexpectedNul,
}

/// The byte found where something else was required (`None` at end of input)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Found(pub Option<u8>);

impl fmt::Display for Found {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(b) if b.is_ascii_graphic() || b == b' ' => write!(f, "'{}'", b as char),
            Some(b) => write!(f, "byte 0x{:02X}", b),
            None => f.write_str("end of input"),
        }
    }
}

/// Malformed UTF-16 input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("invalid UTF-16 {endian}: odd number of bytes")]
    OddLength { endian: &'static str },

    #[error("invalid UTF-16 {endian}: unpaired surrogate")]
    UnpairedSurrogate { endian: &'static str },
}

/// Input surrounding a failure position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    pub before: String,
    pub current: Option<u8>,
    pub after: String,
}

impl ErrorContext {
    /// Capture up to [`CONTEXT_SIZE`] bytes on both sides of `position`
    pub fn capture(input: &[u8], position: usize) -> Self {
        let position = position.min(input.len());
        let start = position.saturating_sub(CONTEXT_SIZE);
        let after_start = (position + 1).min(input.len());
        let after_end = (position + 1 + CONTEXT_SIZE).min(input.len());

        ErrorContext {
            before: String::from_utf8_lossy(&input[start..position]).into_owned(),
            current: input.get(position).copied(),
            after: String::from_utf8_lossy(&input[after_start..after_end]).into_owned(),
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.current {
            Some(b) => write!(
                f,
                "{}{{{}}}{}",
                self.before,
                String::from_utf8_lossy(&[b]),
                self.after
            ),
            None => f.write_str(&self.before),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_window() {
        let input = b"0123456789<bad>0123456789";
        let ctx = ErrorContext::capture(input, 10);
        assert_eq!(ctx.before, "0123456789");
        assert_eq!(ctx.current, Some(b'<'));
        assert_eq!(ctx.after, "bad>0123456789");
        assert_eq!(ctx.to_string(), "0123456789{<}bad>0123456789");
    }

    #[test]
    fn test_context_is_clamped() {
        let input = vec![b'a'; 200];
        let ctx = ErrorContext::capture(&input, 100);
        assert_eq!(ctx.before.len(), CONTEXT_SIZE);
        assert_eq!(ctx.after.len(), CONTEXT_SIZE);
    }

    #[test]
    fn test_context_at_end() {
        let ctx = ErrorContext::capture(b"<a>", 3);
        assert_eq!(ctx.current, None);
        assert_eq!(ctx.to_string(), "<a>");
    }

    #[test]
    fn test_found_display() {
        assert_eq!(Found(Some(b'x')).to_string(), "'x'");
        assert_eq!(Found(Some(0)).to_string(), "byte 0x00");
        assert_eq!(Found(None).to_string(), "end of input");
    }
}
