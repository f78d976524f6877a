//! In-place entity expansion
//!
//! Attribute values and element text are decoded inside the input buffer
//! itself. A read cursor walks the raw bytes while a write cursor trails it
//! with the decoded output; every recognized reference is longer than the
//! byte it decodes to, so the write cursor can never overtake the read cursor
//! and no unread byte is ever overwritten.
//!
//! Recognized references: `&amp;` `&lt;` `&gt;` `&quot;` `&apos;`.
//! Numeric character references and unknown names are passed through as-is.

use super::tables::{is, CharClass};

/// Result of one expansion run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expanded {
    /// Start of the decoded bytes (the run start)
    pub start: usize,
    /// Length of the decoded bytes
    pub len: usize,
    /// Position of the first byte outside the class (the sentinel)
    pub stop: usize,
}

/// Decode the run starting at `start` in place.
///
/// The run continues while bytes belong to `class`; `pure` must be the same
/// class minus `&` and is used to skip the leading reference-free prefix.
/// Returns `None` when the buffer ends before a sentinel byte is found.
pub fn expand_in_place(
    buf: &mut [u8],
    start: usize,
    class: CharClass,
    pure: CharClass,
) -> Option<Expanded> {
    let len = buf.len();
    let mut read = start;

    // Fast path: nothing to rewrite until the first '&'
    while read < len && is(buf[read], pure) {
        read += 1;
    }
    let mut write = read;

    loop {
        if read >= len {
            return None;
        }
        let b = buf[read];
        if !is(b, class) {
            break;
        }
        if b == b'&' {
            if let Some((decoded, consumed)) = match_entity(&buf[read..]) {
                buf[write] = decoded;
                write += 1;
                read += consumed;
                debug_assert!(write <= read);
                continue;
            }
        }
        if write < read {
            buf[write] = b;
        }
        write += 1;
        read += 1;
    }

    debug_assert!(write <= read);
    Some(Expanded {
        start,
        len: write - start,
        stop: read,
    })
}

/// Match a predefined entity at the start of `rest` (which begins with `&`).
/// Returns the decoded byte and the length of the reference.
#[inline]
fn match_entity(rest: &[u8]) -> Option<(u8, usize)> {
    let body = rest.get(1..)?;
    match body.first()? {
        b'a' if body.starts_with(b"amp;") => Some((b'&', 5)),
        b'a' if body.starts_with(b"apos;") => Some((b'\'', 6)),
        b'l' if body.starts_with(b"lt;") => Some((b'<', 4)),
        b'g' if body.starts_with(b"gt;") => Some((b'>', 4)),
        b'q' if body.starts_with(b"quot;") => Some((b'"', 6)),
        _ => None,
    }
}

/// Append `input` to `out`, escaping characters that would end element text
pub fn escape_text(input: &[u8], out: &mut Vec<u8>) {
    for &b in input {
        match b {
            b'&' => out.extend_from_slice(b"&amp;"),
            b'<' => out.extend_from_slice(b"&lt;"),
            b'>' => out.extend_from_slice(b"&gt;"),
            _ => out.push(b),
        }
    }
}

/// Append `input` to `out`, escaping characters that would end a `"`-quoted value
pub fn escape_attribute(input: &[u8], out: &mut Vec<u8>) {
    for &b in input {
        match b {
            b'&' => out.extend_from_slice(b"&amp;"),
            b'<' => out.extend_from_slice(b"&lt;"),
            b'"' => out.extend_from_slice(b"&quot;"),
            _ => out.push(b),
        }
    }
}
