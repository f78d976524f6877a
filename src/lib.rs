//! insitu-xml - in-situ DOM XML parser
//!
//! Parses a complete buffer into an arena-backed tree without copying text:
//! entity references are decoded inside the input buffer itself and every
//! name and value in the tree is a span into that buffer.
//!
//! ```
//! let doc = insitu_xml::parse("<r><a>1</a><b>2</b></r>").unwrap();
//! let r = doc.root_element().unwrap();
//! let values: Vec<&[u8]> = doc.children(r).map(|c| doc.value(c)).collect();
//! assert_eq!(values, [&b"1"[..], &b"2"[..]]);
//! ```
//!
//! Layers:
//! - `core`: byte tables, scanner, entity decoding, encoding, parse engine
//! - `dom`: arenas, document tree, traversal, serializer
//! - `strategy`: parallel parsing of independent buffers
//! - `nif` (feature `nif`): Erlang/Elixir bindings

use std::path::Path;

use tracing::debug;

pub mod core;
pub mod dom;
pub mod error;
pub mod strategy;

#[cfg(feature = "nif")]
mod nif;
#[cfg(feature = "nif")]
mod resource;
#[cfg(feature = "nif")]
mod term;

pub use crate::core::encoding::XmlEncoding;
pub use crate::core::parser::ParseOptions;
pub use dom::{
    ArenaPolicy, AttrId, Attribute, Document, Node, NodeId, NodeKind, PrintOptions, Span,
};
pub use error::{EncodingError, Error, ErrorContext, Result, SyntaxError};
pub use strategy::{parse_many, parse_map};

// ============================================================================
// Allocator Configuration
// ============================================================================

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

// ============================================================================
// Entry points
// ============================================================================

/// Parse with default options
pub fn parse(input: impl Into<Vec<u8>>) -> Result<Document> {
    parse_with_options(input, &ParseOptions::default())
}

/// Parse a complete buffer. The buffer is decoded in place and moved into
/// the returned document.
pub fn parse_with_options(input: impl Into<Vec<u8>>, options: &ParseOptions) -> Result<Document> {
    crate::core::parser::parse_document(input.into(), options)
}

/// Read a whole file into memory and parse it
pub fn parse_file(path: impl AsRef<Path>, options: &ParseOptions) -> Result<Document> {
    let path = path.as_ref();
    let input = std::fs::read(path)?;
    debug!(path = %path.display(), len = input.len(), "read input file");
    parse_with_options(input, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_str_and_bytes() {
        assert!(parse("<a/>").is_ok());
        assert!(parse(b"<a/>".to_vec()).is_ok());
        assert!(parse(String::from("<a/>")).is_ok());
    }

    #[test]
    fn test_parse_file() {
        let path = std::env::temp_dir().join(format!("insitu-xml-{}.xml", std::process::id()));
        std::fs::write(&path, "<doc><item id='1'>x</item></doc>").unwrap();
        let doc = parse_file(&path, &ParseOptions::default()).unwrap();
        std::fs::remove_file(&path).unwrap();

        let item = doc.first_child(doc.root_element().unwrap()).unwrap();
        assert_eq!(doc.attribute_value(item, "id"), Some(&b"1"[..]));
    }

    #[test]
    fn test_parse_missing_file() {
        let err = parse_file("/definitely/not/here.xml", &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_render_round_trip() {
        let input = "<?xml version=\"1.0\"?><r a=\"x &amp; y\"><b>1 &lt; 2</b><!--c--><![CDATA[z]]></r>";
        let doc = parse(input).unwrap();
        let out = doc.to_xml(&PrintOptions::default());
        assert_eq!(String::from_utf8(out).unwrap(), input);
    }
}
