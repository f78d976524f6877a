//! Core XML parsing primitives
//!
//! - Tables: per-byte grammar classes
//! - Scanner: cursor over the mutable buffer, memchr delimiter search
//! - Entities: in-place reference decoding and output escaping
//! - Encoding: BOM handling and UTF-16 conversion to UTF-8
//! - Parser: the recursive-descent engine

pub mod encoding;
pub mod entities;
pub mod parser;
pub mod scanner;
pub mod tables;
