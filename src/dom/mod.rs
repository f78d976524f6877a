//! DOM Module - arena-backed XML document
//!
//! - `arena`: slab allocator handing out stable `u32` slots
//! - `node`: node and attribute records linked by id
//! - `document`: the owning tree and its mutation operations
//! - `traverse`: lazy child, pre-order and attribute iterators
//! - `printer`: serialization back to XML

pub mod arena;
pub mod document;
pub mod node;
pub mod printer;
pub mod traverse;

pub use arena::{Arena, ArenaPolicy};
pub use document::Document;
pub use node::{AttrId, Attribute, Node, NodeId, NodeKind, Span};
pub use printer::PrintOptions;
pub use traverse::{Attributes, Children, Traverse};
