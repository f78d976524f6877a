//! XML Node representation
//!
//! Nodes and attributes live in per-document arenas and refer to each other
//! by index. Parent and sibling links are plain ids, never ownership.

use std::fmt;

/// Node identifier (index into the node arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Attribute identifier (index into the attribute arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttrId(pub(crate) u32);

impl AttrId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Byte range inside the document buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub offset: u32,
    pub len: u32,
}

impl Span {
    pub const EMPTY: Span = Span { offset: 0, len: 0 };

    #[inline]
    pub const fn new(offset: u32, len: u32) -> Self {
        Span { offset, len }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Exclusive end offset
    #[inline]
    pub const fn end(&self) -> usize {
        self.offset as usize + self.len as usize
    }

    #[inline]
    pub fn slice<'a>(&self, input: &'a [u8]) -> &'a [u8] {
        input.get(self.offset as usize..self.end()).unwrap_or(&[])
    }
}

/// Type of XML node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Document root. Name and value are empty.
    Document,
    /// Element. Name is the tag name, value is the text of its first data child.
    Element,
    /// Character data. Value is the decoded text.
    Data,
    /// CDATA section. Value is the raw section content.
    Cdata,
    /// Comment. Value is the comment text.
    Comment,
    /// `<?xml ...?>` declaration. Parameters are attributes.
    Declaration,
    /// DOCTYPE. Value is everything between `<!DOCTYPE ` and the closing `>`.
    Doctype,
    /// Processing instruction. Name is the target, value the instruction text.
    Pi,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Document => "Document",
            NodeKind::Element => "Element",
            NodeKind::Data => "Data",
            NodeKind::Cdata => "Cdata",
            NodeKind::Comment => "Comment",
            NodeKind::Declaration => "Declaration",
            NodeKind::Doctype => "Doctype",
            NodeKind::Pi => "Pi",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An XML node in the arena
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) name: Span,
    pub(crate) value: Span,
    pub(crate) parent: Option<NodeId>,
    pub(crate) first_child: Option<NodeId>,
    pub(crate) last_child: Option<NodeId>,
    pub(crate) prev_sibling: Option<NodeId>,
    pub(crate) next_sibling: Option<NodeId>,
    pub(crate) first_attribute: Option<AttrId>,
    pub(crate) last_attribute: Option<AttrId>,
    /// Parent's `child_epoch` at the time this node was linked
    pub(crate) epoch: u32,
    /// Bumped when all children are dropped at once
    pub(crate) child_epoch: u32,
    /// Bumped when all attributes are dropped at once
    pub(crate) attr_epoch: u32,
}

impl Node {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Node {
            kind,
            name: Span::EMPTY,
            value: Span::EMPTY,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            first_attribute: None,
            last_attribute: None,
            epoch: 0,
            child_epoch: 0,
            attr_epoch: 0,
        }
    }

    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    #[inline]
    pub fn name_span(&self) -> Span {
        self.name
    }

    #[inline]
    pub fn value_span(&self) -> Span {
        self.value
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub fn first_child(&self) -> Option<NodeId> {
        self.first_child
    }

    #[inline]
    pub fn last_child(&self) -> Option<NodeId> {
        self.last_child
    }

    #[inline]
    pub fn prev_sibling(&self) -> Option<NodeId> {
        self.prev_sibling
    }

    #[inline]
    pub fn next_sibling(&self) -> Option<NodeId> {
        self.next_sibling
    }

    #[inline]
    pub fn first_attribute(&self) -> Option<AttrId> {
        self.first_attribute
    }

    #[inline]
    pub fn last_attribute(&self) -> Option<AttrId> {
        self.last_attribute
    }

    #[inline]
    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    #[inline]
    pub fn has_children(&self) -> bool {
        self.first_child.is_some()
    }

    #[inline]
    pub fn has_attributes(&self) -> bool {
        self.first_attribute.is_some()
    }
}

/// One `name="value"` pair
#[derive(Debug, Clone)]
pub struct Attribute {
    pub(crate) name: Span,
    pub(crate) value: Span,
    pub(crate) parent: Option<NodeId>,
    pub(crate) prev: Option<AttrId>,
    pub(crate) next: Option<AttrId>,
    /// Owner's `attr_epoch` at the time this attribute was attached
    pub(crate) epoch: u32,
}

impl Attribute {
    pub(crate) fn new(name: Span, value: Span) -> Self {
        Attribute {
            name,
            value,
            parent: None,
            prev: None,
            next: None,
            epoch: 0,
        }
    }

    #[inline]
    pub fn name_span(&self) -> Span {
        self.name
    }

    #[inline]
    pub fn value_span(&self) -> Span {
        self.value
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub fn prev(&self) -> Option<AttrId> {
        self.prev
    }

    #[inline]
    pub fn next(&self) -> Option<AttrId> {
        self.next
    }
}
