//! XML Document - arena-backed tree over one owned buffer
//!
//! The document owns the (decoded in place) input buffer, a node arena and
//! an attribute arena. Names and values are spans into the buffer; bytes for
//! nodes built through the API are appended to its tail, so every span in a
//! document refers to that single buffer.
//!
//! Structural mutations are O(1) link splices. Passing a node that is not
//! where the operation requires it to be is a caller bug and panics.

use super::arena::{Arena, ArenaPolicy};
use super::node::{AttrId, Attribute, Node, NodeId, NodeKind, Span};
use crate::core::encoding::XmlEncoding;

/// A parsed (or constructed) XML document
#[derive(Debug)]
pub struct Document {
    buffer: Vec<u8>,
    encoding: XmlEncoding,
    nodes: Arena<Node>,
    attributes: Arena<Attribute>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Empty document holding only the Document node
    pub fn new() -> Self {
        Self::with_policy(ArenaPolicy::default())
    }

    /// Empty document whose arenas grow according to `policy`
    pub fn with_policy(policy: ArenaPolicy) -> Self {
        let mut nodes = Arena::new(policy);
        let root = NodeId(nodes.alloc(Node::new(NodeKind::Document)));
        Document {
            buffer: Vec::new(),
            encoding: XmlEncoding::Utf8,
            nodes,
            attributes: Arena::new(policy),
            root,
        }
    }

    /// Hand the decoded buffer the parser's spans point into to the document
    pub(crate) fn set_buffer(&mut self, buffer: Vec<u8>, encoding: XmlEncoding) {
        self.buffer = buffer;
        self.encoding = encoding;
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// New detached attribute over spans already in the buffer
    #[inline]
    pub(crate) fn new_attribute(&mut self, name: Span, value: Span) -> AttrId {
        AttrId(self.attributes.alloc(Attribute::new(name, value)))
    }

    /// Slabs allocated by the (node, attribute) arenas
    pub fn slab_counts(&self) -> (usize, usize) {
        (self.nodes.slab_count(), self.attributes.slab_count())
    }

    // ------------------------------------------------------------------
    // Access
    // ------------------------------------------------------------------

    /// The Document node
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// First Element child of the Document node
    pub fn root_element(&self) -> Option<NodeId> {
        self.children(self.root)
            .find(|&id| self.nodes[id.0].kind == NodeKind::Element)
    }

    /// Backing buffer (decoded input followed by any bytes added through the API)
    #[inline]
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Encoding the input was detected as
    #[inline]
    pub fn encoding(&self) -> XmlEncoding {
        self.encoding
    }

    /// Number of nodes allocated, including the Document node
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of attributes allocated
    #[inline]
    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    /// Get a node by ID
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// # Panics
    ///
    /// Panics if `id` does not belong to this document.
    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// # Panics
    ///
    /// Panics if `id` does not belong to this document.
    #[inline]
    pub fn attr(&self, id: AttrId) -> &Attribute {
        &self.attributes[id.0]
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.nodes[id.0].kind
    }

    #[inline]
    pub fn name(&self, id: NodeId) -> &[u8] {
        self.nodes[id.0].name.slice(&self.buffer)
    }

    #[inline]
    pub fn value(&self, id: NodeId) -> &[u8] {
        self.nodes[id.0].value.slice(&self.buffer)
    }

    /// Name as UTF-8, `None` if the bytes are not valid UTF-8
    pub fn name_str(&self, id: NodeId) -> Option<&str> {
        std::str::from_utf8(self.name(id)).ok()
    }

    /// Value as UTF-8, `None` if the bytes are not valid UTF-8
    pub fn value_str(&self, id: NodeId) -> Option<&str> {
        std::str::from_utf8(self.value(id)).ok()
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    #[inline]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].first_child
    }

    #[inline]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].last_child
    }

    #[inline]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].prev_sibling
    }

    #[inline]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].next_sibling
    }

    #[inline]
    pub fn first_attribute(&self, id: NodeId) -> Option<AttrId> {
        self.nodes[id.0].first_attribute
    }

    #[inline]
    pub fn last_attribute(&self, id: NodeId) -> Option<AttrId> {
        self.nodes[id.0].last_attribute
    }

    #[inline]
    pub fn attr_name(&self, id: AttrId) -> &[u8] {
        self.attributes[id.0].name.slice(&self.buffer)
    }

    #[inline]
    pub fn attr_value(&self, id: AttrId) -> &[u8] {
        self.attributes[id.0].value.slice(&self.buffer)
    }

    pub fn attr_name_str(&self, id: AttrId) -> Option<&str> {
        std::str::from_utf8(self.attr_name(id)).ok()
    }

    pub fn attr_value_str(&self, id: AttrId) -> Option<&str> {
        std::str::from_utf8(self.attr_value(id)).ok()
    }

    /// First attribute of `node` called `name`
    pub fn attribute(&self, node: NodeId, name: impl AsRef<[u8]>) -> Option<AttrId> {
        let name = name.as_ref();
        self.attributes(node).find(|&id| self.attr_name(id) == name)
    }

    /// Value of the first attribute of `node` called `name`
    pub fn attribute_value(&self, node: NodeId, name: impl AsRef<[u8]>) -> Option<&[u8]> {
        self.attribute(node, name).map(|id| self.attr_value(id))
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Copy `bytes` to the end of the buffer and return their span
    ///
    /// # Panics
    ///
    /// Panics if the buffer would grow past the 32-bit span range.
    pub(crate) fn alloc_bytes(&mut self, bytes: &[u8]) -> Span {
        let offset = self.buffer.len();
        assert!(
            offset + bytes.len() <= u32::MAX as usize,
            "document buffer exceeds the 32-bit span range"
        );
        self.buffer.extend_from_slice(bytes);
        Span::new(offset as u32, bytes.len() as u32)
    }

    /// New detached node with empty name and value
    pub fn create_node(&mut self, kind: NodeKind) -> NodeId {
        NodeId(self.nodes.alloc(Node::new(kind)))
    }

    /// New detached element called `name`
    pub fn create_element(&mut self, name: impl AsRef<[u8]>) -> NodeId {
        let id = self.create_node(NodeKind::Element);
        self.set_name(id, name);
        id
    }

    /// New detached Data node holding `value`
    pub fn create_data(&mut self, value: impl AsRef<[u8]>) -> NodeId {
        let id = self.create_node(NodeKind::Data);
        self.set_value(id, value);
        id
    }

    /// New detached attribute
    pub fn create_attribute(&mut self, name: impl AsRef<[u8]>, value: impl AsRef<[u8]>) -> AttrId {
        let name = self.alloc_bytes(name.as_ref());
        let value = self.alloc_bytes(value.as_ref());
        self.new_attribute(name, value)
    }

    pub fn set_name(&mut self, id: NodeId, name: impl AsRef<[u8]>) {
        let span = self.alloc_bytes(name.as_ref());
        self.nodes[id.0].name = span;
    }

    pub fn set_value(&mut self, id: NodeId, value: impl AsRef<[u8]>) {
        let span = self.alloc_bytes(value.as_ref());
        self.nodes[id.0].value = span;
    }

    pub fn set_attr_value(&mut self, id: AttrId, value: impl AsRef<[u8]>) {
        let span = self.alloc_bytes(value.as_ref());
        self.attributes[id.0].value = span;
    }

    // ------------------------------------------------------------------
    // Child chain
    // ------------------------------------------------------------------

    fn assert_detached(&self, child: NodeId) {
        let node = &self.nodes[child.0];
        assert!(
            child != self.root
                && node.parent.is_none()
                && node.prev_sibling.is_none()
                && node.next_sibling.is_none(),
            "node {:?} is already linked into a tree",
            child
        );
    }

    fn assert_child_of(&self, parent: NodeId, child: NodeId) {
        let node = &self.nodes[child.0];
        assert!(
            node.parent == Some(parent) && node.epoch == self.nodes[parent.0].child_epoch,
            "node {:?} is not a child of {:?}",
            child,
            parent
        );
    }

    /// Link `child` after the last child of `parent`
    ///
    /// # Panics
    ///
    /// Panics if `child` is already linked into a tree.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.assert_detached(child);
        let (last, epoch) = {
            let p = &self.nodes[parent.0];
            (p.last_child, p.child_epoch)
        };

        {
            let node = &mut self.nodes[child.0];
            node.parent = Some(parent);
            node.prev_sibling = last;
            node.epoch = epoch;
        }
        match last {
            Some(last) => self.nodes[last.0].next_sibling = Some(child),
            None => self.nodes[parent.0].first_child = Some(child),
        }
        self.nodes[parent.0].last_child = Some(child);
    }

    /// Link `child` before the first child of `parent`
    ///
    /// # Panics
    ///
    /// Panics if `child` is already linked into a tree.
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) {
        self.assert_detached(child);
        let (first, epoch) = {
            let p = &self.nodes[parent.0];
            (p.first_child, p.child_epoch)
        };

        {
            let node = &mut self.nodes[child.0];
            node.parent = Some(parent);
            node.next_sibling = first;
            node.epoch = epoch;
        }
        match first {
            Some(first) => self.nodes[first.0].prev_sibling = Some(child),
            None => self.nodes[parent.0].last_child = Some(child),
        }
        self.nodes[parent.0].first_child = Some(child);
    }

    /// Link `child` immediately before `at`
    ///
    /// # Panics
    ///
    /// Panics if `at` is not a child of `parent` or `child` is already linked.
    pub fn insert_before(&mut self, parent: NodeId, at: NodeId, child: NodeId) {
        self.assert_child_of(parent, at);
        self.assert_detached(child);
        let prev = self.nodes[at.0].prev_sibling;
        let epoch = self.nodes[parent.0].child_epoch;

        {
            let node = &mut self.nodes[child.0];
            node.parent = Some(parent);
            node.prev_sibling = prev;
            node.next_sibling = Some(at);
            node.epoch = epoch;
        }
        self.nodes[at.0].prev_sibling = Some(child);
        match prev {
            Some(prev) => self.nodes[prev.0].next_sibling = Some(child),
            None => self.nodes[parent.0].first_child = Some(child),
        }
    }

    /// Unlink and return the first child of `parent`
    pub fn remove_first_child(&mut self, parent: NodeId) -> Option<NodeId> {
        let first = self.nodes[parent.0].first_child?;
        self.remove_child(parent, first);
        Some(first)
    }

    /// Unlink and return the last child of `parent`
    pub fn remove_last_child(&mut self, parent: NodeId) -> Option<NodeId> {
        let last = self.nodes[parent.0].last_child?;
        self.remove_child(parent, last);
        Some(last)
    }

    /// Unlink `child` from `parent`, leaving it detached
    ///
    /// # Panics
    ///
    /// Panics if `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        self.assert_child_of(parent, child);
        let (prev, next) = {
            let node = &mut self.nodes[child.0];
            let links = (node.prev_sibling, node.next_sibling);
            node.parent = None;
            node.prev_sibling = None;
            node.next_sibling = None;
            links
        };

        match prev {
            Some(prev) => self.nodes[prev.0].next_sibling = next,
            None => self.nodes[parent.0].first_child = next,
        }
        match next {
            Some(next) => self.nodes[next.0].prev_sibling = prev,
            None => self.nodes[parent.0].last_child = prev,
        }
    }

    /// Forget all children of `parent` in O(1).
    ///
    /// The former children keep their stale links and arena slots; they are
    /// unreachable from the tree and cannot be linked again. Passing one of
    /// them to [`Document::remove_child`] or [`Document::insert_before`]
    /// panics.
    pub fn remove_all_children(&mut self, parent: NodeId) {
        let node = &mut self.nodes[parent.0];
        node.first_child = None;
        node.last_child = None;
        node.child_epoch = node.child_epoch.wrapping_add(1);
    }

    // ------------------------------------------------------------------
    // Attribute chain
    // ------------------------------------------------------------------

    fn assert_attr_detached(&self, attr: AttrId) {
        let a = &self.attributes[attr.0];
        assert!(
            a.parent.is_none() && a.prev.is_none() && a.next.is_none(),
            "attribute {:?} is already attached",
            attr
        );
    }

    fn assert_attr_of(&self, node: NodeId, attr: AttrId) {
        let a = &self.attributes[attr.0];
        assert!(
            a.parent == Some(node) && a.epoch == self.nodes[node.0].attr_epoch,
            "attribute {:?} does not belong to {:?}",
            attr,
            node
        );
    }

    /// Link `attr` after the last attribute of `node`
    ///
    /// # Panics
    ///
    /// Panics if `attr` is already attached.
    pub fn append_attribute(&mut self, node: NodeId, attr: AttrId) {
        self.assert_attr_detached(attr);
        let (last, epoch) = {
            let n = &self.nodes[node.0];
            (n.last_attribute, n.attr_epoch)
        };

        {
            let a = &mut self.attributes[attr.0];
            a.parent = Some(node);
            a.prev = last;
            a.epoch = epoch;
        }
        match last {
            Some(last) => self.attributes[last.0].next = Some(attr),
            None => self.nodes[node.0].first_attribute = Some(attr),
        }
        self.nodes[node.0].last_attribute = Some(attr);
    }

    /// Link `attr` before the first attribute of `node`
    ///
    /// # Panics
    ///
    /// Panics if `attr` is already attached.
    pub fn prepend_attribute(&mut self, node: NodeId, attr: AttrId) {
        self.assert_attr_detached(attr);
        let (first, epoch) = {
            let n = &self.nodes[node.0];
            (n.first_attribute, n.attr_epoch)
        };

        {
            let a = &mut self.attributes[attr.0];
            a.parent = Some(node);
            a.next = first;
            a.epoch = epoch;
        }
        match first {
            Some(first) => self.attributes[first.0].prev = Some(attr),
            None => self.nodes[node.0].last_attribute = Some(attr),
        }
        self.nodes[node.0].first_attribute = Some(attr);
    }

    /// Link `attr` immediately before `at`
    ///
    /// # Panics
    ///
    /// Panics if `at` does not belong to `node` or `attr` is already attached.
    pub fn insert_attribute(&mut self, node: NodeId, at: AttrId, attr: AttrId) {
        self.assert_attr_of(node, at);
        self.assert_attr_detached(attr);
        let prev = self.attributes[at.0].prev;
        let epoch = self.nodes[node.0].attr_epoch;

        {
            let a = &mut self.attributes[attr.0];
            a.parent = Some(node);
            a.prev = prev;
            a.next = Some(at);
            a.epoch = epoch;
        }
        self.attributes[at.0].prev = Some(attr);
        match prev {
            Some(prev) => self.attributes[prev.0].next = Some(attr),
            None => self.nodes[node.0].first_attribute = Some(attr),
        }
    }

    pub fn remove_first_attribute(&mut self, node: NodeId) -> Option<AttrId> {
        let first = self.nodes[node.0].first_attribute?;
        self.remove_attribute(node, first);
        Some(first)
    }

    pub fn remove_last_attribute(&mut self, node: NodeId) -> Option<AttrId> {
        let last = self.nodes[node.0].last_attribute?;
        self.remove_attribute(node, last);
        Some(last)
    }

    /// Unlink `attr` from `node`, leaving it detached
    ///
    /// # Panics
    ///
    /// Panics if `attr` does not belong to `node`.
    pub fn remove_attribute(&mut self, node: NodeId, attr: AttrId) {
        self.assert_attr_of(node, attr);
        let (prev, next) = {
            let a = &mut self.attributes[attr.0];
            let links = (a.prev, a.next);
            a.parent = None;
            a.prev = None;
            a.next = None;
            links
        };

        match prev {
            Some(prev) => self.attributes[prev.0].next = next,
            None => self.nodes[node.0].first_attribute = next,
        }
        match next {
            Some(next) => self.attributes[next.0].prev = prev,
            None => self.nodes[node.0].last_attribute = prev,
        }
    }

    /// Forget all attributes of `node` in O(1), like [`Document::remove_all_children`]
    pub fn remove_all_attributes(&mut self, node: NodeId) {
        let n = &mut self.nodes[node.0];
        n.first_attribute = None;
        n.last_attribute = None;
        n.attr_epoch = n.attr_epoch.wrapping_add(1);
    }
}
