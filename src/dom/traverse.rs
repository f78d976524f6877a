//! Lazy tree traversal
//!
//! All iterators borrow the document and compute the next node from the
//! links of the current one; nothing is buffered and dropping an iterator
//! early costs nothing.

use std::collections::HashMap;
use std::fmt::Write;

use super::document::Document;
use super::node::{AttrId, NodeId};

/// Iterator over the direct children of a node
pub struct Children<'d> {
    doc: &'d Document,
    next: Option<NodeId>,
}

impl<'d> Iterator for Children<'d> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.next_sibling(current);
        Some(current)
    }
}

/// Pre-order depth-first walk
///
/// Built by [`Document::traverse`] (the node, its descendants, then every
/// following sibling and their descendants) or [`Document::descendants`]
/// (the node and its descendants only).
pub struct Traverse<'d> {
    doc: &'d Document,
    next: Option<NodeId>,
    start: NodeId,
    siblings: bool,
}

impl<'d> Traverse<'d> {
    fn advance(&self, current: NodeId) -> Option<NodeId> {
        if let Some(child) = self.doc.first_child(current) {
            return Some(child);
        }

        let stop = self.doc.parent(self.start);
        let mut node = current;
        loop {
            if node == self.start && !self.siblings {
                return None;
            }
            if let Some(sibling) = self.doc.next_sibling(node) {
                return Some(sibling);
            }
            let parent = self.doc.parent(node)?;
            if Some(parent) == stop {
                return None;
            }
            node = parent;
        }
    }
}

impl<'d> Iterator for Traverse<'d> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.advance(current);
        Some(current)
    }
}

/// Iterator over the attributes of a node
pub struct Attributes<'d> {
    doc: &'d Document,
    next: Option<AttrId>,
}

impl<'d> Iterator for Attributes<'d> {
    type Item = AttrId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.attr(current).next();
        Some(current)
    }
}

impl Document {
    /// Direct children of `id` in sibling order
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            doc: self,
            next: self.first_child(id),
        }
    }

    /// `id`, its subtree, then its following siblings and their subtrees
    pub fn traverse(&self, id: NodeId) -> Traverse<'_> {
        Traverse {
            doc: self,
            next: Some(id),
            start: id,
            siblings: true,
        }
    }

    /// `id` and its subtree, never its siblings
    pub fn descendants(&self, id: NodeId) -> Traverse<'_> {
        Traverse {
            doc: self,
            next: Some(id),
            start: id,
            siblings: false,
        }
    }

    /// Attributes of `id` in document order
    pub fn attributes(&self, id: NodeId) -> Attributes<'_> {
        Attributes {
            doc: self,
            next: self.first_attribute(id),
        }
    }

    /// Number of direct children
    pub fn count_children(&self, id: NodeId) -> usize {
        self.children(id).count()
    }

    /// One-line description of a node and its links
    pub fn describe(&self, id: NodeId) -> String {
        let node = self.node(id);
        format!(
            "{:?} {} name={:?} value={:?} parent={:?} first_child={:?} last_child={:?} \
             prev={:?} next={:?} first_attr={:?} last_attr={:?}",
            id,
            node.kind(),
            String::from_utf8_lossy(self.name(id)),
            String::from_utf8_lossy(self.value(id)),
            node.parent(),
            node.first_child(),
            node.last_child(),
            node.prev_sibling(),
            node.next_sibling(),
            node.first_attribute(),
            node.last_attribute(),
        )
    }

    /// Multi-line listing of [`Document::traverse`] from `id`, one node per
    /// line, indented by depth, attributes on the lines below their node
    pub fn dump(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut depths: HashMap<NodeId, usize> = HashMap::new();

        for node in self.traverse(id) {
            let depth = self
                .parent(node)
                .and_then(|p| depths.get(&p))
                .map_or(0, |d| d + 1);
            depths.insert(node, depth);

            let indent = "-".repeat(depth);
            let _ = writeln!(
                out,
                "{}{} name={:?} value={:?}",
                indent,
                self.kind(node),
                String::from_utf8_lossy(self.name(node)),
                String::from_utf8_lossy(self.value(node)),
            );
            for attr in self.attributes(node) {
                let _ = writeln!(
                    out,
                    "{}  @{}={:?}",
                    indent,
                    String::from_utf8_lossy(self.attr_name(attr)),
                    String::from_utf8_lossy(self.attr_value(attr)),
                );
            }
        }
        out
    }
}
