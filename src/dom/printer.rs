//! XML serializer
//!
//! Renders a node's subtree back to XML. Uses an explicit stack so deeply
//! nested documents cannot overflow the native stack. Data and attribute
//! values are escaped; comment, CDATA, DOCTYPE and PI content is written
//! as stored.

use super::document::Document;
use super::node::{NodeId, NodeKind};
use crate::core::entities::{escape_attribute, escape_text};

/// Serializer settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrintOptions {
    /// Put the children of element-only content on their own indented lines
    pub pretty: bool,
    /// Spaces per nesting level in pretty mode
    pub indent: usize,
}

impl Default for PrintOptions {
    fn default() -> Self {
        PrintOptions {
            pretty: false,
            indent: 2,
        }
    }
}

impl PrintOptions {
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }
}

enum Step {
    Enter {
        id: NodeId,
        depth: usize,
        pretty: bool,
        line_break: bool,
    },
    Close {
        id: NodeId,
        depth: usize,
        line_break: bool,
    },
}

impl Document {
    /// Render `id` and its subtree
    pub fn render(&self, id: NodeId, options: &PrintOptions) -> Vec<u8> {
        let mut out = Vec::with_capacity(1024);
        self.render_to(id, options, &mut out);
        out
    }

    /// Render the whole document
    pub fn to_xml(&self, options: &PrintOptions) -> Vec<u8> {
        self.render(self.root(), options)
    }

    /// Append the rendering of `id` and its subtree to `out`
    pub fn render_to(&self, id: NodeId, options: &PrintOptions, out: &mut Vec<u8>) {
        let start = out.len();
        let mut stack: Vec<Step> = Vec::with_capacity(64);
        stack.push(Step::Enter {
            id,
            depth: 0,
            pretty: options.pretty,
            line_break: false,
        });

        while let Some(step) = stack.pop() {
            match step {
                Step::Close { id, depth, line_break } => {
                    if line_break {
                        new_line(out, depth * options.indent);
                    }
                    out.extend_from_slice(b"</");
                    out.extend_from_slice(self.name(id));
                    out.push(b'>');
                }
                Step::Enter {
                    id,
                    depth,
                    pretty,
                    line_break,
                } => {
                    if line_break && out.len() > start {
                        new_line(out, depth * options.indent);
                    }

                    match self.kind(id) {
                        NodeKind::Document => {
                            self.push_children(&mut stack, id, 0, pretty);
                        }
                        NodeKind::Element => {
                            out.push(b'<');
                            out.extend_from_slice(self.name(id));
                            self.write_attributes(id, out);

                            if self.first_child(id).is_none() {
                                out.extend_from_slice(b"/>");
                                continue;
                            }
                            out.push(b'>');

                            let pretty = pretty && self.element_only(id);
                            stack.push(Step::Close {
                                id,
                                depth,
                                line_break: pretty,
                            });
                            self.push_children(&mut stack, id, depth + 1, pretty);
                        }
                        NodeKind::Data => escape_text(self.value(id), out),
                        NodeKind::Cdata => {
                            out.extend_from_slice(b"<![CDATA[");
                            out.extend_from_slice(self.value(id));
                            out.extend_from_slice(b"]]>");
                        }
                        NodeKind::Comment => {
                            out.extend_from_slice(b"<!--");
                            out.extend_from_slice(self.value(id));
                            out.extend_from_slice(b"-->");
                        }
                        NodeKind::Declaration => {
                            out.extend_from_slice(b"<?xml");
                            self.write_attributes(id, out);
                            if self.first_attribute(id).is_none() {
                                // the parser needs whitespace after `<?xml`
                                out.push(b' ');
                            }
                            out.extend_from_slice(b"?>");
                        }
                        NodeKind::Doctype => {
                            out.extend_from_slice(b"<!DOCTYPE ");
                            out.extend_from_slice(self.value(id));
                            out.push(b'>');
                            self.push_children(&mut stack, id, depth, pretty);
                        }
                        NodeKind::Pi => {
                            out.extend_from_slice(b"<?");
                            out.extend_from_slice(self.name(id));
                            let value = self.value(id);
                            if !value.is_empty() {
                                out.push(b' ');
                                out.extend_from_slice(value);
                            }
                            out.extend_from_slice(b"?>");
                        }
                    }
                }
            }
        }
    }

    /// Push children in reverse so they pop in document order
    fn push_children(&self, stack: &mut Vec<Step>, id: NodeId, depth: usize, pretty: bool) {
        let mut child = self.last_child(id);
        while let Some(cid) = child {
            stack.push(Step::Enter {
                id: cid,
                depth,
                pretty,
                line_break: pretty,
            });
            child = self.prev_sibling(cid);
        }
    }

    fn write_attributes(&self, id: NodeId, out: &mut Vec<u8>) {
        for attr in self.attributes(id) {
            out.push(b' ');
            out.extend_from_slice(self.attr_name(attr));
            out.extend_from_slice(b"=\"");
            escape_attribute(self.attr_value(attr), out);
            out.push(b'"');
        }
    }

    /// No Data or CDATA among the direct children
    fn element_only(&self, id: NodeId) -> bool {
        self.children(id)
            .all(|c| !matches!(self.kind(c), NodeKind::Data | NodeKind::Cdata))
    }
}

fn new_line(out: &mut Vec<u8>, spaces: usize) {
    out.push(b'\n');
    out.resize(out.len() + spaces, b' ');
}
