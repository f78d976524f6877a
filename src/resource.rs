//! ResourceArc wrapper
//!
//! Keeps a parsed document alive on the BEAM side so later calls can walk
//! or render it without re-parsing.

use rustler::ResourceArc;

use crate::dom::Document;

/// A parsed document owned by the VM
pub struct DocumentResource {
    pub doc: Document,
}

impl DocumentResource {
    pub fn new(doc: Document) -> Self {
        DocumentResource { doc }
    }
}

#[rustler::resource_impl]
impl rustler::Resource for DocumentResource {}

/// Type alias for the ResourceArc
pub type DocumentRef = ResourceArc<DocumentResource>;
