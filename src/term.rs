//! Elixir Term Conversion Utilities
//!
//! Converts document nodes to Elixir terms:
//!
//! - Document: `{:document, children}`
//! - Element: `{:element, name, [{name, value}], children}`
//! - Data: the text as a binary
//! - Cdata / Comment / Doctype: `{:cdata | :comment | :doctype, value}`
//! - Pi: `{:pi, target, value}`
//! - Declaration: `{:declaration, [{name, value}]}`

use rustler::{Encoder, Env, NewBinary, Term};

use crate::dom::{Document, NodeId, NodeKind};

rustler::atoms! {
    ok,
    error,
    document,
    element,
    cdata,
    comment,
    doctype,
    pi,
    declaration,
}

/// Convert a node and its subtree to an Elixir term
pub fn node_to_term<'a>(env: Env<'a>, doc: &Document, id: NodeId) -> Term<'a> {
    match doc.kind(id) {
        NodeKind::Document => (document(), children_to_term(env, doc, id)).encode(env),
        NodeKind::Element => (
            element(),
            bytes_to_binary(env, doc.name(id)),
            attributes_to_term(env, doc, id),
            children_to_term(env, doc, id),
        )
            .encode(env),
        NodeKind::Data => bytes_to_binary(env, doc.value(id)),
        NodeKind::Cdata => (cdata(), bytes_to_binary(env, doc.value(id))).encode(env),
        NodeKind::Comment => (comment(), bytes_to_binary(env, doc.value(id))).encode(env),
        NodeKind::Doctype => (doctype(), bytes_to_binary(env, doc.value(id))).encode(env),
        NodeKind::Pi => (
            pi(),
            bytes_to_binary(env, doc.name(id)),
            bytes_to_binary(env, doc.value(id)),
        )
            .encode(env),
        NodeKind::Declaration => (declaration(), attributes_to_term(env, doc, id)).encode(env),
    }
}

/// Children in document order, built back to front with `last_child`/`prev_sibling`
fn children_to_term<'a>(env: Env<'a>, doc: &Document, id: NodeId) -> Term<'a> {
    let mut list = Term::list_new_empty(env);
    let mut child = doc.last_child(id);
    while let Some(cid) = child {
        list = list.list_prepend(node_to_term(env, doc, cid));
        child = doc.prev_sibling(cid);
    }
    list
}

fn attributes_to_term<'a>(env: Env<'a>, doc: &Document, id: NodeId) -> Term<'a> {
    let mut list = Term::list_new_empty(env);
    let mut attr = doc.last_attribute(id);
    while let Some(aid) = attr {
        let pair = (
            bytes_to_binary(env, doc.attr_name(aid)),
            bytes_to_binary(env, doc.attr_value(aid)),
        );
        list = list.list_prepend(pair.encode(env));
        attr = doc.attr(aid).prev();
    }
    list
}

/// Create a binary from bytes
pub fn bytes_to_binary<'a>(env: Env<'a>, bytes: &[u8]) -> Term<'a> {
    let mut binary = NewBinary::new(env, bytes.len());
    binary.as_mut_slice().copy_from_slice(bytes);
    binary.into()
}
