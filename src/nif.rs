//! Erlang/Elixir NIF bindings
//!
//! `parse/2` runs on a dirty CPU scheduler since a single call may consume
//! hundreds of megabytes.

use rustler::{Binary, Encoder, Env, NifResult, ResourceArc, Term};

use crate::core::parser::{parse_document, ParseOptions};
use crate::dom::PrintOptions;
use crate::resource::{DocumentRef, DocumentResource};
use crate::term::{self, bytes_to_binary, node_to_term};

/// Parse XML, returning `{:ok, doc}` or `{:error, message}`
#[rustler::nif(schedule = "DirtyCpu")]
fn parse<'a>(env: Env<'a>, input: Binary<'a>, validate_closing_tags: bool) -> NifResult<Term<'a>> {
    let options = ParseOptions::default().validate_closing_tags(validate_closing_tags);
    match parse_document(input.as_slice().to_vec(), &options) {
        Ok(doc) => {
            let arc = ResourceArc::new(DocumentResource::new(doc));
            Ok((term::ok(), arc).encode(env))
        }
        Err(err) => Ok((term::error(), err.to_string()).encode(env)),
    }
}

/// The whole document as nested tuples
#[rustler::nif(schedule = "DirtyCpu")]
fn to_tree<'a>(env: Env<'a>, doc_ref: DocumentRef) -> NifResult<Term<'a>> {
    let doc = &doc_ref.doc;
    Ok(node_to_term(env, doc, doc.root()))
}

/// Serialize the document back to XML
#[rustler::nif(schedule = "DirtyCpu")]
fn render<'a>(env: Env<'a>, doc_ref: DocumentRef, pretty: bool) -> NifResult<Term<'a>> {
    let xml = doc_ref.doc.to_xml(&PrintOptions::default().pretty(pretty));
    Ok(bytes_to_binary(env, &xml))
}

rustler::init!("Elixir.InsituXml.Native");
