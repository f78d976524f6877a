//! Parallel batch parsing
//!
//! Uses Rayon to parse many independent buffers at once.

use rayon::prelude::*;
use tracing::debug;

use crate::core::parser::{parse_document, ParseOptions};
use crate::dom::Document;
use crate::error::Result;

/// Parse every input in parallel, keeping input order in the output
pub fn parse_many<I>(inputs: Vec<I>, options: &ParseOptions) -> Vec<Result<Document>>
where
    I: Into<Vec<u8>> + Send,
{
    debug!(inputs = inputs.len(), "batch parse");
    inputs
        .into_par_iter()
        .map(|input| parse_document(input.into(), options))
        .collect()
}

/// Parse every input in parallel and reduce each document with `mapper`.
///
/// Each document is dropped as soon as it has been mapped, so a batch of
/// large inputs never holds more than one tree per worker.
pub fn parse_map<I, F, T>(inputs: Vec<I>, options: &ParseOptions, mapper: F) -> Vec<Result<T>>
where
    I: Into<Vec<u8>> + Send,
    F: Fn(&Document) -> T + Sync + Send,
    T: Send,
{
    debug!(inputs = inputs.len(), "batch parse with mapping");
    inputs
        .into_par_iter()
        .map(|input| parse_document(input.into(), options).map(|doc| mapper(&doc)))
        .collect()
}
