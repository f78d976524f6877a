//! Parsing Strategy Module
//!
//! A single buffer is always parsed on the calling thread. Batches of
//! independent buffers can be spread over a rayon pool; every parse owns its
//! own arenas, so workers never share mutable state.

pub mod parallel;

pub use parallel::{parse_many, parse_map};
