//! TOB1 writer module for tob1-rs
//!
//! Produces files in the same layout the parser reads: the five line ASCII
//! header followed by fixed size binary records.

pub mod tob1_writer;
pub use tob1_writer::Tob1Writer;
