//! Implementation of the Tob1Writer struct split across several submodules

use std::fs::File;
use std::io::BufWriter;

use crate::format::header::Tob1Header;

mod io;
mod data;

/// Writer for TOB1 files. The header is written on creation; records are
/// appended one at a time.
pub struct Tob1Writer {
    file: BufWriter<File>,
    header: Tob1Header,
    offset: u64,
    record_count: u64,
}
