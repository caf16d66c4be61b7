pub mod error;
pub mod format;
pub mod writer;

pub mod normalize;
pub mod cancel;
pub mod config;
pub mod indexer;
pub mod catalog;
pub mod extract;
pub mod read;

pub mod parsing {
    pub mod decoder;
    pub mod tob1_file;
    pub mod raw_channel;
}

pub mod api;
