// src/format/mod.rs
pub mod data_type;
pub mod fp2;
pub mod header;
