//! Seams between the catalog / read core and a concrete binary format.
//!
//! The core never touches TOB1 types directly: it asks a [`FileOpener`] for a
//! [`ChannelFile`], enumerates [`ChannelDescriptor`]s and requests raw decoded
//! buffers. Tests swap in in-memory implementations.

use std::path::Path;

use crate::error::Tob1Error;
use crate::format::data_type::ElementKind;

/// A channel as discovered inside one file.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelDescriptor {
    /// Name exactly as stored in the file.
    pub name: String,
    pub element: ElementKind,
    pub unit: String,
    /// Position of the channel in the file's channel list.
    pub index: usize,
}

/// An opened file exposing its channels as raw byte buffers.
pub trait ChannelFile {
    /// All channels present in the file, in file order.
    fn channels(&self) -> &[ChannelDescriptor];

    /// Decode one channel into a contiguous little-endian buffer.
    ///
    /// The buffer length must be a faithful count of on-disk elements times
    /// the element size; it is never padded up to a nominal length.
    fn read_raw(&self, descriptor: &ChannelDescriptor) -> Result<Vec<u8>, Tob1Error>;

    /// Look up a channel by its exact on-disk name.
    fn find_channel(&self, name: &str) -> Option<&ChannelDescriptor> {
        self.channels().iter().find(|c| c.name == name)
    }
}

/// Opens files for discovery and reads. Shared across worker threads.
pub trait FileOpener: Send + Sync {
    type File: ChannelFile;

    fn open(&self, path: &Path) -> Result<Self::File, Tob1Error>;
}
