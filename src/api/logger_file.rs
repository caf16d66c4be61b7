use std::path::Path;

use crate::api::channel::Channel;
use crate::api::channel_file::{ChannelDescriptor, ChannelFile, FileOpener};
use crate::error::Tob1Error;
use crate::parsing::tob1_file::Tob1File;

#[derive(Debug)]
/// High level representation of a TOB1 logger file.
///
/// The struct stores the memory mapped file internally and exposes its fields
/// both as [`ChannelDescriptor`]s for the catalog and as [`Channel`] handles
/// for direct inspection.
pub struct LoggerFile {
    raw: Tob1File,
    descriptors: Vec<ChannelDescriptor>,
}

impl LoggerFile {
    /// Parse a TOB1 file from disk.
    ///
    /// # Arguments
    /// * `path` - Path to the `.dat` file.
    ///
    /// # Returns
    /// A new [`LoggerFile`] on success or [`Tob1Error`] on failure.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Tob1Error> {
        let raw = Tob1File::parse_from_file(path)?;
        let descriptors = raw
            .header
            .fields
            .iter()
            .enumerate()
            .map(|(index, field)| ChannelDescriptor {
                name: field.name.clone(),
                element: field.data_type.element_kind(),
                unit: field.unit.clone(),
                index,
            })
            .collect();
        Ok(LoggerFile { raw, descriptors })
    }

    /// Station and logger information from the first header line.
    pub fn environment(&self) -> &[String] {
        &self.raw.header.environment
    }

    /// Number of complete records in the file.
    pub fn record_count(&self) -> usize {
        self.raw.record_count()
    }

    /// Build a [`Channel`] handle for every field; none of them is decoded yet.
    pub fn channel_handles(&self) -> Vec<Channel<'_>> {
        self.raw
            .raw_channels
            .iter()
            .map(|raw_channel| {
                Channel::new(&self.raw.header.fields[raw_channel.index], raw_channel, &self.raw)
            })
            .collect()
    }
}

impl ChannelFile for LoggerFile {
    fn channels(&self) -> &[ChannelDescriptor] {
        &self.descriptors
    }

    fn read_raw(&self, descriptor: &ChannelDescriptor) -> Result<Vec<u8>, Tob1Error> {
        // Descriptors from another file may carry a stale index.
        let known = self
            .descriptors
            .get(descriptor.index)
            .is_some_and(|d| d.name == descriptor.name);
        let raw_channel = self
            .raw
            .raw_channels
            .get(descriptor.index)
            .filter(|_| known)
            .ok_or_else(|| Tob1Error::ChannelNotFound(descriptor.name.clone()))?;
        Ok(raw_channel.read_le_bytes(&self.raw))
    }
}

/// [`FileOpener`] for TOB1 files on the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tob1Opener;

impl FileOpener for Tob1Opener {
    type File = LoggerFile;

    fn open(&self, path: &Path) -> Result<LoggerFile, Tob1Error> {
        LoggerFile::from_file(path)
    }
}
