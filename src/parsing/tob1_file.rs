use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

use crate::error::Tob1Error;
use crate::format::header::Tob1Header;
use crate::parsing::raw_channel::RawChannel;

#[derive(Debug)]
pub struct Tob1File {
    pub header: Tob1Header,
    pub raw_channels: Vec<RawChannel>,
    pub mmap: Mmap, // Keep the mmap in the Tob1File to guarantee lifetime for our slices.
}

impl Tob1File {
    /// Parse a TOB1 file from a given file path.
    ///
    /// # Arguments
    /// * `path` - Path to the `.dat` file on disk.
    ///
    /// # Returns
    /// A [`Tob1File`] with the header parsed and one [`RawChannel`] per field,
    /// or a [`Tob1Error`] if the file could not be read or its header decoded.
    pub fn parse_from_file(path: impl AsRef<Path>) -> Result<Self, Tob1Error> {
        let file = File::open(path.as_ref())?;
        let mmap = unsafe { Mmap::map(&file)? };

        let header = Tob1Header::from_bytes(&mmap)?;

        let raw_channels = header
            .fields
            .iter()
            .enumerate()
            .map(|(index, field)| RawChannel {
                index,
                byte_offset: header.field_offset(index),
                data_type: field.data_type,
            })
            .collect();

        Ok(Self { header, raw_channels, mmap })
    }

    /// The binary record area following the header.
    pub fn data(&self) -> &[u8] {
        &self.mmap[self.header.header_len..]
    }

    /// Number of complete records. A trailing partial record (e.g. from a logger
    /// that stopped mid-write) is not counted.
    pub fn record_count(&self) -> usize {
        let record_len = self.header.record_len();
        if record_len == 0 {
            return 0;
        }
        self.data().len() / record_len
    }

    /// Iterate over complete records.
    pub fn records(&self) -> impl Iterator<Item = &[u8]> {
        let record_len = self.header.record_len().max(1);
        self.data().chunks_exact(record_len)
    }
}
