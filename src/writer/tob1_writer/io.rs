// File handling for Tob1Writer
use super::*;
use std::io::Write;
use std::path::Path;

use crate::error::Tob1Error;
use crate::format::header::FieldInfo;

impl Tob1Writer {
    /// Creates a new TOB1 file at `path` (overwrites existing) and writes its header.
    ///
    /// # Arguments
    /// * `path` - Destination file
    /// * `environment` - Station and logger fields following `"TOB1"` on the first line
    /// * `fields` - Record layout, in record order
    pub fn new(
        path: impl AsRef<Path>,
        environment: Vec<String>,
        fields: Vec<FieldInfo>,
    ) -> Result<Self, Tob1Error> {
        let mut header = Tob1Header { environment, fields, header_len: 0 };
        let header_bytes = header.to_bytes();
        header.header_len = header_bytes.len();

        let mut file = BufWriter::new(File::create(path)?);
        file.write_all(&header_bytes)?;
        Ok(Tob1Writer {
            file,
            offset: header_bytes.len() as u64,
            header,
            record_count: 0,
        })
    }

    pub fn header(&self) -> &Tob1Header {
        &self.header
    }

    /// Returns the current file offset.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    /// Appends raw bytes after the last record, e.g. a partial trailing record.
    pub fn write_raw(&mut self, bytes: &[u8]) -> Result<(), Tob1Error> {
        self.file.write_all(bytes)?;
        self.offset += bytes.len() as u64;
        Ok(())
    }

    /// Finalizes the file (flushes all data to disk).
    pub fn finalize(mut self) -> Result<(), Tob1Error> {
        self.file.flush()?;
        Ok(())
    }
}
