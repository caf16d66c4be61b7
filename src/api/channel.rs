use crate::format::data_type::DataType;
use crate::format::header::FieldInfo;
use crate::parsing::decoder::DecodedValue;
use crate::parsing::raw_channel::RawChannel;
use crate::parsing::tob1_file::Tob1File;

/// High level handle for a single field of a TOB1 file.
///
/// It holds references to the header entry and the raw channel and allows
/// convenient access to metadata and decoded values.
pub struct Channel<'a> {
    field:       &'a FieldInfo,
    raw_channel: &'a RawChannel,
    file:        &'a Tob1File,
}

impl<'a> Channel<'a> {
    /// Construct a new [`Channel`] from raw references.
    ///
    /// # Arguments
    /// * `field` - Header entry containing name, unit and type
    /// * `raw_channel` - Raw channel helper used to iterate samples
    /// * `file` - Memory mapped file backing all data
    pub fn new(field: &'a FieldInfo, raw_channel: &'a RawChannel, file: &'a Tob1File) -> Self {
        Channel { field, raw_channel, file }
    }

    pub fn name(&self) -> &str {
        &self.field.name
    }

    pub fn unit(&self) -> &str {
        &self.field.unit
    }

    /// Processing instruction from the fourth header line (`Smp`, `Avg`, ...).
    pub fn processing(&self) -> &str {
        &self.field.processing
    }

    pub fn data_type(&self) -> DataType {
        self.field.data_type
    }

    /// Decode all samples of this channel.
    ///
    /// # Returns
    /// A vector with one [`DecodedValue`] per complete record.
    pub fn values(&self) -> Vec<DecodedValue> {
        self.raw_channel.values(self.file)
    }
}
