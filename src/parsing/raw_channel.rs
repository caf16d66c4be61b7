use crate::format::data_type::DataType;
use crate::parsing::decoder::{DecodedValue, append_element_le, decode_field_value};
use crate::parsing::tob1_file::Tob1File;

/// A field with lazy access to its bytes inside every record.
#[derive(Debug, Clone)]
pub struct RawChannel {
    pub index: usize,
    pub byte_offset: usize,
    pub data_type: DataType,
}

impl RawChannel {
    /// This field's slice of every complete record.
    pub fn records<'a>(&self, file: &'a Tob1File) -> impl Iterator<Item = &'a [u8]> + use<'a> {
        let start = self.byte_offset;
        let end = start + self.data_type.byte_len();
        file.records().map(move |rec| &rec[start..end])
    }

    /// De-interleave this field into one contiguous little-endian buffer.
    ///
    /// The result holds exactly `record_count * element_size` bytes.
    pub fn read_le_bytes(&self, file: &Tob1File) -> Vec<u8> {
        let element_size = self.data_type.element_kind().size();
        let mut out = Vec::with_capacity(file.record_count() * element_size);
        for bytes in self.records(file) {
            append_element_le(bytes, self.data_type, &mut out);
        }
        out
    }

    /// Decode every sample of this field.
    pub fn values(&self, file: &Tob1File) -> Vec<DecodedValue> {
        self.records(file)
            .filter_map(|bytes| decode_field_value(bytes, self.data_type))
            .collect()
    }
}
