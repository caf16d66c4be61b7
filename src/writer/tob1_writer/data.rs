// Record encoding
use super::*;
use std::io::Write;

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};

use crate::error::Tob1Error;
use crate::format::data_type::DataType;
use crate::format::fp2;
use crate::parsing::decoder::DecodedValue;

fn encode_field(buf: &mut Vec<u8>, data_type: DataType, value: &DecodedValue) -> Result<(), Tob1Error> {
    let mismatch = || {
        Tob1Error::InvalidConfig(format!("value {:?} cannot be written as {}", value, data_type.name()))
    };
    match (data_type, value) {
        (DataType::Ieee4, DecodedValue::Float(v)) => buf.write_f32::<LittleEndian>(*v as f32)?,
        (DataType::Ieee4B, DecodedValue::Float(v)) => buf.write_f32::<BigEndian>(*v as f32)?,
        (DataType::Ieee8, DecodedValue::Float(v)) => buf.write_f64::<LittleEndian>(*v)?,
        (DataType::Ieee8B, DecodedValue::Float(v)) => buf.write_f64::<BigEndian>(*v)?,
        (DataType::Fp2, DecodedValue::Float(v)) => buf.write_u16::<BigEndian>(fp2::encode(*v as f32))?,
        (DataType::ULong, DecodedValue::UnsignedInteger(v)) => buf.write_u32::<LittleEndian>(*v as u32)?,
        (DataType::Long | DataType::Bool, DecodedValue::SignedInteger(v)) => {
            buf.write_i32::<LittleEndian>(*v as i32)?
        }
        (DataType::UInt2 | DataType::Bool2, DecodedValue::UnsignedInteger(v)) => {
            buf.write_u16::<LittleEndian>(*v as u16)?
        }
        (DataType::Int2, DecodedValue::SignedInteger(v)) => buf.write_i16::<LittleEndian>(*v as i16)?,
        (DataType::Bool8, DecodedValue::UnsignedInteger(v)) => buf.write_u8(*v as u8)?,
        (DataType::SecNano, DecodedValue::Timestamp { seconds, nanos }) => {
            buf.write_u32::<LittleEndian>(*seconds)?;
            buf.write_u32::<LittleEndian>(*nanos)?;
        }
        (DataType::Ascii(width), DecodedValue::String(s)) => {
            let mut bytes = s.as_bytes().to_vec();
            bytes.resize(width as usize, 0);
            buf.extend_from_slice(&bytes);
        }
        _ => return Err(mismatch()),
    }
    Ok(())
}

impl Tob1Writer {
    /// Append one record. `values` must hold one value per field, in field order.
    pub fn write_record(&mut self, values: &[DecodedValue]) -> Result<(), Tob1Error> {
        if values.len() != self.header.fields.len() {
            return Err(Tob1Error::InvalidConfig(format!(
                "record has {} values, but the file has {} fields",
                values.len(),
                self.header.fields.len()
            )));
        }

        let mut buf = Vec::with_capacity(self.header.record_len());
        for (field, value) in self.header.fields.iter().zip(values) {
            encode_field(&mut buf, field.data_type, value)?;
        }

        self.file.write_all(&buf)?;
        self.offset += buf.len() as u64;
        self.record_count += 1;
        Ok(())
    }

    /// Append multiple records sequentially.
    pub fn write_records<'a, I>(&mut self, records: I) -> Result<(), Tob1Error>
    where
        I: IntoIterator<Item = &'a [DecodedValue]>,
    {
        for record in records {
            self.write_record(record)?;
        }
        Ok(())
    }
}
