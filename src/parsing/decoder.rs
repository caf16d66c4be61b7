use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::format::data_type::DataType;
use crate::format::fp2;

/// An enum representing the decoded value of a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedValue {
    UnsignedInteger(u64),
    SignedInteger(i64),
    Float(f64),
    Timestamp { seconds: u32, nanos: u32 },
    String(String),
}

/// Decodes one field from its on-disk bytes.
///
/// # Parameters
/// - `bytes`: exactly `data_type.byte_len()` bytes taken from a record.
/// - `data_type`: the declared type of the field.
///
/// # Returns
/// `None` if `bytes` is too short for the declared type.
pub fn decode_field_value(bytes: &[u8], data_type: DataType) -> Option<DecodedValue> {
    if bytes.len() < data_type.byte_len() {
        return None;
    }
    let value = match data_type {
        DataType::Ieee4 => DecodedValue::Float(LittleEndian::read_f32(bytes) as f64),
        DataType::Ieee4B => DecodedValue::Float(BigEndian::read_f32(bytes) as f64),
        DataType::Ieee8 => DecodedValue::Float(LittleEndian::read_f64(bytes)),
        DataType::Ieee8B => DecodedValue::Float(BigEndian::read_f64(bytes)),
        DataType::Fp2 => DecodedValue::Float(fp2::decode(BigEndian::read_u16(bytes)) as f64),
        DataType::ULong => DecodedValue::UnsignedInteger(LittleEndian::read_u32(bytes) as u64),
        DataType::Long | DataType::Bool => {
            DecodedValue::SignedInteger(LittleEndian::read_i32(bytes) as i64)
        }
        DataType::UInt2 | DataType::Bool2 => {
            DecodedValue::UnsignedInteger(LittleEndian::read_u16(bytes) as u64)
        }
        DataType::Int2 => DecodedValue::SignedInteger(LittleEndian::read_i16(bytes) as i64),
        DataType::Bool8 => DecodedValue::UnsignedInteger(bytes[0] as u64),
        DataType::SecNano => DecodedValue::Timestamp {
            seconds: LittleEndian::read_u32(&bytes[0..4]),
            nanos: LittleEndian::read_u32(&bytes[4..8]),
        },
        DataType::Ascii(width) => {
            let s: String = bytes[..width as usize].iter().map(|&b| b as char).collect();
            DecodedValue::String(s.trim_end_matches('\0').to_string())
        }
    };
    Some(value)
}

/// Appends the little-endian encoding of one field's decoded element to `out`.
///
/// Types already stored little-endian are copied verbatim; big-endian types are
/// byte swapped and FP2 is widened to an `f32`.
pub fn append_element_le(bytes: &[u8], data_type: DataType, out: &mut Vec<u8>) {
    let len = data_type.byte_len();
    match data_type {
        DataType::Ieee4B => {
            let v = BigEndian::read_f32(bytes);
            out.extend_from_slice(&v.to_le_bytes());
        }
        DataType::Ieee8B => {
            let v = BigEndian::read_f64(bytes);
            out.extend_from_slice(&v.to_le_bytes());
        }
        DataType::Fp2 => {
            let v = fp2::decode(BigEndian::read_u16(bytes));
            out.extend_from_slice(&v.to_le_bytes());
        }
        _ => out.extend_from_slice(&bytes[..len]),
    }
}
