use serde::{Deserialize, Serialize};

use crate::error::Tob1Error;

/// On-disk field type as declared on the fifth TOB1 header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// IEEE754 single precision, little-endian
    Ieee4,
    /// IEEE754 single precision, big-endian
    Ieee4B,
    /// IEEE754 double precision, little-endian
    Ieee8,
    /// IEEE754 double precision, big-endian
    Ieee8B,
    /// Campbell two byte floating point, big-endian
    Fp2,
    /// 32 bit unsigned integer (`ULONG`, `UINT4`)
    ULong,
    /// 32 bit signed integer (`LONG`, `INT4`)
    Long,
    /// 16 bit unsigned integer
    UInt2,
    /// 16 bit signed integer
    Int2,
    /// 4 byte boolean
    Bool,
    /// 2 byte boolean
    Bool2,
    /// 1 byte boolean
    Bool8,
    /// Seconds and nanoseconds since 1990, two u32 values
    SecNano,
    /// Fixed width, NUL padded text
    Ascii(u16),
}

/// Primitive element produced when a field is decoded into a byte buffer.
///
/// Decoded buffers always hold little-endian values of this kind, which is
/// not necessarily the on-disk encoding (FP2 is widened to `F32`, big-endian
/// types are byte swapped).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
    Timestamp,
    Text(u16),
}

impl ElementKind {
    /// Size in bytes of one decoded element.
    pub fn size(&self) -> usize {
        match self {
            ElementKind::U8 | ElementKind::I8 => 1,
            ElementKind::U16 | ElementKind::I16 => 2,
            ElementKind::U32 | ElementKind::I32 | ElementKind::F32 => 4,
            ElementKind::U64 | ElementKind::I64 | ElementKind::F64 => 8,
            ElementKind::Timestamp => 8,
            ElementKind::Text(width) => *width as usize,
        }
    }
}

impl DataType {
    /// Parse a type name from the header. Names are case sensitive except for
    /// the `ASCII(n)` form.
    pub fn from_name(name: &str) -> Result<Self, Tob1Error> {
        let dt = match name.trim() {
            "IEEE4" | "IEEE4L" => DataType::Ieee4,
            "IEEE4B" => DataType::Ieee4B,
            "IEEE8" | "IEEE8L" => DataType::Ieee8,
            "IEEE8B" => DataType::Ieee8B,
            "FP2" => DataType::Fp2,
            "ULONG" | "UINT4" => DataType::ULong,
            "LONG" | "INT4" => DataType::Long,
            "UINT2" => DataType::UInt2,
            "INT2" => DataType::Int2,
            "BOOL" => DataType::Bool,
            "BOOL2" => DataType::Bool2,
            "BOOL8" => DataType::Bool8,
            "SecNano" | "SECNANO" => DataType::SecNano,
            other => {
                let upper = other.to_ascii_uppercase();
                let width = upper
                    .strip_prefix("ASCII(")
                    .and_then(|rest| rest.strip_suffix(')'))
                    .and_then(|digits| digits.parse::<u16>().ok())
                    .filter(|w| *w > 0)
                    .ok_or_else(|| Tob1Error::UnknownDataType(other.to_string()))?;
                DataType::Ascii(width)
            }
        };
        Ok(dt)
    }

    /// Canonical name written to the header.
    pub fn name(&self) -> String {
        match self {
            DataType::Ieee4 => "IEEE4".to_string(),
            DataType::Ieee4B => "IEEE4B".to_string(),
            DataType::Ieee8 => "IEEE8".to_string(),
            DataType::Ieee8B => "IEEE8B".to_string(),
            DataType::Fp2 => "FP2".to_string(),
            DataType::ULong => "ULONG".to_string(),
            DataType::Long => "LONG".to_string(),
            DataType::UInt2 => "UINT2".to_string(),
            DataType::Int2 => "INT2".to_string(),
            DataType::Bool => "BOOL".to_string(),
            DataType::Bool2 => "BOOL2".to_string(),
            DataType::Bool8 => "BOOL8".to_string(),
            DataType::SecNano => "SecNano".to_string(),
            DataType::Ascii(width) => format!("ASCII({})", width),
        }
    }

    /// Number of bytes the field occupies inside a record.
    pub fn byte_len(&self) -> usize {
        match self {
            DataType::Ieee4 | DataType::Ieee4B => 4,
            DataType::Ieee8 | DataType::Ieee8B => 8,
            DataType::Fp2 => 2,
            DataType::ULong | DataType::Long | DataType::Bool => 4,
            DataType::UInt2 | DataType::Int2 | DataType::Bool2 => 2,
            DataType::Bool8 => 1,
            DataType::SecNano => 8,
            DataType::Ascii(width) => *width as usize,
        }
    }

    /// The primitive kind this field decodes to.
    pub fn element_kind(&self) -> ElementKind {
        match self {
            DataType::Ieee4 | DataType::Ieee4B | DataType::Fp2 => ElementKind::F32,
            DataType::Ieee8 | DataType::Ieee8B => ElementKind::F64,
            DataType::ULong => ElementKind::U32,
            DataType::Long | DataType::Bool => ElementKind::I32,
            DataType::UInt2 | DataType::Bool2 => ElementKind::U16,
            DataType::Int2 => ElementKind::I16,
            DataType::Bool8 => ElementKind::U8,
            DataType::SecNano => ElementKind::Timestamp,
            DataType::Ascii(width) => ElementKind::Text(*width),
        }
    }
}
