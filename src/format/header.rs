//! TOB1 ASCII header.
//!
//! A TOB1 file starts with five text lines of double-quoted, comma separated
//! fields, each terminated by CRLF (a bare LF is accepted):
//!
//! 1. file type (`"TOB1"`) followed by station and logger information
//! 2. field names
//! 3. units
//! 4. processing (e.g. `"Smp"`, `"Avg"`)
//! 5. data types
//!
//! The binary records follow immediately after the fifth line.

use nom::{
    IResult, Parser,
    bytes::complete::take_till,
    character::complete::{char, line_ending},
    multi::separated_list1,
    sequence::{delimited, terminated},
};
use serde::{Deserialize, Serialize};

use crate::error::Tob1Error;
use crate::format::data_type::DataType;

pub const FILE_TYPE: &str = "TOB1";
pub const HEADER_LINES: usize = 5;

/// One column of the record layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub name: String,
    pub unit: String,
    pub processing: String,
    pub data_type: DataType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tob1Header {
    /// Remaining fields of the first line (station name, logger model, ...)
    pub environment: Vec<String>,
    pub fields: Vec<FieldInfo>,
    /// Number of bytes occupied by the header, i.e. the offset of the first record.
    pub header_len: usize,
}

fn quoted_field(input: &[u8]) -> IResult<&[u8], &[u8]> {
    delimited(char('"'), take_till(|b| b == b'"'), char('"')).parse(input)
}

fn header_line(input: &[u8]) -> IResult<&[u8], Vec<&[u8]>> {
    terminated(separated_list1(char(','), quoted_field), line_ending).parse(input)
}

fn to_strings(fields: Vec<&[u8]>) -> Vec<String> {
    fields
        .into_iter()
        .map(|f| String::from_utf8_lossy(f).into_owned())
        .collect()
}

impl Tob1Header {
    /// Parse the header from the start of a file.
    ///
    /// # Arguments
    /// * `bytes` - File contents, at least the complete header.
    ///
    /// # Returns
    /// The parsed [`Tob1Header`] with `header_len` set to the offset of the
    /// first binary record, or a [`Tob1Error`] describing the first bad line.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Tob1Error> {
        let mut rest = bytes;
        let mut lines: Vec<Vec<String>> = Vec::with_capacity(HEADER_LINES);
        for line in 1..=HEADER_LINES {
            let (next, fields) = header_line(rest).map_err(|_| Tob1Error::HeaderError {
                line,
                message: "expected a CRLF terminated list of quoted fields".to_string(),
            })?;
            lines.push(to_strings(fields));
            rest = next;
        }
        let header_len = bytes.len() - rest.len();

        let mut first = lines.remove(0);
        let file_type = first.remove(0);
        if file_type != FILE_TYPE {
            return Err(Tob1Error::FileTypeError(file_type));
        }

        let names = &lines[0];
        for (idx, line) in lines.iter().enumerate().skip(1) {
            if line.len() != names.len() {
                return Err(Tob1Error::HeaderError {
                    line: idx + 2,
                    message: format!("{} fields, but {} field names", line.len(), names.len()),
                });
            }
        }

        let mut fields = Vec::with_capacity(names.len());
        for i in 0..names.len() {
            fields.push(FieldInfo {
                name: lines[0][i].clone(),
                unit: lines[1][i].clone(),
                processing: lines[2][i].clone(),
                data_type: DataType::from_name(&lines[3][i])?,
            });
        }

        Ok(Tob1Header { environment: first, fields, header_len })
    }

    /// Serialize the header lines (CRLF terminated).
    pub fn to_bytes(&self) -> Vec<u8> {
        fn line(out: &mut Vec<u8>, items: impl Iterator<Item = String>) {
            let quoted: Vec<String> = items.map(|s| format!("\"{}\"", s)).collect();
            out.extend_from_slice(quoted.join(",").as_bytes());
            out.extend_from_slice(b"\r\n");
        }

        let mut out = Vec::new();
        line(
            &mut out,
            std::iter::once(FILE_TYPE.to_string()).chain(self.environment.iter().cloned()),
        );
        line(&mut out, self.fields.iter().map(|f| f.name.clone()));
        line(&mut out, self.fields.iter().map(|f| f.unit.clone()));
        line(&mut out, self.fields.iter().map(|f| f.processing.clone()));
        line(&mut out, self.fields.iter().map(|f| f.data_type.name()));
        out
    }

    /// Size of one binary record in bytes.
    pub fn record_len(&self) -> usize {
        self.fields.iter().map(|f| f.data_type.byte_len()).sum()
    }

    /// Byte offset of the field at `index` inside a record.
    pub fn field_offset(&self, index: usize) -> usize {
        self.fields[..index].iter().map(|f| f.data_type.byte_len()).sum()
    }
}
