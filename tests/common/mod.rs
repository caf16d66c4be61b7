#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tob1_rs::api::{ChannelDescriptor, ChannelFile, FileOpener};
use tob1_rs::error::Tob1Error;
use tob1_rs::format::data_type::{DataType, ElementKind};
use tob1_rs::format::header::FieldInfo;
use tob1_rs::parsing::decoder::DecodedValue;
use tob1_rs::writer::Tob1Writer;

fn field(name: &str, unit: &str, data_type: DataType) -> FieldInfo {
    FieldInfo {
        name: name.to_string(),
        unit: unit.to_string(),
        processing: "Smp".to_string(),
        data_type,
    }
}

/// Field layout of the sonic anemometer files used across the tests.
pub fn sonic_fields() -> Vec<FieldInfo> {
    vec![
        field("TIMESTAMP", "SECONDS", DataType::SecNano),
        field("RECORD", "RN", DataType::ULong),
        field("Vx", "m/s", DataType::Ieee4),
        field("SonicTempC", "C", DataType::Fp2),
        field("123", "", DataType::Ieee4),
    ]
}

pub fn sonic_temperature(record: u32) -> f64 {
    20.0 + (record % 50) as f64 / 10.0
}

/// Write a sonic file with `records` records. `Vx` of record `i` is `first_vx + i`.
pub fn write_sonic_file(path: &Path, records: u32, first_vx: f32) -> Result<(), Tob1Error> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let environment = vec!["TOWER".to_string(), "CR3000".to_string(), "1234".to_string()];
    let mut writer = Tob1Writer::new(path, environment, sonic_fields())?;
    for i in 0..records {
        writer.write_record(&[
            DecodedValue::Timestamp { seconds: 815_000_000 + i / 20, nanos: (i % 20) * 50_000_000 },
            DecodedValue::UnsignedInteger(i as u64),
            DecodedValue::Float((first_vx + i as f32) as f64),
            DecodedValue::Float(sonic_temperature(i)),
            DecodedValue::Float(0.0),
        ])?;
    }
    writer.finalize()
}

pub fn f32_at(data: &[u8], index: usize) -> f32 {
    let bytes: [u8; 4] = data[index * 4..index * 4 + 4].try_into().unwrap();
    f32::from_le_bytes(bytes)
}

pub fn f32_buffer(values: impl IntoIterator<Item = f32>) -> Vec<u8> {
    values.into_iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// In-memory file: channel descriptors plus one decoded buffer per channel.
#[derive(Debug, Clone, Default)]
pub struct MemFile {
    pub channels: Vec<ChannelDescriptor>,
    pub buffers: Vec<Vec<u8>>,
}

impl MemFile {
    pub fn with_channel(mut self, name: &str, element: ElementKind, buffer: Vec<u8>) -> Self {
        let index = self.channels.len();
        self.channels.push(ChannelDescriptor {
            name: name.to_string(),
            element,
            unit: String::new(),
            index,
        });
        self.buffers.push(buffer);
        self
    }
}

impl ChannelFile for MemFile {
    fn channels(&self) -> &[ChannelDescriptor] {
        &self.channels
    }

    fn read_raw(&self, descriptor: &ChannelDescriptor) -> Result<Vec<u8>, Tob1Error> {
        self.buffers
            .get(descriptor.index)
            .cloned()
            .ok_or_else(|| Tob1Error::ChannelNotFound(descriptor.name.clone()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemOpener {
    pub files: HashMap<PathBuf, MemFile>,
}

impl MemOpener {
    pub fn with_file(mut self, path: impl Into<PathBuf>, file: MemFile) -> Self {
        self.files.insert(path.into(), file);
        self
    }
}

impl FileOpener for MemOpener {
    type File = MemFile;

    fn open(&self, path: &Path) -> Result<MemFile, Tob1Error> {
        self.files.get(path).cloned().ok_or_else(|| {
            Tob1Error::IOError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            ))
        })
    }
}
