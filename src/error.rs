use thiserror::Error;

#[derive(Debug, Error)]
pub enum Tob1Error {
    #[error(r#"Invalid file type: Expected "TOB1", found {0}"#)]
    FileTypeError(String),

    #[error("Invalid header line {line}: {message}")]
    HeaderError {
        line: usize,
        message: String,
    },

    #[error("Unknown data type {0:?}")]
    UnknownDataType(String),

    #[error("Invalid file handling")]
    IOError(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Missing required setting {setting:?} for group {group:?}")]
    MissingSetting {
        group: String,
        setting: &'static str,
    },

    #[error("Unknown dataset {0:?}")]
    UnknownDataset(String),

    #[error("Unknown resource {0:?}")]
    UnknownResource(String),

    #[error("Channel {0:?} not found in file")]
    ChannelNotFound(String),

    #[error("Byte range {offset}..{end} exceeds decoded buffer of {available} bytes")]
    RangeOutOfBounds {
        offset: usize,
        end: usize,
        available: usize,
    },

    #[error("Destination holds {actual} bytes but {expected} are required")]
    DestinationMismatch {
        actual: usize,
        expected: usize,
    },

    #[error("Invalid time range: {0}")]
    InvalidRange(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Worker pool error: {0}")]
    WorkerPool(String),
}

impl From<serde_json::Error> for Tob1Error {
    fn from(e: serde_json::Error) -> Self {
        Tob1Error::InvalidConfig(format!("JSON deserialization failed: {}", e))
    }
}
