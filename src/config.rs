//! Configuration document.
//!
//! The document maps a dataset path to its named channel source groups:
//!
//! ```json
//! {
//!   "/AIRPORT/TOWER/FAST": {
//!     "sonic": {
//!       "root": "data/sonic",
//!       "pathTemplate": "%Y-%m",
//!       "fileTemplate": "TOB1_%Y_%m_%d_%H%M.dat",
//!       "filePeriod": "01:00:00",
//!       "samplePeriod": "00:00:00.05"
//!     }
//!   }
//! }
//! ```
//!
//! Loading only checks that the document is well-formed JSON of the right
//! shape. [`Configuration::dataset`] turns one entry into validated, immutable
//! [`DatasetSettings`] and reports every missing or malformed setting eagerly.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::error::Tob1Error;
use crate::normalize::RenameRule;

/// One group entry exactly as written in the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupConfig {
    /// Directory holding the group's files, relative to the document's directory.
    #[serde(default)]
    pub root: Option<PathBuf>,
    /// chrono format string for the directory part, may be empty.
    #[serde(default)]
    pub path_template: String,
    /// chrono format string for the file name.
    #[serde(default)]
    pub file_template: Option<String>,
    #[serde(default)]
    pub file_period: Option<String>,
    #[serde(default)]
    pub utc_offset: Option<String>,
    /// Fixed representative files used for catalog discovery.
    #[serde(default)]
    pub catalog_source_files: Option<Vec<PathBuf>>,
    #[serde(default)]
    pub rename_pattern: Option<String>,
    #[serde(default)]
    pub rename_replacement: Option<String>,
    #[serde(default)]
    pub sample_period: Option<String>,
}

/// The whole configuration document.
#[derive(Debug, Clone, Default)]
pub struct Configuration {
    datasets: BTreeMap<String, BTreeMap<String, GroupConfig>>,
    base_dir: PathBuf,
}

/// Where and how a group's files are laid out on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct FileSourceSettings {
    pub root: PathBuf,
    pub path_template: String,
    pub file_template: String,
    /// Nominal duration covered by one file.
    pub file_period: TimeDelta,
    /// File name timestamps are local time, i.e. UTC plus this offset.
    pub utc_offset: TimeDelta,
}

/// Validated settings of one channel source group.
#[derive(Debug, Clone)]
pub struct GroupSettings {
    pub name: String,
    pub file_source: FileSourceSettings,
    pub catalog_source_files: Option<Vec<PathBuf>>,
    pub rename: Option<RenameRule>,
    pub sample_period: TimeDelta,
}

impl GroupSettings {
    /// Number of samples a complete file holds.
    pub fn samples_per_file(&self) -> usize {
        (duration_nanos(self.file_source.file_period) / duration_nanos(self.sample_period)) as usize
    }
}

/// Validated settings of one dataset, groups in lexical name order.
#[derive(Debug, Clone)]
pub struct DatasetSettings {
    pub path: String,
    pub groups: Vec<GroupSettings>,
}

impl DatasetSettings {
    pub fn group(&self, name: &str) -> Option<&GroupSettings> {
        self.groups.iter().find(|g| g.name == name)
    }
}

impl Configuration {
    /// Load the document from a JSON file. Relative group roots resolve
    /// against the file's directory.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, Tob1Error> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::from_json_str(&json, base_dir)
    }

    /// Parse the document from a JSON string.
    pub fn from_json_str(json: &str, base_dir: impl Into<PathBuf>) -> Result<Self, Tob1Error> {
        let datasets: BTreeMap<String, BTreeMap<String, GroupConfig>> = serde_json::from_str(json)?;
        Ok(Self { datasets, base_dir: base_dir.into() })
    }

    pub fn dataset_paths(&self) -> impl Iterator<Item = &str> {
        self.datasets.keys().map(String::as_str)
    }

    /// Validate the groups of one dataset.
    ///
    /// # Returns
    /// [`DatasetSettings`] or the first configuration error found.
    pub fn dataset(&self, path: &str) -> Result<DatasetSettings, Tob1Error> {
        let groups = self
            .datasets
            .get(path)
            .ok_or_else(|| Tob1Error::UnknownDataset(path.to_string()))?;

        let groups = groups
            .iter()
            .map(|(name, group)| self.validate_group(name, group))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DatasetSettings { path: path.to_string(), groups })
    }

    fn validate_group(&self, name: &str, group: &GroupConfig) -> Result<GroupSettings, Tob1Error> {
        let missing = |setting: &'static str| Tob1Error::MissingSetting {
            group: name.to_string(),
            setting,
        };

        let sample_period = group.sample_period.as_deref().ok_or_else(|| missing("samplePeriod"))?;
        let sample_period = parse_duration(sample_period)?;
        let file_template = group.file_template.clone().ok_or_else(|| missing("fileTemplate"))?;
        let file_period = group.file_period.as_deref().ok_or_else(|| missing("filePeriod"))?;
        let file_period = parse_duration(file_period)?;
        let utc_offset = match &group.utc_offset {
            Some(offset) => parse_duration(offset)?,
            None => TimeDelta::zero(),
        };

        if sample_period <= TimeDelta::zero() || file_period <= TimeDelta::zero() {
            return Err(Tob1Error::InvalidConfig(format!(
                "group {:?}: periods must be positive",
                name
            )));
        }
        if duration_nanos(file_period) % duration_nanos(sample_period) != 0 {
            return Err(Tob1Error::InvalidConfig(format!(
                "group {:?}: file period is not a multiple of the sample period",
                name
            )));
        }
        if duration_nanos(utc_offset) % duration_nanos(sample_period) != 0 {
            return Err(Tob1Error::InvalidConfig(format!(
                "group {:?}: UTC offset is not a multiple of the sample period",
                name
            )));
        }

        let rename = match (&group.rename_pattern, &group.rename_replacement) {
            (Some(pattern), Some(replacement)) => Some(RenameRule::new(pattern, replacement.clone())?),
            (None, None) => None,
            _ => {
                return Err(Tob1Error::InvalidConfig(format!(
                    "group {:?}: renamePattern and renameReplacement must be given together",
                    name
                )));
            }
        };

        let root = match &group.root {
            Some(root) => self.base_dir.join(root),
            None => self.base_dir.clone(),
        };

        Ok(GroupSettings {
            name: name.to_string(),
            file_source: FileSourceSettings {
                root,
                path_template: group.path_template.clone(),
                file_template,
                file_period,
                utc_offset,
            },
            catalog_source_files: group.catalog_source_files.clone(),
            rename,
            sample_period,
        })
    }
}

pub(crate) fn duration_nanos(d: TimeDelta) -> i64 {
    d.num_nanoseconds().unwrap_or(i64::MAX)
}

/// Parse a duration written as `[-][d.]HH:MM:SS[.fraction]`.
pub fn parse_duration(text: &str) -> Result<TimeDelta, Tob1Error> {
    let invalid = || Tob1Error::InvalidConfig(format!("invalid duration {:?}", text));

    let trimmed = text.trim();
    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    let first_colon = body.find(':').ok_or_else(invalid)?;
    let (days, clock) = match body.find('.') {
        Some(dot) if dot < first_colon => {
            let days = body[..dot].parse::<i64>().map_err(|_| invalid())?;
            (days, &body[dot + 1..])
        }
        _ => (0, body),
    };

    let parts: Vec<&str> = clock.split(':').collect();
    if parts.len() != 3 {
        return Err(invalid());
    }
    let hours = parts[0].parse::<i64>().map_err(|_| invalid())?;
    let minutes = parts[1].parse::<i64>().map_err(|_| invalid())?;
    let (seconds, fraction) = match parts[2].split_once('.') {
        Some((s, f)) => (s, f),
        None => (parts[2], ""),
    };
    let seconds = seconds.parse::<i64>().map_err(|_| invalid())?;
    let in_range = days >= 0 && hours >= 0 && (0..60).contains(&minutes) && (0..60).contains(&seconds);
    if !in_range || fraction.len() > 9 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let nanos = if fraction.is_empty() {
        0
    } else {
        format!("{:0<9}", fraction).parse::<i64>().map_err(|_| invalid())?
    };

    let total_seconds = ((days * 24 + hours) * 60 + minutes) * 60 + seconds;
    let delta = TimeDelta::try_seconds(total_seconds).ok_or_else(invalid)? + TimeDelta::nanoseconds(nanos);
    Ok(if negative { -delta } else { delta })
}
