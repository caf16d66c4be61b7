//! Time to file resolution.
//!
//! Files of a group are named after the local time at which their nominal
//! period starts, e.g. `2015-10/TOB1_2015_10_05_1200.dat` for the template
//! `%Y-%m` / `TOB1_%Y_%m_%d_%H%M.dat`. Periods are aligned to multiples of
//! the file period counted from the Unix epoch in local time.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::format::{Fixed, Item, Numeric, Parsed, StrftimeItems, parse};
use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use tracing::debug;

use crate::config::{FileSourceSettings, duration_nanos};
use crate::error::Tob1Error;

/// One physical file contributing to a queried time range.
#[derive(Debug, Clone, PartialEq)]
pub struct FileSegment {
    pub path: PathBuf,
    /// Nominal start of the file in UTC.
    pub file_begin: DateTime<Utc>,
    /// First sample of the file inside the query.
    pub sample_offset: usize,
    /// Number of samples of the file inside the query.
    pub sample_length: usize,
    /// Number of samples a complete file holds.
    pub nominal_count: usize,
    /// Position of `sample_offset` in the query's output.
    pub output_offset: usize,
}

/// Resolves a group's files.
pub trait FileIndexer: Send + Sync {
    /// The earliest file of the group, used for catalog discovery.
    fn first_file(&self) -> Result<Option<PathBuf>, Tob1Error>;

    /// Existing files whose nominal period intersects `[begin, end)`, in time order.
    fn files_in_range(
        &self,
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
        sample_period: TimeDelta,
    ) -> Result<Vec<FileSegment>, Tob1Error>;
}

/// [`FileIndexer`] driven by chrono format templates.
#[derive(Debug, Clone)]
pub struct TemplateFileIndexer {
    settings: FileSourceSettings,
    template: String,
}

impl TemplateFileIndexer {
    pub fn new(settings: FileSourceSettings) -> Result<Self, Tob1Error> {
        let template = if settings.path_template.is_empty() {
            settings.file_template.clone()
        } else {
            format!("{}/{}", settings.path_template.trim_end_matches('/'), settings.file_template)
        };
        if StrftimeItems::new(&template).any(|item| matches!(item, Item::Error)) {
            return Err(Tob1Error::InvalidConfig(format!("invalid file template {:?}", template)));
        }
        Ok(Self { settings, template })
    }

    /// The path of the file whose nominal period starts at `local` (local time).
    pub fn path_for(&self, local: NaiveDateTime) -> Result<PathBuf, Tob1Error> {
        let mut relative = String::new();
        write!(relative, "{}", local.format(&self.template))
            .map_err(|_| Tob1Error::InvalidConfig(format!("cannot format {:?}", self.template)))?;
        Ok(self.settings.root.join(relative))
    }

    /// Parse the nominal local start time from a path relative to the root.
    ///
    /// Fields the template does not carry start at their minimum, so
    /// `y_%Y.dat` names January 1st and `f_%Y%m%d%H.dat` names the full hour.
    pub fn parse_local_time(&self, relative: &str) -> Option<NaiveDateTime> {
        let items: Vec<Item<'_>> = StrftimeItems::new(&self.template).collect();
        let mut parsed = Parsed::new();
        parse(&mut parsed, relative, items.iter()).ok()?;

        let has = |wanted: &[Numeric]| {
            items
                .iter()
                .any(|item| matches!(item, Item::Numeric(numeric, _) if wanted.contains(numeric)))
        };
        if !has(&[Numeric::Timestamp]) {
            let month_name = items
                .iter()
                .any(|item| matches!(item, Item::Fixed(Fixed::ShortMonthName | Fixed::LongMonthName)));
            if !month_name && !has(&[Numeric::Month, Numeric::Ordinal]) {
                parsed.set_month(1).ok()?;
            }
            if !has(&[Numeric::Day, Numeric::Ordinal]) {
                parsed.set_day(1).ok()?;
            }
            if !has(&[Numeric::Hour, Numeric::Hour12]) {
                parsed.set_hour(0).ok()?;
            }
            if !has(&[Numeric::Minute]) {
                parsed.set_minute(0).ok()?;
            }
            if !has(&[Numeric::Second]) {
                parsed.set_second(0).ok()?;
            }
        }
        parsed.to_naive_datetime_with_offset(0).ok()
    }

    fn to_utc(&self, local: NaiveDateTime) -> DateTime<Utc> {
        (local - self.settings.utc_offset).and_utc()
    }

    fn align_local(&self, local: NaiveDateTime) -> Result<NaiveDateTime, Tob1Error> {
        let period = duration_nanos(self.settings.file_period);
        let nanos = local
            .and_utc()
            .timestamp_nanos_opt()
            .ok_or_else(|| Tob1Error::InvalidRange(format!("{} is out of range", local)))?;
        let aligned = nanos - nanos.rem_euclid(period);
        Ok(DateTime::from_timestamp_nanos(aligned).naive_utc())
    }

    fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), Tob1Error> {
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                Self::collect_files(&path, out)?;
            } else {
                out.push(path);
            }
        }
        Ok(())
    }
}

fn samples(delta: TimeDelta, sample_period: TimeDelta) -> usize {
    (duration_nanos(delta) / duration_nanos(sample_period)).max(0) as usize
}

impl FileIndexer for TemplateFileIndexer {
    fn first_file(&self) -> Result<Option<PathBuf>, Tob1Error> {
        if !self.settings.root.is_dir() {
            return Ok(None);
        }
        let mut files = Vec::new();
        Self::collect_files(&self.settings.root, &mut files)?;

        let mut first: Option<(NaiveDateTime, PathBuf)> = None;
        for path in files {
            let Ok(relative) = path.strip_prefix(&self.settings.root) else {
                continue;
            };
            let relative = relative.to_string_lossy().replace('\\', "/");
            let Some(local) = self.parse_local_time(&relative) else {
                continue;
            };
            if first.as_ref().is_none_or(|(t, _)| local < *t) {
                first = Some((local, path));
            }
        }
        Ok(first.map(|(_, path)| path))
    }

    fn files_in_range(
        &self,
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
        sample_period: TimeDelta,
    ) -> Result<Vec<FileSegment>, Tob1Error> {
        if end <= begin {
            return Err(Tob1Error::InvalidRange(format!("{} is not before {}", begin, end)));
        }
        let file_period = self.settings.file_period;
        let nominal_count = samples(file_period, sample_period);

        let mut segments = Vec::new();
        let mut local = self.align_local(begin.naive_utc() + self.settings.utc_offset)?;
        loop {
            let file_begin = self.to_utc(local);
            if file_begin >= end {
                break;
            }
            let file_end = file_begin + file_period;
            let segment_begin = begin.max(file_begin);
            let segment_end = end.min(file_end);

            let path = self.path_for(local)?;
            if path.is_file() {
                segments.push(FileSegment {
                    path,
                    file_begin,
                    sample_offset: samples(segment_begin - file_begin, sample_period),
                    sample_length: samples(segment_end - segment_begin, sample_period),
                    nominal_count,
                    output_offset: samples(segment_begin - begin, sample_period),
                });
            } else {
                debug!(path = %path.display(), "no file for period");
            }
            local += file_period;
        }
        Ok(segments)
    }
}
