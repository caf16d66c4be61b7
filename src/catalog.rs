//! Catalog discovery.
//!
//! Builds the queryable [`Catalog`] of a dataset by opening representative
//! files of every group and turning their channels into [`Resource`]s.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::{Path, PathBuf};

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::api::channel_file::{ChannelDescriptor, ChannelFile, FileOpener};
use crate::cancel::CancellationToken;
use crate::config::{DatasetSettings, GroupSettings};
use crate::error::Tob1Error;
use crate::format::data_type::ElementKind;
use crate::indexer::{FileIndexer, TemplateFileIndexer};
use crate::normalize::{is_valid_identifier, normalize};

/// Numeric element types a catalog resource can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumericType {
    UInt8,
    Int8,
    UInt16,
    Int16,
    UInt32,
    Int32,
    UInt64,
    Int64,
    Float32,
    Float64,
}

impl NumericType {
    /// Map a decoded element kind to a catalog type. Timestamps and text have
    /// no numeric representation.
    pub fn from_element(kind: ElementKind) -> Option<Self> {
        match kind {
            ElementKind::U8 => Some(NumericType::UInt8),
            ElementKind::I8 => Some(NumericType::Int8),
            ElementKind::U16 => Some(NumericType::UInt16),
            ElementKind::I16 => Some(NumericType::Int16),
            ElementKind::U32 => Some(NumericType::UInt32),
            ElementKind::I32 => Some(NumericType::Int32),
            ElementKind::U64 => Some(NumericType::UInt64),
            ElementKind::I64 => Some(NumericType::Int64),
            ElementKind::F32 => Some(NumericType::Float32),
            ElementKind::F64 => Some(NumericType::Float64),
            ElementKind::Timestamp | ElementKind::Text(_) => None,
        }
    }

    pub fn size(&self) -> usize {
        match self {
            NumericType::UInt8 | NumericType::Int8 => 1,
            NumericType::UInt16 | NumericType::Int16 => 2,
            NumericType::UInt32 | NumericType::Int32 | NumericType::Float32 => 4,
            NumericType::UInt64 | NumericType::Int64 | NumericType::Float64 => 8,
        }
    }
}

/// A catalog-visible channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    id: String,
    pub unit: String,
    pub group: String,
    pub sample_period: TimeDelta,
    /// Name as stored in the file, used to locate the channel at read time.
    pub original_name: String,
    pub data_type: NumericType,
}

impl Resource {
    /// Create a resource, rejecting identifiers outside the catalog grammar.
    pub fn new(
        id: impl Into<String>,
        unit: impl Into<String>,
        group: impl Into<String>,
        sample_period: TimeDelta,
        original_name: impl Into<String>,
        data_type: NumericType,
    ) -> Option<Self> {
        let id = id.into();
        if !is_valid_identifier(&id) {
            return None;
        }
        Some(Self {
            id,
            unit: unit.into(),
            group: group.into(),
            sample_period,
            original_name: original_name.into(),
            data_type,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn element_size(&self) -> usize {
        self.data_type.size()
    }
}

/// Resources of one dataset, ordered by identifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub path: String,
    resources: BTreeMap<String, Resource>,
}

impl Catalog {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), resources: BTreeMap::new() }
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Resource> {
        self.resources.get(id)
    }

    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    /// Insert a resource; an existing resource with the same id is replaced.
    ///
    /// # Returns
    /// The replaced resource, if any.
    pub fn insert(&mut self, resource: Resource) -> Option<Resource> {
        match self.resources.entry(resource.id.clone()) {
            Entry::Occupied(mut slot) => Some(slot.insert(resource)),
            Entry::Vacant(slot) => {
                slot.insert(resource);
                None
            }
        }
    }

    /// Merge `other` into this catalog. Later writes win: resources of
    /// `other` replace same-id resources already present.
    ///
    /// # Returns
    /// The replaced resources that differed from their replacement. Replacing
    /// a resource with an identical one is not a collision.
    pub fn merge(&mut self, other: Catalog) -> Vec<Resource> {
        let mut collisions = Vec::new();
        for resource in other.resources.into_values() {
            let replacement = resource.clone();
            if let Some(previous) = self.insert(resource) {
                if previous == replacement {
                    continue;
                }
                warn!(
                    catalog = %self.path,
                    id = %previous.id,
                    replaced_group = %previous.group,
                    replaced_name = %previous.original_name,
                    "resource id collision, keeping the later definition"
                );
                collisions.push(previous);
            }
        }
        collisions
    }
}

/// Why a discovered channel did not make it into the catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// The element kind has no catalog numeric type.
    UnsupportedType(ElementKind),
    /// Nothing representable remained after normalization.
    InvalidName,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChannelOutcome {
    Added { id: String },
    Skipped(SkipReason),
}

/// What happened to one channel of one representative file.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelReport {
    pub group: String,
    pub file: PathBuf,
    pub channel: String,
    pub outcome: ChannelOutcome,
}

/// Result of a catalog build.
#[derive(Debug, Clone)]
pub struct CatalogBuild {
    pub catalog: Catalog,
    pub report: Vec<ChannelReport>,
}

impl CatalogBuild {
    pub fn skipped(&self) -> impl Iterator<Item = &ChannelReport> {
        self.report
            .iter()
            .filter(|r| matches!(r.outcome, ChannelOutcome::Skipped(_)))
    }
}

/// Turn one descriptor into a resource of `group`.
///
/// The id is the normalized channel name prefixed with the group name, e.g.
/// `aaaa_SonicTempC`; characters of the group name outside the identifier
/// grammar are dropped.
pub fn channel_to_resource(
    descriptor: &ChannelDescriptor,
    group: &GroupSettings,
) -> Result<Resource, SkipReason> {
    let data_type = NumericType::from_element(descriptor.element)
        .ok_or(SkipReason::UnsupportedType(descriptor.element))?;
    let channel = normalize(&descriptor.name, group.rename.as_ref()).ok_or(SkipReason::InvalidName)?;
    let id = normalize(&format!("{}_{}", group.name, channel), None).ok_or(SkipReason::InvalidName)?;
    Resource::new(
        id,
        descriptor.unit.clone(),
        group.name.clone(),
        group.sample_period,
        descriptor.name.clone(),
        data_type,
    )
    .ok_or(SkipReason::InvalidName)
}

/// Builds the catalog of one dataset.
pub struct CatalogBuilder<'a, O: FileOpener> {
    settings: &'a DatasetSettings,
    opener: &'a O,
    indexers: BTreeMap<String, &'a dyn FileIndexer>,
}

impl<'a, O: FileOpener> CatalogBuilder<'a, O> {
    pub fn new(settings: &'a DatasetSettings, opener: &'a O) -> Self {
        Self { settings, opener, indexers: BTreeMap::new() }
    }

    /// Use `indexer` instead of a [`TemplateFileIndexer`] for `group`.
    pub fn with_indexer(mut self, group: impl Into<String>, indexer: &'a dyn FileIndexer) -> Self {
        self.indexers.insert(group.into(), indexer);
        self
    }

    /// Open the representative files of every group and merge their channels.
    ///
    /// # Returns
    /// The catalog and a per-channel report. Per-channel problems only show up
    /// in the report; open failures and cancellation abort the build.
    pub fn build(&self, cancel: &CancellationToken) -> Result<CatalogBuild, Tob1Error> {
        let mut catalog = Catalog::new(self.settings.path.clone());
        let mut report = Vec::new();

        for group in &self.settings.groups {
            for file in self.representative_files(group)? {
                let partial = self.discover_file(group, &file, cancel, &mut report)?;
                catalog.merge(partial);
            }
        }

        info!(
            catalog = %catalog.path,
            resources = catalog.len(),
            skipped = report.iter().filter(|r| matches!(r.outcome, ChannelOutcome::Skipped(_))).count(),
            "catalog built"
        );
        Ok(CatalogBuild { catalog, report })
    }

    fn representative_files(&self, group: &GroupSettings) -> Result<Vec<PathBuf>, Tob1Error> {
        if let Some(files) = &group.catalog_source_files {
            return Ok(files.iter().map(|f| group.file_source.root.join(f)).collect());
        }

        let first = match self.indexers.get(&group.name) {
            Some(indexer) => indexer.first_file()?,
            None => TemplateFileIndexer::new(group.file_source.clone())?.first_file()?,
        };
        if first.is_none() {
            warn!(group = %group.name, root = %group.file_source.root.display(), "no representative file found");
        }
        Ok(first.into_iter().collect())
    }

    fn discover_file(
        &self,
        group: &GroupSettings,
        path: &Path,
        cancel: &CancellationToken,
        report: &mut Vec<ChannelReport>,
    ) -> Result<Catalog, Tob1Error> {
        debug!(group = %group.name, file = %path.display(), "discovering channels");
        let file = self.opener.open(path)?;
        let mut partial = Catalog::new(self.settings.path.clone());

        for descriptor in file.channels() {
            if cancel.is_cancelled() {
                return Err(Tob1Error::Cancelled);
            }
            let outcome = match channel_to_resource(descriptor, group) {
                Ok(resource) => {
                    let id = resource.id().to_string();
                    if let Some(previous) = partial.insert(resource) {
                        warn!(
                            group = %group.name,
                            id = %id,
                            replaced = %previous.original_name,
                            "two channels of one file normalize to the same id"
                        );
                    }
                    ChannelOutcome::Added { id }
                }
                Err(reason) => {
                    warn!(group = %group.name, channel = %descriptor.name, reason = ?reason, "skipping channel");
                    ChannelOutcome::Skipped(reason)
                }
            };
            report.push(ChannelReport {
                group: group.name.clone(),
                file: path.to_path_buf(),
                channel: descriptor.name.clone(),
                outcome,
            });
        }
        Ok(partial)
    }
}
