use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::api::channel_file::FileOpener;
use crate::api::logger_file::Tob1Opener;
use crate::cancel::CancellationToken;
use crate::catalog::{Catalog, CatalogBuild, CatalogBuilder, Resource};
use crate::config::{Configuration, DatasetSettings, duration_nanos};
use crate::error::Tob1Error;
use crate::extract::Segment;
use crate::indexer::{FileIndexer, TemplateFileIndexer};
use crate::read::{ReadOrchestrator, ReadOutcome, ReadRequest};

/// Samples of one resource over a time range.
#[derive(Debug)]
pub struct ChannelData {
    /// Little-endian elements, `element_size` bytes each.
    pub data: Vec<u8>,
    /// One byte per element, 1 where `data` was filled from a file.
    pub status: Vec<u8>,
    pub element_size: usize,
    /// Outcome per contributing file, in time order.
    pub outcomes: Vec<(PathBuf, ReadOutcome)>,
}

impl ChannelData {
    pub fn len(&self) -> usize {
        self.status.len()
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_empty()
    }

    pub fn filled_count(&self) -> usize {
        self.status.iter().filter(|s| **s != 0).count()
    }

    /// Raw bytes of the element at `index`.
    pub fn element(&self, index: usize) -> Option<&[u8]> {
        let start = index.checked_mul(self.element_size)?;
        self.data.get(start..start + self.element_size)
    }
}

/// A configured dataset: its catalog plus everything needed to read it.
pub struct Dataset<O: FileOpener = Tob1Opener> {
    settings: DatasetSettings,
    build: CatalogBuild,
    indexers: BTreeMap<String, Box<dyn FileIndexer>>,
    reader: ReadOrchestrator<O>,
}

impl Dataset<Tob1Opener> {
    /// Validate the dataset's configuration and build its catalog from TOB1 files.
    pub fn open(config: &Configuration, path: &str, cancel: &CancellationToken) -> Result<Self, Tob1Error> {
        let settings = config.dataset(path)?;
        Self::with_opener(settings, Tob1Opener, None, cancel)
    }
}

impl<O: FileOpener> Dataset<O> {
    pub fn with_opener(
        settings: DatasetSettings,
        opener: O,
        worker_count: Option<usize>,
        cancel: &CancellationToken,
    ) -> Result<Self, Tob1Error> {
        let mut indexers: BTreeMap<String, Box<dyn FileIndexer>> = BTreeMap::new();
        for group in &settings.groups {
            let indexer = TemplateFileIndexer::new(group.file_source.clone())?;
            indexers.insert(group.name.clone(), Box::new(indexer));
        }

        let build = {
            let mut builder = CatalogBuilder::new(&settings, &opener);
            for (name, indexer) in &indexers {
                builder = builder.with_indexer(name.clone(), indexer.as_ref());
            }
            builder.build(cancel)?
        };
        info!(dataset = %settings.path, resources = build.catalog.len(), "dataset ready");

        let reader = ReadOrchestrator::new(opener, worker_count)?;
        Ok(Self { settings, build, indexers, reader })
    }

    pub fn settings(&self) -> &DatasetSettings {
        &self.settings
    }

    pub fn catalog(&self) -> &Catalog {
        &self.build.catalog
    }

    /// The catalog together with the per-channel discovery report.
    pub fn catalog_build(&self) -> &CatalogBuild {
        &self.build
    }

    pub fn resource(&self, id: &str) -> Option<&Resource> {
        self.build.catalog.get(id)
    }

    /// Read `[begin, end)` of resource `id`.
    ///
    /// Both bounds must lie on the resource's sample grid. Periods without a
    /// file, incomplete files and failed requests leave their elements with
    /// status 0; the per-file outcomes say why.
    pub fn read(
        &self,
        id: &str,
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<ChannelData, Tob1Error> {
        let resource = self
            .resource(id)
            .ok_or_else(|| Tob1Error::UnknownResource(id.to_string()))?;
        let indexer = self
            .indexers
            .get(&resource.group)
            .ok_or_else(|| Tob1Error::UnknownResource(id.to_string()))?;

        let period = duration_nanos(resource.sample_period);
        let on_grid = |t: DateTime<Utc>| t.timestamp_nanos_opt().is_some_and(|n| n % period == 0);
        if end <= begin || !on_grid(begin) || !on_grid(end) {
            return Err(Tob1Error::InvalidRange(format!(
                "{} .. {} is empty or not aligned to the sample period",
                begin, end
            )));
        }

        let element_size = resource.element_size();
        let total = (duration_nanos(end - begin) / period) as usize;
        let mut data = vec![0u8; total * element_size];
        let mut status = vec![0u8; total];

        let segments = indexer.files_in_range(begin, end, resource.sample_period)?;
        let paths: Vec<PathBuf> = segments.iter().map(|s| s.path.clone()).collect();

        let outcomes = {
            let mut requests = Vec::with_capacity(segments.len());
            let mut data_rest: &mut [u8] = &mut data;
            let mut status_rest: &mut [u8] = &mut status;
            let mut cursor = 0usize;

            for segment in &segments {
                let end_sample = segment.output_offset + segment.sample_length;
                if segment.output_offset < cursor || end_sample > total {
                    return Err(Tob1Error::InvalidRange(format!(
                        "file segment {} overlaps or exceeds the query",
                        segment.path.display()
                    )));
                }
                let skip = segment.output_offset - cursor;

                let (_, rest) = std::mem::take(&mut data_rest).split_at_mut(skip * element_size);
                let (segment_data, rest) = rest.split_at_mut(segment.sample_length * element_size);
                data_rest = rest;

                let (_, rest) = std::mem::take(&mut status_rest).split_at_mut(skip);
                let (segment_status, rest) = rest.split_at_mut(segment.sample_length);
                status_rest = rest;

                cursor = end_sample;
                requests.push(ReadRequest {
                    path: segment.path.clone(),
                    segment: Segment {
                        original_name: resource.original_name.clone(),
                        byte_offset: segment.sample_offset * element_size,
                        byte_length: segment.sample_length * element_size,
                        expected_element_count: segment.nominal_count,
                        element_size,
                    },
                    data: segment_data,
                    status: segment_status,
                });
            }
            self.reader.read_batch(requests, cancel)
        };

        Ok(ChannelData {
            data,
            status,
            element_size,
            outcomes: paths.into_iter().zip(outcomes).collect(),
        })
    }
}
