mod common;

use std::path::PathBuf;

use chrono::{DateTime, TimeDelta, Utc};
use common::{MemFile, MemOpener, f32_buffer};
use tob1_rs::cancel::CancellationToken;
use tob1_rs::api::ChannelDescriptor;
use tob1_rs::catalog::{
    Catalog, CatalogBuilder, ChannelOutcome, NumericType, Resource, SkipReason, channel_to_resource,
};
use tob1_rs::config::Configuration;
use tob1_rs::error::Tob1Error;
use tob1_rs::format::data_type::ElementKind;
use tob1_rs::indexer::{FileIndexer, FileSegment};

const DOCUMENT: &str = r#"{
  "/SITE/FAST": {
    "slow": {
      "fileTemplate": "slow_%Y%m%d.dat",
      "filePeriod": "1.00:00:00",
      "samplePeriod": "00:01:00",
      "catalogSourceFiles": ["b.dat", "c.dat"]
    },
    "fast": {
      "fileTemplate": "fast_%Y%m%d%H.dat",
      "filePeriod": "01:00:00",
      "samplePeriod": "00:00:00.05",
      "renamePattern": "^Vx$",
      "renameReplacement": "Velocity_X",
      "catalogSourceFiles": ["a.dat"]
    }
  },
  "/SITE/BROKEN": {
    "g": {
      "fileTemplate": "g_%Y.dat",
      "filePeriod": "01:00:00",
      "samplePeriod": "00:00:01",
      "catalogSourceFiles": ["missing.dat"]
    }
  },
  "/SITE/INDEXED": {
    "g": {
      "fileTemplate": "g_%Y.dat",
      "filePeriod": "01:00:00",
      "samplePeriod": "00:00:01"
    }
  }
}"#;

fn opener() -> MemOpener {
    let fast = MemFile::default()
        .with_channel("TIMESTAMP", ElementKind::Timestamp, vec![0; 16])
        .with_channel("Ux", ElementKind::F32, f32_buffer([1.0, 2.0]))
        .with_channel("Vx", ElementKind::F32, f32_buffer([1.0, 2.0]))
        .with_channel("T(1)", ElementKind::F32, f32_buffer([1.0, 2.0]))
        .with_channel("123", ElementKind::F32, f32_buffer([1.0, 2.0]));
    let slow = MemFile::default()
        .with_channel("Batt", ElementKind::F32, f32_buffer([12.5]))
        .with_channel("Ux", ElementKind::U16, vec![0, 0]);
    let slow_later = MemFile::default()
        .with_channel("Batt", ElementKind::F32, f32_buffer([12.4]))
        .with_channel("Ux", ElementKind::I32, vec![0; 4]);
    MemOpener::default()
        .with_file("/mem/a.dat", fast)
        .with_file("/mem/b.dat", slow)
        .with_file("/mem/c.dat", slow_later)
}

fn resource(id: &str, group: &str) -> Resource {
    Resource::new(id, "", group, TimeDelta::seconds(1), id, NumericType::Float32).unwrap()
}

#[test]
fn discovers_channels_of_every_group() -> Result<(), Tob1Error> {
    let config = Configuration::from_json_str(DOCUMENT, "/mem")?;
    let settings = config.dataset("/SITE/FAST")?;
    let opener = opener();

    let build = CatalogBuilder::new(&settings, &opener).build(&CancellationToken::new())?;
    let catalog = &build.catalog;
    assert_eq!(catalog.path, "/SITE/FAST");
    let ids: Vec<&str> = catalog.resources().map(Resource::id).collect();
    assert_eq!(ids, vec!["fast_T1", "fast_Ux", "fast_Velocity_X", "slow_Batt", "slow_Ux"]);

    let velocity = catalog.get("fast_Velocity_X").unwrap();
    assert_eq!(velocity.original_name, "Vx");
    assert_eq!(velocity.group, "fast");
    assert_eq!(velocity.sample_period, TimeDelta::milliseconds(50));
    assert_eq!(velocity.data_type, NumericType::Float32);

    // Groups do not collide; within "slow" the later file's Ux wins.
    assert_eq!(catalog.get("fast_Ux").unwrap().data_type, NumericType::Float32);
    let ux = catalog.get("slow_Ux").unwrap();
    assert_eq!(ux.group, "slow");
    assert_eq!(ux.data_type, NumericType::Int32);
    assert_eq!(ux.element_size(), 4);

    let skipped: Vec<(&str, &ChannelOutcome)> =
        build.skipped().map(|r| (r.channel.as_str(), &r.outcome)).collect();
    assert_eq!(
        skipped,
        vec![
            ("TIMESTAMP", &ChannelOutcome::Skipped(SkipReason::UnsupportedType(ElementKind::Timestamp))),
            ("123", &ChannelOutcome::Skipped(SkipReason::InvalidName)),
        ]
    );
    assert_eq!(build.report.len(), 9);
    assert!(build.report.iter().all(|r| r.file.starts_with("/mem")));
    Ok(())
}

#[test]
fn disjoint_merges_do_not_depend_on_order() {
    let mut first = Catalog::new("/X");
    first.insert(resource("a", "g1"));
    first.insert(resource("c", "g1"));
    let mut second = Catalog::new("/X");
    second.insert(resource("b", "g2"));

    let mut left = Catalog::new("/X");
    left.merge(first.clone());
    left.merge(second.clone());
    let mut right = Catalog::new("/X");
    right.merge(second);
    right.merge(first);

    assert_eq!(left, right);
    assert_eq!(left.len(), 3);
}

#[test]
fn colliding_merges_keep_the_later_resource() {
    let mut catalog = Catalog::new("/X");
    assert!(catalog.insert(resource("a", "g1")).is_none());

    let mut later = Catalog::new("/X");
    later.insert(resource("a", "g2"));
    let collisions = catalog.merge(later);

    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.get("a").unwrap().group, "g2");
    assert_eq!(collisions.len(), 1);
    assert_eq!(collisions[0].group, "g1");
}

#[test]
fn identical_resources_are_not_collisions() {
    let mut catalog = Catalog::new("/X");
    catalog.insert(resource("a", "g1"));

    let mut again = Catalog::new("/X");
    again.insert(resource("a", "g1"));
    again.insert(resource("b", "g1"));

    assert!(catalog.merge(again).is_empty());
    assert_eq!(catalog.len(), 2);
}

#[test]
fn resources_require_valid_identifiers() {
    assert!(Resource::new("9lives", "", "g", TimeDelta::seconds(1), "9lives", NumericType::Int8).is_none());
    assert!(Resource::new("T(1)", "", "g", TimeDelta::seconds(1), "T(1)", NumericType::Int8).is_none());
    assert_eq!(NumericType::from_element(ElementKind::Text(8)), None);
    assert_eq!(NumericType::from_element(ElementKind::I32), Some(NumericType::Int32));
}

#[test]
fn unreadable_representative_file_fails_the_build() -> Result<(), Tob1Error> {
    let config = Configuration::from_json_str(DOCUMENT, "/mem")?;
    let settings = config.dataset("/SITE/BROKEN")?;
    let opener = opener();

    let result = CatalogBuilder::new(&settings, &opener).build(&CancellationToken::new());
    assert!(matches!(result, Err(Tob1Error::IOError(_))));
    Ok(())
}

#[test]
fn cancelled_build_stops() -> Result<(), Tob1Error> {
    let config = Configuration::from_json_str(DOCUMENT, "/mem")?;
    let settings = config.dataset("/SITE/FAST")?;
    let opener = opener();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = CatalogBuilder::new(&settings, &opener).build(&cancel);
    assert!(matches!(result, Err(Tob1Error::Cancelled)));
    Ok(())
}

struct FixedIndexer(Option<PathBuf>);

impl FileIndexer for FixedIndexer {
    fn first_file(&self) -> Result<Option<PathBuf>, Tob1Error> {
        Ok(self.0.clone())
    }

    fn files_in_range(
        &self,
        _begin: DateTime<Utc>,
        _end: DateTime<Utc>,
        _sample_period: TimeDelta,
    ) -> Result<Vec<FileSegment>, Tob1Error> {
        Ok(Vec::new())
    }
}

#[test]
fn discovery_uses_the_group_indexer() -> Result<(), Tob1Error> {
    let config = Configuration::from_json_str(DOCUMENT, "/mem")?;
    let settings = config.dataset("/SITE/INDEXED")?;
    let opener = opener();

    let indexer = FixedIndexer(Some(PathBuf::from("/mem/b.dat")));
    let build = CatalogBuilder::new(&settings, &opener)
        .with_indexer("g", &indexer)
        .build(&CancellationToken::new())?;
    assert_eq!(build.catalog.len(), 2);
    assert_eq!(build.catalog.get("g_Batt").unwrap().group, "g");

    let empty = FixedIndexer(None);
    let build = CatalogBuilder::new(&settings, &opener)
        .with_indexer("g", &empty)
        .build(&CancellationToken::new())?;
    assert!(build.catalog.is_empty());
    assert!(build.report.is_empty());
    Ok(())
}

#[test]
fn group_prefix_is_sanitized() -> Result<(), Tob1Error> {
    let json = r#"{ "/X": { "met-2": { "fileTemplate": "%Y.dat", "filePeriod": "01:00:00", "samplePeriod": "00:00:01" } } }"#;
    let settings = Configuration::from_json_str(json, "/mem")?.dataset("/X")?;
    let group = settings.group("met-2").unwrap();

    let descriptor = ChannelDescriptor {
        name: "T(1)".to_string(),
        element: ElementKind::F32,
        unit: "C".to_string(),
        index: 0,
    };
    let resource = channel_to_resource(&descriptor, group).unwrap();
    assert_eq!(resource.id(), "met2_T1");
    assert_eq!(resource.original_name, "T(1)");
    assert_eq!(resource.unit, "C");
    Ok(())
}
