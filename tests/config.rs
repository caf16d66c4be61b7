use std::fs;

use chrono::TimeDelta;
use tempfile::TempDir;
use tob1_rs::config::{Configuration, parse_duration};
use tob1_rs::error::Tob1Error;

const DOCUMENT: &str = r#"{
  "/AIRPORT/TOWER/FAST": {
    "sonic": {
      "root": "sonic",
      "pathTemplate": "%Y-%m",
      "fileTemplate": "TOB1_%Y_%m_%d_%H%M.dat",
      "filePeriod": "01:00:00",
      "utcOffset": "-05:00:00",
      "renamePattern": "^Vx$",
      "renameReplacement": "Velocity_X",
      "samplePeriod": "00:00:00.05"
    },
    "met": {
      "fileTemplate": "MET_%Y%m%d.dat",
      "filePeriod": "1.00:00:00",
      "catalogSourceFiles": ["MET_20151005.dat"],
      "samplePeriod": "00:01:00"
    }
  }
}"#;

#[test]
fn parses_durations() -> Result<(), Tob1Error> {
    assert_eq!(parse_duration("00:00:00.05")?, TimeDelta::milliseconds(50));
    assert_eq!(parse_duration("01:00:00")?, TimeDelta::hours(1));
    assert_eq!(parse_duration("1.00:00:00")?, TimeDelta::days(1));
    assert_eq!(parse_duration("-05:30:00")?, -TimeDelta::minutes(330));
    assert_eq!(parse_duration("00:00:01.000000001")?, TimeDelta::nanoseconds(1_000_000_001));

    for bad in ["", "1:00", "00:60:00", "00:00:61", "00:00:00.1234567890", "ab:cd:ef", "-1.-1:00:00"] {
        assert!(matches!(parse_duration(bad), Err(Tob1Error::InvalidConfig(_))), "{bad:?}");
    }
    Ok(())
}

#[test]
fn validates_dataset_settings() -> Result<(), Tob1Error> {
    let config = Configuration::from_json_str(DOCUMENT, "/data")?;
    assert_eq!(config.dataset_paths().collect::<Vec<_>>(), vec!["/AIRPORT/TOWER/FAST"]);

    let settings = config.dataset("/AIRPORT/TOWER/FAST")?;
    let names: Vec<&str> = settings.groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["met", "sonic"]);

    let sonic = settings.group("sonic").unwrap();
    assert_eq!(sonic.file_source.root, std::path::Path::new("/data/sonic"));
    assert_eq!(sonic.file_source.utc_offset, -TimeDelta::hours(5));
    assert_eq!(sonic.sample_period, TimeDelta::milliseconds(50));
    assert_eq!(sonic.samples_per_file(), 72000);
    let rename = sonic.rename.as_ref().unwrap();
    assert_eq!(rename.pattern(), "^Vx$");
    assert_eq!(rename.replacement(), "Velocity_X");

    let met = settings.group("met").unwrap();
    assert_eq!(met.file_source.root, std::path::Path::new("/data"));
    assert_eq!(met.file_source.path_template, "");
    assert_eq!(met.samples_per_file(), 1440);
    assert!(met.rename.is_none());
    Ok(())
}

#[test]
fn missing_sample_period_is_reported() -> Result<(), Tob1Error> {
    let json = r#"{ "/X": { "g": { "fileTemplate": "%Y.dat", "filePeriod": "01:00:00" } } }"#;
    let config = Configuration::from_json_str(json, ".")?;
    match config.dataset("/X") {
        Err(Tob1Error::MissingSetting { group, setting }) => {
            assert_eq!(group, "g");
            assert_eq!(setting, "samplePeriod");
        }
        other => panic!("unexpected result: {other:?}"),
    }
    Ok(())
}

#[test]
fn rejects_inconsistent_groups() -> Result<(), Tob1Error> {
    let json = r#"{
      "/uneven": { "g": { "fileTemplate": "%Y.dat", "filePeriod": "00:00:01", "samplePeriod": "00:00:00.3" } },
      "/zero": { "g": { "fileTemplate": "%Y.dat", "filePeriod": "00:00:00", "samplePeriod": "00:00:00" } },
      "/rename": { "g": { "fileTemplate": "%Y.dat", "filePeriod": "01:00:00", "samplePeriod": "00:00:01", "renamePattern": "x" } },
      "/regex": { "g": { "fileTemplate": "%Y.dat", "filePeriod": "01:00:00", "samplePeriod": "00:00:01", "renamePattern": "(", "renameReplacement": "" } },
      "/offset": { "g": { "fileTemplate": "%Y.dat", "filePeriod": "01:00:00", "samplePeriod": "00:01:00", "utcOffset": "00:00:30" } }
    }"#;
    let config = Configuration::from_json_str(json, ".")?;
    for path in ["/uneven", "/zero", "/rename", "/regex", "/offset"] {
        assert!(matches!(config.dataset(path), Err(Tob1Error::InvalidConfig(_))), "{path}");
    }
    assert!(matches!(config.dataset("/missing"), Err(Tob1Error::UnknownDataset(_))));
    Ok(())
}

#[test]
fn offsets_on_the_sample_grid_are_accepted() -> Result<(), Tob1Error> {
    let json = r#"{ "/X": { "g": { "fileTemplate": "%Y.dat", "filePeriod": "01:00:00", "samplePeriod": "00:01:00", "utcOffset": "-05:30:00" } } }"#;
    let settings = Configuration::from_json_str(json, ".")?.dataset("/X")?;
    assert_eq!(settings.groups[0].file_source.utc_offset, -TimeDelta::minutes(330));
    Ok(())
}

#[test]
fn malformed_documents_are_config_errors() {
    assert!(matches!(Configuration::from_json_str("{ not json", "."), Err(Tob1Error::InvalidConfig(_))));
    assert!(matches!(
        Configuration::from_json_str(r#"{ "/X": { "g": { "filePeriod": 5 } } }"#, "."),
        Err(Tob1Error::InvalidConfig(_))
    ));
}

#[test]
fn load_resolves_roots_next_to_the_document() -> Result<(), Tob1Error> {
    let dir = TempDir::new()?;
    let path = dir.path().join("datasets.json");
    fs::write(&path, DOCUMENT)?;

    let config = Configuration::load_from_file(&path)?;
    let settings = config.dataset("/AIRPORT/TOWER/FAST")?;
    assert_eq!(settings.group("sonic").unwrap().file_source.root, dir.path().join("sonic"));
    Ok(())
}
