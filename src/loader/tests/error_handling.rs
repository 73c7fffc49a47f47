//! Error handling tests for the loader facade

use super::fixtures::{TripFixture, partition_path, write_frame, write_trip_partition};
use crate::error::LoaderError;
use crate::loader::TlcDataLoader;
use crate::models::LoadOptions;
use polars::prelude::*;
use tempfile::TempDir;

#[test]
fn test_nonexistent_root() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nonexistent");

    match TlcDataLoader::new(missing.clone()).unwrap_err() {
        LoaderError::DirectoryNotFound { path } => assert_eq!(path, missing),
        other => panic!("Expected DirectoryNotFound error, got {:?}", other),
    }
}

#[test]
fn test_root_must_be_a_directory() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("not_a_dir.parquet");
    std::fs::write(&file, "x").unwrap();

    assert!(matches!(
        TlcDataLoader::new(file),
        Err(LoaderError::DirectoryNotFound { .. })
    ));
}

#[test]
fn test_missing_partition_aborts_whole_load() {
    let temp_dir = TempDir::new().unwrap();
    write_trip_partition(temp_dir.path(), "2024-01", &TripFixture::standard(3));
    let loader = TlcDataLoader::new(temp_dir.path()).unwrap();

    let result = loader.load(
        &["trip_miles"],
        &["2024-01", "2024-02"],
        LoadOptions::default(),
    );
    match result.unwrap_err() {
        LoaderError::PartitionNotFound { month, path } => {
            assert_eq!(month, "2024-02");
            assert_eq!(path, partition_path(temp_dir.path(), "2024-02"));
        }
        other => panic!("Expected PartitionNotFound error, got {:?}", other),
    }

    let result = loader.load_in_batches(
        &["trip_miles"],
        &["2024-01", "2024-02"],
        1,
        LoadOptions::default(),
    );
    assert!(matches!(result, Err(LoaderError::PartitionNotFound { .. })));
}

#[test]
fn test_missing_partition_in_late_batch_fails_before_first_batch() {
    let temp_dir = TempDir::new().unwrap();
    write_trip_partition(temp_dir.path(), "2024-01", &TripFixture::standard(3));
    write_trip_partition(temp_dir.path(), "2024-02", &TripFixture::standard(3));
    let loader = TlcDataLoader::new(temp_dir.path()).unwrap();

    let result = loader.iter_batches(
        &["trip_miles"],
        &["2024-01", "2024-02", "2024-06"],
        1,
        LoadOptions::default(),
    );
    assert!(matches!(result, Err(LoaderError::PartitionNotFound { .. })));
}

#[test]
fn test_unknown_column_names_feature_and_month() {
    let temp_dir = TempDir::new().unwrap();
    let mut january = df!("trip_miles" => [1.0f64], "airport_fee" => [2.5f64]).unwrap();
    let mut february = df!("trip_miles" => [1.5f64]).unwrap();
    write_frame(temp_dir.path(), "2024-01", &mut january);
    write_frame(temp_dir.path(), "2024-02", &mut february);
    let loader = TlcDataLoader::new(temp_dir.path()).unwrap();

    // Present in January only
    let result = loader.load(
        &["trip_miles", "airport_fee"],
        &["2024-01", "2024-02"],
        LoadOptions::default(),
    );
    match result.unwrap_err() {
        LoaderError::UnknownColumn {
            column,
            month,
            missing,
            ..
        } => {
            assert_eq!(column, "airport_fee");
            assert_eq!(month, "2024-02");
            assert_eq!(missing, vec!["airport_fee".to_string()]);
        }
        other => panic!("Expected UnknownColumn error, got {:?}", other),
    }

    let result = loader.load_in_batches(
        &["trip_miles", "airport_fee"],
        &["2024-01", "2024-02"],
        2,
        LoadOptions::default(),
    );
    assert!(matches!(result, Err(LoaderError::UnknownColumn { .. })));
}

#[test]
fn test_invalid_arguments_rejected_before_io() {
    // Arguments are checked before the missing partitions could be noticed
    let temp_dir = TempDir::new().unwrap();
    let loader = TlcDataLoader::new(temp_dir.path()).unwrap();
    let none: [&str; 0] = [];

    let cases = [
        loader.load(&none, &["2024-01"], LoadOptions::default()),
        loader.load(&["trip_miles"], &none, LoadOptions::default()),
        loader.load(&["trip_miles"], &["2024-01", "2024-01"], LoadOptions::default()),
        loader.load(&["trip_miles", "trip_miles"], &["2024-01"], LoadOptions::default()),
        loader.load(&["trip_miles"], &["2024/01"], LoadOptions::default()),
        loader.load(
            &["trip_miles"],
            &["2024-01"],
            LoadOptions::default().with_sample_ratio(0.0),
        ),
        loader.load(
            &["trip_miles"],
            &["2024-01"],
            LoadOptions::default().with_sample_ratio(1.5),
        ),
        loader.load_in_batches(&["trip_miles"], &["2024-01"], 0, LoadOptions::default()),
    ];

    for (i, result) in cases.into_iter().enumerate() {
        assert!(
            matches!(result, Err(LoaderError::InvalidArgument { .. })),
            "case {} was not rejected as an invalid argument",
            i
        );
    }
}

#[test]
fn test_empty_catalog() {
    let temp_dir = TempDir::new().unwrap();
    let loader = TlcDataLoader::new(temp_dir.path()).unwrap();

    assert!(matches!(
        loader.list_features(),
        Err(LoaderError::EmptyCatalog { .. })
    ));
    assert!(matches!(
        loader.available_months(),
        Err(LoaderError::EmptyCatalog { .. })
    ));
}

#[test]
fn test_invalid_config_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config = crate::config::LoaderConfig {
        memory_threshold: 0.0,
        ..Default::default()
    };

    let result = TlcDataLoader::new(temp_dir.path())
        .unwrap()
        .with_config(config);
    assert!(matches!(result, Err(LoaderError::InvalidArgument { .. })));
}
