// tests/storage_test.rs


use std::sync::Arc;

use tempfile::TempDir;
use tokio::sync::watch;

use test_helpers::{config_json, create_test_engine, widget_json};
use widgetic::RotationState;
use widgetic::store::{DisplayCountStore, FileStorage};

#[tokio::test(start_paused = true)]
async fn test_file_storage_carries_counts_across_runs() {
    let dir = TempDir::new().unwrap();
    let config = config_json(vec![
        widget_json("A", "NOTIFICATION", 1),
        widget_json("B", "SLIDE_IN", 2),
    ]);

    // First run: A once, B once, B again, then exhausted
    let storage = Arc::new(FileStorage::open(dir.path(), "session-1").unwrap());
    let first = create_test_engine(config.clone(), storage).await;
    let (_tx, rx) = watch::channel(false);
    let engine = first.engine.run(rx).await;
    assert_eq!(engine.state(), RotationState::Exhausted);
    assert_eq!(first.host.shown(), vec!["A", "B", "B"]);

    // Reopening the same session sees the persisted counters
    let reopened = Arc::new(FileStorage::open(dir.path(), "session-1").unwrap());
    let counts = DisplayCountStore::new(reopened.clone());
    assert_eq!(counts.get("A"), 1);
    assert_eq!(counts.get("B"), 2);

    let second = create_test_engine(config.clone(), reopened).await;
    let (_tx, rx) = watch::channel(false);
    second.engine.run(rx).await;
    assert!(second.host.shown().is_empty());

    // A different session starts from zero
    let fresh = Arc::new(FileStorage::open(dir.path(), "session-2").unwrap());
    let third = create_test_engine(config, fresh).await;
    assert_eq!(third.engine.scheduler().display_count("A"), Some(0));
    assert_eq!(third.engine.scheduler().display_count("B"), Some(0));
}
