//! Expiry sweeper behavior: old files go, young files stay, and
//! connected clients hear about visible removals.

use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::broadcast::error::TryRecvError;

use landrop::events::{EventBus, FileEvent};
use landrop::storage::StorageDir;
use landrop::sweeper::sweep_once;

#[tokio::test]
async fn old_files_are_swept_and_young_files_survive() {
    let dir = TempDir::new().unwrap();
    let storage = StorageDir::new(dir.path());
    let events = EventBus::new();
    let mut rx = events.subscribe();

    tokio::fs::write(dir.path().join("old.txt"), b"stale").await.unwrap();
    tokio::time::sleep(Duration::from_millis(120)).await;
    tokio::fs::write(dir.path().join("young.txt"), b"fresh").await.unwrap();

    let removed = sweep_once(&storage, &events, Duration::from_millis(60))
        .await
        .unwrap();
    assert_eq!(removed, 1);

    let remaining = storage.visible().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].name, "young.txt");

    // Sweeper deletes publish the same event as API deletes.
    match rx.try_recv().unwrap() {
        FileEvent::FileDeleted { filename } => assert_eq!(filename, "old.txt"),
        other => panic!("expected fileDeleted, got {other:?}"),
    }
}

#[tokio::test]
async fn young_files_survive_a_full_lifetime_sweep() {
    let dir = TempDir::new().unwrap();
    let storage = StorageDir::new(dir.path());
    let events = EventBus::new();

    tokio::fs::write(dir.path().join("fresh.txt"), b"data").await.unwrap();

    let removed = sweep_once(&storage, &events, Duration::from_secs(3600))
        .await
        .unwrap();
    assert_eq!(removed, 0);
    assert_eq!(storage.visible().await.unwrap().len(), 1);
}

#[tokio::test]
async fn abandoned_upload_temps_are_reclaimed_silently() {
    let dir = TempDir::new().unwrap();
    let storage = StorageDir::new(dir.path());
    let events = EventBus::new();
    let mut rx = events.subscribe();

    tokio::fs::write(dir.path().join(".dead-beef.part"), b"partial").await.unwrap();
    tokio::time::sleep(Duration::from_millis(80)).await;

    let removed = sweep_once(&storage, &events, Duration::from_millis(40))
        .await
        .unwrap();
    assert_eq!(removed, 1);
    assert!(storage.entries().await.unwrap().is_empty());

    // Temps were never listed, so no client-facing event is emitted.
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn sweep_of_empty_directory_is_a_no_op() {
    let dir = TempDir::new().unwrap();
    let storage = StorageDir::new(dir.path());
    let events = EventBus::new();

    let removed = sweep_once(&storage, &events, Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(removed, 0);
}
