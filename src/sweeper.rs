//! Time-based expiry of stored files.
//!
//! A background task scans the storage directory on a fixed interval
//! and removes anything older than the configured lifetime. Sweeper
//! deletions publish the same `fileDeleted` event as explicit API
//! deletes, so connected clients stay in sync without polling.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::task::JoinHandle;

use crate::error::Result;
use crate::events::{EventBus, FileEvent};
use crate::storage::StorageDir;

pub fn spawn(
    storage: Arc<StorageDir>,
    events: EventBus,
    lifetime: Duration,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(run(storage, events, lifetime, interval))
}

async fn run(storage: Arc<StorageDir>, events: EventBus, lifetime: Duration, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        match sweep_once(&storage, &events, lifetime).await {
            Ok(0) => {}
            Ok(n) => tracing::info!("Expiry sweep removed {} file(s)", n),
            // A failed scan must not halt the schedule; try again next tick.
            Err(e) => tracing::warn!("Expiry sweep failed: {}", e),
        }
    }
}

/// One sweep pass: remove every file whose last-modified timestamp is
/// older than `lifetime`. Per-file stat/delete errors are logged and
/// skipped. Abandoned upload temps (dotfiles) are reclaimed too, but
/// without a client-facing event since they were never listed.
pub async fn sweep_once(
    storage: &StorageDir,
    events: &EventBus,
    lifetime: Duration,
) -> Result<usize> {
    let now = SystemTime::now();
    let mut removed = 0;

    for file in storage.entries().await? {
        let age = match now.duration_since(file.modified) {
            Ok(age) => age,
            // Clock skew can put mtime in the future; treat as young.
            Err(_) => continue,
        };
        if age <= lifetime {
            continue;
        }

        let hidden = file.name.starts_with('.');
        let result = if hidden {
            tokio::fs::remove_file(storage.base().join(&file.name))
                .await
                .map_err(crate::error::AppError::from)
        } else {
            storage.remove(&file.name).await
        };

        match result {
            Ok(()) => {
                removed += 1;
                if !hidden {
                    events.publish(FileEvent::FileDeleted {
                        filename: file.name.clone(),
                    });
                }
            }
            Err(e) => tracing::warn!("Failed to expire {}: {}", file.name, e),
        }
    }

    Ok(removed)
}
