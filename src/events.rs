use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::FileRecord;

/// Bounded fan-out buffer per subscriber. A stalled client lags and
/// drops events instead of stalling the publisher; it resynchronizes
/// with a full listing.
const EVENT_BUFFER: usize = 64;

/// Registry-changing events pushed to every connected client.
///
/// Serialized as `{"event": "...", "data": ...}` envelopes on the wire.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum FileEvent {
    FileUploaded(FileRecord),
    FilesUploaded(Vec<FileRecord>),
    FileDeleted { filename: String },
    AllFilesDeleted,
}

/// Single-process broadcast channel for [`FileEvent`]s.
///
/// Delivery is best-effort at-most-once per connected client: whoever
/// is subscribed at publish time receives the event in publish order;
/// late subscribers see nothing and must call the list endpoint.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<FileEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_BUFFER);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FileEvent> {
        self.tx.subscribe()
    }

    /// Publish to all current subscribers. Having no subscribers is not
    /// an error; the event is simply dropped.
    pub fn publish(&self, event: FileEvent) {
        match self.tx.send(event) {
            Ok(n) => tracing::debug!("Published event to {} client(s)", n),
            Err(_) => tracing::debug!("Published event with no connected clients"),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// One live push-channel connection.
#[derive(Debug, Clone)]
pub struct ClientConnection {
    pub remote_addr: String,
    pub connected_at: DateTime<Utc>,
}

/// Set of currently open client connections. Mutated only on
/// connect/disconnect; no per-connection state outlives the connection.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    clients: Arc<DashMap<Uuid, ClientConnection>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, id: Uuid, remote_addr: String) {
        self.clients.insert(
            id,
            ClientConnection {
                remote_addr,
                connected_at: Utc::now(),
            },
        );
        tracing::info!("Client connected: {} ({} active)", id, self.clients.len());
    }

    pub fn remove(&self, id: &Uuid) {
        self.clients.remove(id);
        tracing::info!("Client disconnected: {} ({} active)", id, self.clients.len());
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> FileRecord {
        FileRecord {
            id: 1,
            name: name.to_string(),
            original_name: name.to_string(),
            size: 3,
            content_type: "application/octet-stream".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            url: format!("/uploads/{name}"),
            is_encrypted: false,
        }
    }

    #[test]
    fn events_serialize_as_tagged_envelopes() {
        let uploaded = serde_json::to_value(FileEvent::FileUploaded(record("a.txt"))).unwrap();
        assert_eq!(uploaded["event"], "fileUploaded");
        assert_eq!(uploaded["data"]["name"], "a.txt");

        let deleted = serde_json::to_value(FileEvent::FileDeleted {
            filename: "a.txt".to_string(),
        })
        .unwrap();
        assert_eq!(deleted["event"], "fileDeleted");
        assert_eq!(deleted["data"]["filename"], "a.txt");

        let cleared = serde_json::to_value(FileEvent::AllFilesDeleted).unwrap();
        assert_eq!(cleared["event"], "allFilesDeleted");
    }

    #[tokio::test]
    async fn all_subscribers_receive_published_events_in_order() {
        let bus = EventBus::new();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(FileEvent::FileUploaded(record("a.txt")));
        bus.publish(FileEvent::FileDeleted {
            filename: "a.txt".to_string(),
        });

        for rx in [&mut rx1, &mut rx2] {
            assert!(matches!(rx.recv().await.unwrap(), FileEvent::FileUploaded(_)));
            assert!(matches!(rx.recv().await.unwrap(), FileEvent::FileDeleted { .. }));
        }
    }

    #[tokio::test]
    async fn late_subscribers_miss_earlier_events() {
        let bus = EventBus::new();
        bus.publish(FileEvent::AllFilesDeleted);

        let mut rx = bus.subscribe();
        bus.publish(FileEvent::FileDeleted {
            filename: "b.txt".to_string(),
        });

        // Only the event published after subscribing arrives.
        assert!(matches!(rx.recv().await.unwrap(), FileEvent::FileDeleted { .. }));
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[test]
    fn registry_tracks_connect_and_disconnect() {
        let registry = ConnectionRegistry::new();
        let id = Uuid::new_v4();

        registry.register(id, "192.168.1.10:51000".to_string());
        assert_eq!(registry.len(), 1);

        registry.remove(&id);
        assert!(registry.is_empty());
    }
}
