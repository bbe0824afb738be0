use std::net::SocketAddr;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        ConnectInfo, State,
    },
    response::IntoResponse,
};
use chrono::Utc;
use futures::{SinkExt, StreamExt};
use serde_json::json;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use crate::AppState;

/// Push channel for live registry updates
/// GET /ws
pub async fn ws_handler(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    addr: Option<ConnectInfo<SocketAddr>>,
) -> impl IntoResponse {
    let remote = addr
        .map(|ConnectInfo(a)| a.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    ws.on_upgrade(move |socket| handle_socket(state, socket, remote))
}

async fn handle_socket(state: AppState, socket: WebSocket, remote: String) {
    let id = Uuid::new_v4();
    state.connections.register(id, remote);

    let (mut sender, mut receiver) = socket.split();
    let mut events = state.events.subscribe();

    // Connection confirmation, mirroring the `connected` event clients
    // key off before requesting their first listing.
    let connected = connected_hello(id, &state.local_ip);
    if sender.send(Message::Text(connected)).await.is_err() {
        state.connections.remove(&id);
        return;
    }

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    let payload = match serde_json::to_string(&event) {
                        Ok(p) => p,
                        Err(e) => {
                            tracing::error!("Failed to serialize event: {}", e);
                            continue;
                        }
                    };
                    if sender.send(Message::Text(payload)).await.is_err() {
                        break;
                    }
                }
                // This client fell behind and missed events; it will
                // resynchronize with a full listing. Keep forwarding.
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!("Client {} lagged, dropped {} event(s)", id, missed);
                }
                Err(RecvError::Closed) => break,
            },
            msg = receiver.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    if let Some(pong) = answer_ping(&text) {
                        if sender.send(Message::Text(pong)).await.is_err() {
                            break;
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!("WebSocket error for {}: {}", id, e);
                    break;
                }
            },
        }
    }

    state.connections.remove(&id);
}

fn connected_hello(id: Uuid, local_ip: &str) -> String {
    json!({
        "event": "connected",
        "data": {
            "message": "Connected to file transfer server",
            "serverId": id,
            "timestamp": Utc::now().to_rfc3339(),
            "serverIp": local_ip,
        }
    })
    .to_string()
}

/// Liveness probe: echo the client's timestamp back together with the
/// server's, so the client can compute round-trip latency.
fn answer_ping(text: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    if value.get("event")? != "ping" {
        return None;
    }
    let timestamp = value
        .get("data")
        .and_then(|d| d.get("timestamp"))
        .cloned()
        .unwrap_or(serde_json::Value::Null);

    Some(
        json!({
            "event": "pong",
            "data": {
                "timestamp": timestamp,
                "serverTime": Utc::now().timestamp_millis(),
            }
        })
        .to_string(),
    )
}
