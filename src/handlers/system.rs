use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Host, State},
    http::{header, HeaderMap},
    Json,
};
use chrono::Utc;

use crate::models::{HealthResponse, NetworkAccess, NetworkTestReport, RequestInfo, ServerInfo};
use crate::net;
use crate::AppState;

/// Health check
/// GET /api/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Server information for connection troubleshooting
/// GET /api/server-info
pub async fn server_info(
    State(state): State<AppState>,
    Host(host): Host,
) -> Json<ServerInfo> {
    let port = state.config.server.port;
    Json(ServerInfo {
        host,
        port,
        local_ip: state.local_ip.clone(),
        uptime: state.started_at.elapsed().as_secs(),
        network_status: net::test_connectivity(),
        network_access: NetworkAccess {
            local: format!("http://localhost:{port}"),
            network: format!("http://{}:{port}", state.local_ip),
        },
        connected_clients: state.connections.len(),
    })
}

/// Network diagnostics
/// GET /api/network-test
pub async fn network_test(
    State(state): State<AppState>,
    headers: HeaderMap,
    addr: Option<ConnectInfo<SocketAddr>>,
) -> Json<NetworkTestReport> {
    let status = net::test_connectivity();

    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    Json(NetworkTestReport {
        timestamp: Utc::now().to_rfc3339(),
        status: status.status,
        has_network: status.has_network,
        detected_ip: state.local_ip.clone(),
        all_interfaces: net::interfaces(),
        request_info: RequestInfo {
            client_ip: addr
                .map(|ConnectInfo(a)| a.ip().to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            origin: header_str(header::ORIGIN),
            user_agent: header_str(header::USER_AGENT),
        },
    })
}
