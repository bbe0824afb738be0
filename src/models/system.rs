use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

/// Server information for connection troubleshooting.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    pub host: String,
    pub port: u16,
    pub local_ip: String,
    /// Seconds since startup.
    pub uptime: u64,
    pub network_status: NetworkStatus,
    pub network_access: NetworkAccess,
    pub connected_clients: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStatus {
    pub has_network: bool,
    pub interface_count: usize,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkAccess {
    pub local: String,
    pub network: String,
}

/// Full network diagnostics report for `GET /api/network-test`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkTestReport {
    pub timestamp: String,
    pub status: &'static str,
    pub has_network: bool,
    pub detected_ip: String,
    pub all_interfaces: Vec<InterfaceInfo>,
    pub request_info: RequestInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct InterfaceInfo {
    pub name: String,
    pub addresses: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestInfo {
    pub client_ip: String,
    pub origin: Option<String>,
    pub user_agent: Option<String>,
}
