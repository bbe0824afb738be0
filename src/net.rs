//! Local network discovery and connectivity diagnostics.

use std::net::IpAddr;

use local_ip_address::list_afinet_netifas;

use crate::models::{InterfaceInfo, NetworkStatus};

/// Pick the address other LAN devices are most likely to reach:
/// common private ranges first, then WiFi/Ethernet interface names.
/// Falls back to "localhost" when no external IPv4 interface exists.
pub fn detect_local_ip() -> String {
    let Ok(netifas) = list_afinet_netifas() else {
        return "localhost".to_string();
    };

    let mut candidates: Vec<(i32, String)> = netifas
        .iter()
        .filter_map(|(name, ip)| match ip {
            IpAddr::V4(v4) if !v4.is_loopback() => {
                let address = v4.to_string();
                Some((priority(&address, name), address))
            }
            _ => None,
        })
        .collect();

    candidates.sort_by(|a, b| b.0.cmp(&a.0));
    candidates
        .into_iter()
        .next()
        .map(|(_, address)| address)
        .unwrap_or_else(|| "localhost".to_string())
}

fn priority(address: &str, interface_name: &str) -> i32 {
    if address.starts_with("192.168.") {
        return 100;
    }
    if address.starts_with("10.") {
        return 90;
    }
    if address.starts_with("172.") {
        return 80;
    }

    let name = interface_name.to_lowercase();
    if name.contains("wifi") || name.contains("wireless") {
        return 70;
    }
    if name.contains("ethernet") || name.contains("eth") {
        return 60;
    }

    50
}

/// Report whether any external IPv4 interface is up.
pub fn test_connectivity() -> NetworkStatus {
    match list_afinet_netifas() {
        Ok(netifas) => {
            let mut names: Vec<&str> = netifas.iter().map(|(name, _)| name.as_str()).collect();
            names.sort_unstable();
            names.dedup();

            let has_network = netifas
                .iter()
                .any(|(_, ip)| matches!(ip, IpAddr::V4(v4) if !v4.is_loopback()));

            NetworkStatus {
                has_network,
                interface_count: names.len(),
                status: if has_network {
                    "Connected"
                } else {
                    "No network detected"
                },
            }
        }
        Err(_) => NetworkStatus {
            has_network: false,
            interface_count: 0,
            status: "Network detection failed",
        },
    }
}

/// All IPv4 interfaces grouped by name, for the diagnostics endpoint.
pub fn interfaces() -> Vec<InterfaceInfo> {
    let Ok(netifas) = list_afinet_netifas() else {
        return Vec::new();
    };

    let mut out: Vec<InterfaceInfo> = Vec::new();
    for (name, ip) in netifas {
        let IpAddr::V4(v4) = ip else { continue };
        match out.iter_mut().find(|i| i.name == name) {
            Some(info) => info.addresses.push(v4.to_string()),
            None => out.push(InterfaceInfo {
                name,
                addresses: vec![v4.to_string()],
            }),
        }
    }
    out
}
