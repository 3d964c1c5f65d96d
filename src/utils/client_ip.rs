use std::net::{IpAddr, SocketAddr};

use actix_web::HttpRequest;

pub const UNKNOWN_IP: &str = "unknown";

/// Address recorded for a click.
///
/// Without `trust_proxy_headers` only the socket peer is used, so clients
/// cannot spoof their address through `Forwarded`/`X-Forwarded-For`.
pub fn client_ip(req: &HttpRequest, trust_proxy_headers: bool) -> String {
    if trust_proxy_headers {
        let info = req.connection_info();
        if let Some(addr) = info.realip_remote_addr() {
            return normalize_ip(addr);
        }
    }

    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_IP.to_string())
}

/// Strips ports and IPv6 brackets; anything unparsable is kept verbatim
pub fn normalize_ip(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(socket) = raw.parse::<SocketAddr>() {
        return socket.ip().to_string();
    }
    let unbracketed = raw.trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = unbracketed.parse::<IpAddr>() {
        return ip.to_string();
    }
    raw.to_string()
}
