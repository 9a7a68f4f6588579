use axum::http::HeaderMap;
use std::net::SocketAddr;
use std::time::Duration;

/// Resolved caller address, attached to the request by the access logger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAddr(pub String);

impl std::fmt::Display for ClientAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// X-Forwarded-For (first hop) → X-Real-Ip → connection host.
pub fn client_addr(headers: &HeaderMap, remote: Option<SocketAddr>) -> ClientAddr {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
    };

    if let Some(xff) = header("x-forwarded-for") {
        let first = xff.split(',').next().unwrap_or_default();
        return ClientAddr(first.trim().to_string());
    }
    if let Some(real_ip) = header("x-real-ip") {
        return ClientAddr(real_ip.trim().to_string());
    }
    match remote {
        Some(addr) => ClientAddr(addr.ip().to_string()),
        None => ClientAddr("unknown".to_string()),
    }
}

/// Per-request trace, logged once when the response is ready.
#[derive(Debug)]
pub struct RequestTrace {
    pub method: String,
    pub path: String,
    pub client: ClientAddr,
    pub status: u16,
    pub bytes: u64,
    pub duration: Duration,
}

impl RequestTrace {
    pub fn log(&self) {
        tracing::info!(
            method = %self.method,
            path = %self.path,
            client = %self.client,
            status = self.status,
            bytes = self.bytes,
            duration_ms = self.duration.as_secs_f64() * 1000.0,
            "Response sent"
        );
    }
}
