//! `Host` header allow-listing.
//!
//! When the dashboard is exposed on a network, `DASHBOARD_ALLOWED_HOSTS` restricts which host
//! names it answers to. Requests for any other host are refused before routing.

use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

pub(crate) async fn allowed_hosts_guard(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    if state.allowed_hosts.is_empty() {
        return next.run(req).await;
    }

    let host = req
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| req.uri().host())
        .map(|h| strip_port(h).to_ascii_lowercase());

    match host {
        Some(host) if state.allowed_hosts.iter().any(|allowed| *allowed == host) => {
            next.run(req).await
        }
        other => {
            tracing::warn!("rejected request for host {:?}", other);
            (StatusCode::FORBIDDEN, "Host not allowed").into_response()
        }
    }
}

/// `example.com:2345` → `example.com`, `[::1]:2345` → `::1`.
pub(crate) fn strip_port(host: &str) -> &str {
    if let Some(rest) = host.strip_prefix('[') {
        return rest.split(']').next().unwrap_or(rest);
    }
    match host.rsplit_once(':') {
        Some((name, port)) if port.bytes().all(|b| b.is_ascii_digit()) => name,
        _ => host,
    }
}

#[cfg(test)]
mod tests {
    use super::strip_port;

    #[test]
    fn strips_ports_from_names_and_ipv6() {
        assert_eq!(strip_port("dashboard.example.com:2345"), "dashboard.example.com");
        assert_eq!(strip_port("localhost"), "localhost");
        assert_eq!(strip_port("[::1]:2345"), "::1");
        assert_eq!(strip_port("[::1]"), "::1");
    }
}
