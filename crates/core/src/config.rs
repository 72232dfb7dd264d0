//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. Nothing here reads process-wide environment variables directly:
//! binaries hand in a lookup function (normally `std::env::var`) so request handling never
//! consults the environment and tests can supply values explicitly.

use crate::constants::{
    DEFAULT_CHAIN_CONNECTOR_URL, DEFAULT_CHAIN_TIMEOUT_SECS, DEFAULT_NAME_CACHE_PATH,
    DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
};
use crate::{DashboardError, DashboardResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the dashboard server port.
pub const ENV_SERVER_PORT: &str = "DASHBOARD_SERVER_PORT";
/// Environment variable naming the dashboard bind host.
pub const ENV_SERVER_HOST: &str = "DASHBOARD_HOST";
/// Environment variable listing the accepted `Host` header values.
pub const ENV_ALLOWED_HOSTS: &str = "DASHBOARD_ALLOWED_HOSTS";
/// Environment variable overriding the chain connector base URL.
pub const ENV_CHAIN_CONNECTOR_URL: &str = "CHAIN_CONNECTOR_URL";
/// Environment variable overriding the chain request timeout.
pub const ENV_CHAIN_TIMEOUT_SECS: &str = "CHAIN_REQUEST_TIMEOUT_SECS";
/// Environment variable overriding the name cache location.
pub const ENV_NAME_CACHE_PATH: &str = "AGENT_NAME_CACHE_PATH";

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    chain_connector_url: String,
    chain_timeout: Duration,
    name_cache_path: PathBuf,
    server_host: String,
    server_port: u16,
    allowed_hosts: Vec<String>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// The connector URL must be an `http(s)` URL; a trailing slash is dropped so paths can be
    /// appended verbatim.
    pub fn new(
        chain_connector_url: impl Into<String>,
        chain_timeout: Duration,
        name_cache_path: PathBuf,
    ) -> DashboardResult<Self> {
        let url = chain_connector_url.into();
        let url = url.trim().trim_end_matches('/').to_string();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(DashboardError::InvalidConfig(format!(
                "chain connector URL must start with http:// or https://, got {url:?}"
            )));
        }
        if chain_timeout.is_zero() {
            return Err(DashboardError::InvalidConfig(
                "chain request timeout must be greater than zero".into(),
            ));
        }

        Ok(Self {
            chain_connector_url: url,
            chain_timeout,
            name_cache_path,
            server_host: DEFAULT_SERVER_HOST.into(),
            server_port: DEFAULT_SERVER_PORT,
            allowed_hosts: Vec::new(),
        })
    }

    /// Resolve the full configuration through `lookup`, falling back to defaults for unset or
    /// blank values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> DashboardResult<Self> {
        let value = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let url = value(ENV_CHAIN_CONNECTOR_URL)
            .unwrap_or_else(|| DEFAULT_CHAIN_CONNECTOR_URL.into());
        let timeout = timeout_from_env_value(value(ENV_CHAIN_TIMEOUT_SECS))?;
        let cache_path = value(ENV_NAME_CACHE_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_NAME_CACHE_PATH));

        let mut cfg = Self::new(url, timeout, cache_path)?;
        cfg.server_port = port_from_env_value(value(ENV_SERVER_PORT))?;
        if let Some(host) = value(ENV_SERVER_HOST) {
            cfg.server_host = host;
        }
        cfg.allowed_hosts = allowed_hosts_from_env_value(value(ENV_ALLOWED_HOSTS));
        Ok(cfg)
    }

    pub fn chain_connector_url(&self) -> &str {
        &self.chain_connector_url
    }

    pub fn chain_timeout(&self) -> Duration {
        self.chain_timeout
    }

    pub fn name_cache_path(&self) -> &Path {
        &self.name_cache_path
    }

    /// Address string suitable for `TcpListener::bind`.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Accepted `Host` header values; empty means every host is accepted.
    pub fn allowed_hosts(&self) -> &[String] {
        &self.allowed_hosts
    }
}

/// Parse the server port from an optional string value.
///
/// If `value` is `None`, returns [`DEFAULT_SERVER_PORT`]. Zero is rejected because the
/// dashboard is expected on a stable, known port.
pub fn port_from_env_value(value: Option<String>) -> DashboardResult<u16> {
    let Some(raw) = value else {
        return Ok(DEFAULT_SERVER_PORT);
    };
    match raw.trim().parse::<u16>() {
        Ok(0) | Err(_) => Err(DashboardError::InvalidConfig(format!(
            "{ENV_SERVER_PORT} must be a port number between 1 and 65535, got {raw:?}"
        ))),
        Ok(port) => Ok(port),
    }
}

/// Parse the chain request timeout (whole seconds) from an optional string value.
pub fn timeout_from_env_value(value: Option<String>) -> DashboardResult<Duration> {
    let Some(raw) = value else {
        return Ok(Duration::from_secs(DEFAULT_CHAIN_TIMEOUT_SECS));
    };
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(DashboardError::InvalidConfig(format!(
            "{ENV_CHAIN_TIMEOUT_SECS} must be a positive number of seconds, got {raw:?}"
        ))),
    }
}

/// Split a comma-separated host list, lower-casing entries and dropping blanks.
pub fn allowed_hosts_from_env_value(value: Option<String>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(|h| h.trim().to_ascii_lowercase())
        .filter(|h| !h.is_empty())
        .collect()
}
