//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the check
//! service. All types derive Serde traits for deserialization from config
//! files; every section falls back to the defaults the service has always
//! shipped with, so an empty file (or no file at all) is a valid config.

use serde::{Deserialize, Serialize};

/// Root configuration for the cluster check service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CheckConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Database endpoint and credentials.
    pub database: DatabaseConfig,

    /// Availability policy toggles.
    pub policy: PolicyConfig,

    /// Connectivity probe retry settings.
    pub probe: ProbeConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:9200").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:9200".to_string(),
        }
    }
}

/// Database endpoint configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database address as `host:port`.
    pub host: String,

    /// User to authenticate as.
    pub user: String,

    /// Password for `user`. Empty means no password.
    pub password: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1:3306".to_string(),
            user: "root".to_string(),
            password: String::new(),
        }
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Availability policy toggles.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Report donor/desynced nodes as available.
    pub available_when_donor: bool,

    /// Report read-only nodes as available (skips the read_only lookup).
    pub available_when_read_only: bool,
}

/// Connectivity probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Run the raw TCP reachability probe before opening a session.
    pub tcp_check: bool,

    /// Per-attempt timeout for TCP connects and pings, in milliseconds.
    pub connect_timeout_ms: u64,

    /// Total TCP reachability attempts.
    pub connect_attempts: u32,

    /// Sleep between TCP reachability attempts, in milliseconds.
    pub connect_backoff_ms: u64,

    /// Total session ping attempts.
    pub ping_attempts: u32,

    /// Sleep between session ping attempts, in milliseconds.
    pub ping_backoff_ms: u64,

    /// Optional upper bound on a single check, in seconds.
    /// Retry loops stop once another sleep would cross it.
    pub deadline_secs: Option<u64>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            tcp_check: true,
            connect_timeout_ms: 2_000,
            connect_attempts: 10,
            connect_backoff_ms: 5_000,
            ping_attempts: 10,
            ping_backoff_ms: 1_000,
            deadline_secs: None,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9104".to_string(),
        }
    }
}
