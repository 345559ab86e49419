//! Immutable per-process check policy.

use std::time::Duration;

use crate::config::CheckConfig;
use crate::resilience::RetryPolicy;
use crate::session::Credentials;

/// Everything a check needs to know, fixed at startup.
#[derive(Debug, Clone)]
pub struct CheckPolicy {
    pub available_when_donor: bool,
    pub available_when_read_only: bool,
    pub database_host: String,
    pub credentials: Credentials,
    /// Skip the raw TCP probe and go straight to the session ping.
    pub tcp_check: bool,
    /// Per-attempt bound on a TCP connect or a ping.
    pub connect_timeout: Duration,
    pub connect_retry: RetryPolicy,
    pub ping_retry: RetryPolicy,
    pub deadline: Option<Duration>,
}

impl From<&CheckConfig> for CheckPolicy {
    fn from(config: &CheckConfig) -> Self {
        let probe = &config.probe;
        Self {
            available_when_donor: config.policy.available_when_donor,
            available_when_read_only: config.policy.available_when_read_only,
            database_host: config.database.host.clone(),
            credentials: Credentials::new(
                config.database.user.clone(),
                config.database.password.clone(),
            ),
            tcp_check: probe.tcp_check,
            connect_timeout: Duration::from_millis(probe.connect_timeout_ms),
            connect_retry: RetryPolicy::new(
                probe.connect_attempts,
                Duration::from_millis(probe.connect_backoff_ms),
            ),
            ping_retry: RetryPolicy::new(
                probe.ping_attempts,
                Duration::from_millis(probe.ping_backoff_ms),
            ),
            deadline: probe.deadline_secs.map(Duration::from_secs),
        }
    }
}
