//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (attempts >= 1, timeouts > 0)
//! - Check that addresses parse before anything binds
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: CheckConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::CheckConfig;
use crate::session::parse_target;

/// A single semantic problem with a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),

    #[error("observability.metrics_address {0:?} is not a socket address")]
    MetricsAddress(String),

    #[error("database.host must not be empty")]
    EmptyHost,

    #[error("database.host {0:?} is not a host[:port] address")]
    InvalidHost(String),

    #[error("probe.{0} must be at least 1")]
    ZeroAttempts(&'static str),

    #[error("probe.connect_timeout_ms must be greater than 0")]
    ZeroTimeout,

    #[error("probe.deadline_secs must be greater than 0 when set")]
    ZeroDeadline,
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &CheckConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.database.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    } else if parse_target(&config.database.host).is_err() {
        errors.push(ValidationError::InvalidHost(config.database.host.clone()));
    }

    let probe = &config.probe;
    if probe.connect_attempts == 0 {
        errors.push(ValidationError::ZeroAttempts("connect_attempts"));
    }
    if probe.ping_attempts == 0 {
        errors.push(ValidationError::ZeroAttempts("ping_attempts"));
    }
    if probe.connect_timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    if probe.deadline_secs == Some(0) {
        errors.push(ValidationError::ZeroDeadline);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
