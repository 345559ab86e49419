//! Database session subsystem.
//!
//! # Data Flow
//! ```text
//! health check
//!     → SessionConnector::open (lazy handle, no I/O)
//!     → ClusterSession::ping (liveness, retried by the probe)
//!     → ClusterSession::status_variable / config_variable (state reads)
//!     → ClusterSession::close (always, on every exit path)
//! ```
//!
//! # Design Decisions
//! - The health logic only sees this four-operation surface, never a driver
//! - Variable lookups are parameterized by name, never string-built
//! - One session per check; nothing is pooled across requests

pub mod mysql;

use async_trait::async_trait;

pub use mysql::MySqlConnector;

/// Default MySQL port used when the host has none.
pub const DEFAULT_PORT: u16 = 3306;

/// Errors raised by a database session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid database address {0:?}")]
    InvalidTarget(String),

    #[error("database error: {0}")]
    Database(#[from] mysql_async::Error),

    #[error("variable {0} not found")]
    VariableMissing(String),

    #[error("session unavailable: {0}")]
    Unavailable(String),
}

/// User and password for the check session.
#[derive(Clone, Default)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// An open session against one cluster node.
#[async_trait]
pub trait ClusterSession: Send + Sync {
    /// Look up a global status variable (e.g. `wsrep_local_state`).
    async fn status_variable(&self, name: &str) -> Result<String, SessionError>;

    /// Look up a global configuration variable (e.g. `read_only`).
    async fn config_variable(&self, name: &str) -> Result<String, SessionError>;

    /// Lightweight liveness check.
    async fn ping(&self) -> Result<(), SessionError>;

    /// Release the session and any connection behind it.
    async fn close(&self) -> Result<(), SessionError>;
}

/// Opens sessions. Opening must not block on the network.
pub trait SessionConnector: Send + Sync {
    fn open(
        &self,
        host: &str,
        credentials: &Credentials,
    ) -> Result<Box<dyn ClusterSession>, SessionError>;
}

/// Split a `host[:port]` address into its parts.
pub fn parse_target(target: &str) -> Result<(String, u16), SessionError> {
    let invalid = || SessionError::InvalidTarget(target.to_string());

    let (host, port) = match target.rsplit_once(':') {
        // IPv6 literal without port, e.g. "[::1]"
        Some((_, rest)) if rest.ends_with(']') => (target, DEFAULT_PORT),
        Some((host, port)) => (host, port.parse::<u16>().map_err(|_| invalid())?),
        None => (target, DEFAULT_PORT),
    };

    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.is_empty() {
        return Err(invalid());
    }

    Ok((host.to_string(), port))
}
