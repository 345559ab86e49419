//! Check outcome.

use crate::health::evaluator::ReadError;
use crate::health::probe::ProbeError;

/// Body text reported for an available node.
pub const SYNCED_MESSAGE: &str = "Percona XtraDB Cluster node is synced.";

/// Final outcome of one health check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Available,
    Unavailable(Reason),
}

impl Verdict {
    pub fn is_available(&self) -> bool {
        matches!(self, Verdict::Available)
    }
}

/// Why a node was reported unavailable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Reason {
    #[error("connection to {host} failed after {attempts} attempts: {detail}")]
    ConnectionRefused {
        host: String,
        attempts: u32,
        detail: String,
    },

    #[error("session open failed: {0}")]
    SessionOpenFailed(String),

    #[error("liveness check failed after {attempts} attempts: {detail}")]
    LivenessCheckFailed { attempts: u32, detail: String },

    #[error("failed to read {name}")]
    VariableReadFailed { name: &'static str },

    #[error("read_only lookup failed")]
    ReadOnlyLookupFailed,

    #[error("not ready")]
    NotReady,

    #[error("read-only")]
    ReadOnly,
}

impl Reason {
    /// Stable label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Reason::ConnectionRefused { .. } => "connection_refused",
            Reason::SessionOpenFailed(_) => "session_open_failed",
            Reason::LivenessCheckFailed { .. } => "liveness_check_failed",
            Reason::VariableReadFailed { .. } => "variable_read_failed",
            Reason::ReadOnlyLookupFailed => "read_only_lookup_failed",
            Reason::NotReady => "not_ready",
            Reason::ReadOnly => "read_only",
        }
    }
}

impl From<ProbeError> for Reason {
    fn from(err: ProbeError) -> Self {
        match err {
            ProbeError::ConnectionRefused {
                host,
                attempts,
                source,
            } => Reason::ConnectionRefused {
                host,
                attempts,
                detail: source.to_string(),
            },
            ProbeError::SessionOpenFailed(source) => Reason::SessionOpenFailed(source.to_string()),
            ProbeError::LivenessCheckFailed { attempts, source } => Reason::LivenessCheckFailed {
                attempts,
                detail: source.to_string(),
            },
        }
    }
}

impl From<ReadError> for Reason {
    fn from(err: ReadError) -> Self {
        match err {
            ReadError::VariableReadFailed { name, .. } => Reason::VariableReadFailed { name },
        }
    }
}

impl From<Reason> for Verdict {
    fn from(reason: Reason) -> Self {
        Verdict::Unavailable(reason)
    }
}
