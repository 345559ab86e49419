//! Cluster node replication state.
//!
//! # States (`wsrep_local_state`)
//! ```text
//! 1 Joining
//! 2 Donor / Desynced   (one code, two meanings)
//! 3 Joined
//! 4 Synced
//! ```
//!
//! # Design Decisions
//! - Codes are compared as the exact strings the server reports
//! - Donor and desynced share code 2 and are never told apart
//! - State is read fresh on every check, never cached

use std::fmt;

/// Status variable holding the replication state code.
pub const LOCAL_STATE_VARIABLE: &str = "wsrep_local_state";
/// Status variable holding the cluster component status.
pub const CLUSTER_STATUS_VARIABLE: &str = "wsrep_cluster_status";
/// Configuration variable holding the read-only flag.
pub const READ_ONLY_VARIABLE: &str = "read_only";

pub const JOINING_CODE: &str = "1";
pub const DONOR_DESYNCED_CODE: &str = "2";
pub const JOINED_CODE: &str = "3";
pub const SYNCED_CODE: &str = "4";

/// Cluster status of a node in the primary component.
pub const PRIMARY_STATUS: &str = "Primary";
/// Read-only flag value that blocks traffic.
pub const READ_ONLY_ON: &str = "ON";

/// Decoded `wsrep_local_state`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalState {
    Joining,
    DonorDesynced,
    Joined,
    Synced,
    Unknown(String),
}

impl LocalState {
    pub fn from_code(code: &str) -> Self {
        match code {
            JOINING_CODE => LocalState::Joining,
            DONOR_DESYNCED_CODE => LocalState::DonorDesynced,
            JOINED_CODE => LocalState::Joined,
            SYNCED_CODE => LocalState::Synced,
            other => LocalState::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for LocalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalState::Joining => write!(f, "joining"),
            LocalState::DonorDesynced => write!(f, "donor/desynced"),
            LocalState::Joined => write!(f, "joined"),
            LocalState::Synced => write!(f, "synced"),
            LocalState::Unknown(code) => write!(f, "unknown({})", code),
        }
    }
}

/// Snapshot of the two mandatory state variables for one check.
///
/// The read-only flag is not part of the snapshot: it is only looked up
/// when the policy needs it, into a value local to that check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterNodeState {
    pub local_state: String,
    pub cluster_status: String,
}

impl ClusterNodeState {
    pub fn new(local_state: impl Into<String>, cluster_status: impl Into<String>) -> Self {
        Self {
            local_state: local_state.into(),
            cluster_status: cluster_status.into(),
        }
    }

    pub fn local(&self) -> LocalState {
        LocalState::from_code(&self.local_state)
    }

    pub fn is_primary(&self) -> bool {
        self.cluster_status == PRIMARY_STATUS
    }
}
