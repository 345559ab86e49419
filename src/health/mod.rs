//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound check (check.rs):
//!     → probe.rs: TCP reachability (long backoff, optional)
//!     → probe.rs: open session (lazy)
//!     → probe.rs: ping until live (short backoff)
//!     → evaluator.rs: read wsrep_local_state, wsrep_cluster_status
//!     → evaluator.rs: apply policy.rs (donor / read-only toggles)
//!     → verdict.rs: Available | Unavailable(reason)
//!     → session closed
//!
//! State codes (state.rs):
//!     1 Joining, 2 Donor/Desynced, 3 Joined, 4 Synced
//! ```
//!
//! # Design Decisions
//! - Connectivity failures are retried, state answers are not
//! - One session per check, closed on every path
//! - Nothing but the immutable policy is shared between checks

pub mod check;
pub mod evaluator;
pub mod policy;
pub mod probe;
pub mod state;
pub mod verdict;

pub use check::ClusterCheck;
pub use policy::CheckPolicy;
pub use state::{ClusterNodeState, LocalState};
pub use verdict::{Reason, Verdict};
