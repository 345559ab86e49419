//! Cluster state evaluation.
//!
//! # Decision Order
//! ```text
//! primary_and_synced = cluster_status == "Primary" && local_state == 4
//! donor_eligible     = available_when_donor && local_state == 2
//!
//! neither                          → Unavailable("not ready")
//! !available_when_read_only:
//!     read_only lookup fails       → Unavailable("read_only lookup failed")
//!     read_only == "ON"            → Unavailable("read-only")
//! otherwise                        → Available
//! ```
//!
//! # Design Decisions
//! - No retries here: a state answer is authoritative for this check
//! - Any read failure is terminal; nothing partial is ever reported
//! - The read-only flag lives only for the duration of one evaluation

use std::future::Future;
use std::time::Duration;

use tokio::time;

use crate::health::policy::CheckPolicy;
use crate::health::state::{
    ClusterNodeState, LocalState, CLUSTER_STATUS_VARIABLE, LOCAL_STATE_VARIABLE, READ_ONLY_ON,
    READ_ONLY_VARIABLE,
};
use crate::health::verdict::{Reason, Verdict};
use crate::session::{ClusterSession, SessionError};

/// Failure to read a state variable.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("failed to read {name}: {source}")]
    VariableReadFailed {
        name: &'static str,
        source: SessionError,
    },
}

/// Read the two mandatory status variables, each bounded by `timeout`.
pub async fn read_state(
    session: &dyn ClusterSession,
    timeout: Duration,
) -> Result<ClusterNodeState, ReadError> {
    let local_state = read_status(session, LOCAL_STATE_VARIABLE, timeout).await?;
    let cluster_status = read_status(session, CLUSTER_STATUS_VARIABLE, timeout).await?;

    Ok(ClusterNodeState {
        local_state,
        cluster_status,
    })
}

async fn read_status(
    session: &dyn ClusterSession,
    name: &'static str,
    timeout: Duration,
) -> Result<String, ReadError> {
    bounded(name, timeout, session.status_variable(name)).await.map_err(|source| {
        tracing::error!(variable = name, error = %source, "Status variable read failed");
        ReadError::VariableReadFailed { name, source }
    })
}

/// A stalled read counts as a failed one.
async fn bounded<F>(name: &str, timeout: Duration, read: F) -> Result<String, SessionError>
where
    F: Future<Output = Result<String, SessionError>>,
{
    match time::timeout(timeout, read).await {
        Ok(outcome) => outcome,
        Err(_) => Err(SessionError::Unavailable(format!(
            "reading {} timed out after {:?}",
            name, timeout
        ))),
    }
}

/// Apply the availability policy to `state`.
///
/// `session` is only used for the read-only lookup, which is bounded by
/// `policy.connect_timeout`.
pub async fn evaluate(
    state: &ClusterNodeState,
    policy: &CheckPolicy,
    session: &dyn ClusterSession,
) -> Verdict {
    let local = state.local();
    let primary_and_synced = state.is_primary() && local == LocalState::Synced;
    let donor_eligible = policy.available_when_donor && local == LocalState::DonorDesynced;

    tracing::debug!(
        local_state = %local,
        cluster_status = %state.cluster_status,
        primary_and_synced,
        donor_eligible,
        "Evaluating node state"
    );

    if !primary_and_synced && !donor_eligible {
        tracing::warn!(
            local_state = %local,
            cluster_status = %state.cluster_status,
            "Node not ready"
        );
        return Verdict::Unavailable(Reason::NotReady);
    }

    if !policy.available_when_read_only {
        let lookup = session.config_variable(READ_ONLY_VARIABLE);
        let read_only = match bounded(READ_ONLY_VARIABLE, policy.connect_timeout, lookup).await {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(variable = READ_ONLY_VARIABLE, error = %e, "Config variable read failed");
                return Verdict::Unavailable(Reason::ReadOnlyLookupFailed);
            }
        };

        if read_only == READ_ONLY_ON {
            tracing::warn!("Node is read-only");
            return Verdict::Unavailable(Reason::ReadOnly);
        }
    }

    Verdict::Available
}
