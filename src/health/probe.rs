//! Connectivity probing.
//!
//! # Responsibilities
//! - Confirm the database port accepts TCP connections
//! - Open a (lazy) session handle
//! - Confirm the session is live with a ping
//!
//! # Design Decisions
//! - Transport probe and ping have independent retry loops
//! - Transport probe uses a long backoff, ping a short one
//! - Every attempt is bounded by the connect timeout

use std::future::Future;
use std::io;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::{self, Instant};

use crate::resilience::{retry, RetryPolicy};
use crate::session::{parse_target, ClusterSession, Credentials, SessionConnector, SessionError};

/// Connectivity failures. All of them make the node unavailable.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("connection to {host} refused after {attempts} attempts: {source}")]
    ConnectionRefused {
        host: String,
        attempts: u32,
        source: io::Error,
    },

    #[error("session open failed: {0}")]
    SessionOpenFailed(#[source] SessionError),

    #[error("liveness check failed after {attempts} attempts: {source}")]
    LivenessCheckFailed { attempts: u32, source: SessionError },
}

/// Check that `host` accepts TCP connections.
///
/// `host` is resolved like the session address, so a missing port means
/// the default MySQL port. Returns the attempt number that succeeded.
pub async fn probe_reachability(
    host: &str,
    timeout: Duration,
    policy: &RetryPolicy,
    deadline: Option<Instant>,
) -> Result<u32, ProbeError> {
    let (hostname, port) = parse_target(host).map_err(|e| ProbeError::ConnectionRefused {
        host: host.to_string(),
        attempts: 0,
        source: io::Error::new(io::ErrorKind::InvalidInput, e.to_string()),
    })?;

    probe_with(host, policy, deadline, |_| {
        let hostname = hostname.clone();
        async move { dial(&hostname, port, timeout).await }
    })
    .await
}

async fn dial(hostname: &str, port: u16, timeout: Duration) -> io::Result<()> {
    match time::timeout(timeout, TcpStream::connect((hostname, port))).await {
        Ok(Ok(stream)) => {
            drop(stream);
            Ok(())
        }
        Ok(Err(e)) => Err(e),
        Err(_) => Err(io::Error::new(
            io::ErrorKind::TimedOut,
            format!("connect timed out after {:?}", timeout),
        )),
    }
}

/// Retry `connect` under `policy`, mapping exhaustion to `ConnectionRefused`.
async fn probe_with<F, Fut>(
    host: &str,
    policy: &RetryPolicy,
    deadline: Option<Instant>,
    connect: F,
) -> Result<u32, ProbeError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = io::Result<()>>,
{
    match retry("tcp_connect", policy, deadline, connect).await {
        Ok(done) => {
            tracing::info!(host = %host, attempts = done.attempts, "Connection online");
            Ok(done.attempts)
        }
        Err(exhausted) => Err(ProbeError::ConnectionRefused {
            host: host.to_string(),
            attempts: exhausted.attempts,
            source: exhausted.last_error,
        }),
    }
}

/// Open a session handle. This does not prove the node is live.
pub fn open_session(
    connector: &dyn SessionConnector,
    host: &str,
    credentials: &Credentials,
) -> Result<Box<dyn ClusterSession>, ProbeError> {
    connector.open(host, credentials).map_err(|e| {
        tracing::error!(host = %host, error = %e, "Session open failed");
        ProbeError::SessionOpenFailed(e)
    })
}

/// Ping `session` until it answers or the policy is exhausted.
///
/// Returns the attempt number that succeeded.
pub async fn verify_session(
    session: &dyn ClusterSession,
    timeout: Duration,
    policy: &RetryPolicy,
    deadline: Option<Instant>,
) -> Result<u32, ProbeError> {
    let result = retry("ping", policy, deadline, |_| async move {
        match time::timeout(timeout, session.ping()).await {
            Ok(outcome) => outcome,
            Err(_) => Err(SessionError::Unavailable(format!(
                "ping timed out after {:?}",
                timeout
            ))),
        }
    })
    .await;

    result
        .map(|done| done.attempts)
        .map_err(|exhausted| ProbeError::LivenessCheckFailed {
            attempts: exhausted.attempts,
            source: exhausted.last_error,
        })
}
