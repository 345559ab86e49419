//! One complete health check: probe, evaluate, release.

use std::sync::Arc;
use std::time::Instant as StdInstant;

use tokio::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::health::evaluator::{evaluate, read_state};
use crate::health::policy::CheckPolicy;
use crate::health::probe::{open_session, probe_reachability, verify_session};
use crate::health::verdict::Verdict;
use crate::observability::metrics;
use crate::session::{ClusterSession, SessionConnector};

/// Runs health checks against one database node.
///
/// Cheap to share: every call to [`ClusterCheck::run`] is independent and
/// owns its own session.
#[derive(Clone)]
pub struct ClusterCheck {
    policy: Arc<CheckPolicy>,
    connector: Arc<dyn SessionConnector>,
}

impl ClusterCheck {
    pub fn new(policy: Arc<CheckPolicy>, connector: Arc<dyn SessionConnector>) -> Self {
        Self { policy, connector }
    }

    pub fn policy(&self) -> &CheckPolicy {
        &self.policy
    }

    /// Run a full check and return the verdict.
    pub async fn run(&self) -> Verdict {
        let started = StdInstant::now();
        let span = tracing::info_span!(
            "cluster_check",
            check_id = %Uuid::new_v4(),
            host = %self.policy.database_host
        );

        let verdict = self.run_inner().instrument(span.clone()).await;

        span.in_scope(|| match &verdict {
            Verdict::Available => tracing::info!("Node available"),
            Verdict::Unavailable(reason) => {
                tracing::warn!(reason = %reason, kind = reason.kind(), "Node unavailable")
            }
        });
        metrics::record_check(&verdict, started);

        verdict
    }

    async fn run_inner(&self) -> Verdict {
        let policy = &*self.policy;
        let deadline = policy.deadline.map(|d| Instant::now() + d);

        if policy.tcp_check {
            if let Err(e) = probe_reachability(
                &policy.database_host,
                policy.connect_timeout,
                &policy.connect_retry,
                deadline,
            )
            .await
            {
                return Verdict::Unavailable(e.into());
            }
        }

        let session = match open_session(
            self.connector.as_ref(),
            &policy.database_host,
            &policy.credentials,
        ) {
            Ok(session) => session,
            Err(e) => return Verdict::Unavailable(e.into()),
        };

        let verdict = self.check_session(session.as_ref(), deadline).await;

        if let Err(e) = session.close().await {
            tracing::warn!(error = %e, "Failed to close session");
        }

        verdict
    }

    async fn check_session(&self, session: &dyn ClusterSession, deadline: Option<Instant>) -> Verdict {
        let policy = &*self.policy;

        if let Err(e) =
            verify_session(session, policy.connect_timeout, &policy.ping_retry, deadline).await
        {
            return Verdict::Unavailable(e.into());
        }

        let state = match read_state(session, policy.connect_timeout).await {
            Ok(state) => state,
            Err(e) => return Verdict::Unavailable(e.into()),
        };

        evaluate(&state, policy, session).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::time::Duration;
    use tokio::net::TcpListener;

    use crate::config::CheckConfig;
    use crate::health::state::{CLUSTER_STATUS_VARIABLE, LOCAL_STATE_VARIABLE};
    use crate::health::verdict::Reason;
    use crate::session::{Credentials, SessionError};

    #[derive(Default)]
    struct Tracker {
        opened: AtomicU32,
        closed: AtomicU32,
    }

    struct TrackedSession {
        tracker: Arc<Tracker>,
        local_state: Option<&'static str>,
        ping_ok: bool,
    }

    #[async_trait]
    impl ClusterSession for TrackedSession {
        async fn status_variable(&self, name: &str) -> Result<String, SessionError> {
            match name {
                LOCAL_STATE_VARIABLE => self
                    .local_state
                    .map(String::from)
                    .ok_or_else(|| SessionError::VariableMissing(name.into())),
                CLUSTER_STATUS_VARIABLE => Ok("Primary".into()),
                _ => Err(SessionError::VariableMissing(name.into())),
            }
        }

        async fn config_variable(&self, _name: &str) -> Result<String, SessionError> {
            Ok("OFF".into())
        }

        async fn ping(&self) -> Result<(), SessionError> {
            if self.ping_ok {
                Ok(())
            } else {
                Err(SessionError::Unavailable("server has gone away".into()))
            }
        }

        async fn close(&self) -> Result<(), SessionError> {
            self.tracker.closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct TrackedConnector {
        tracker: Arc<Tracker>,
        local_state: Option<&'static str>,
        ping_ok: bool,
        fail_open: AtomicBool,
    }

    impl SessionConnector for TrackedConnector {
        fn open(
            &self,
            host: &str,
            _credentials: &Credentials,
        ) -> Result<Box<dyn ClusterSession>, SessionError> {
            if self.fail_open.load(Ordering::SeqCst) {
                return Err(SessionError::InvalidTarget(host.into()));
            }
            self.tracker.opened.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(TrackedSession {
                tracker: self.tracker.clone(),
                local_state: self.local_state,
                ping_ok: self.ping_ok,
            }))
        }
    }

    fn check_with(
        local_state: Option<&'static str>,
        ping_ok: bool,
        host: &str,
    ) -> (ClusterCheck, Arc<Tracker>) {
        let mut config = CheckConfig::default();
        config.database.host = host.to_string();
        config.probe.tcp_check = false;
        config.probe.ping_attempts = 2;
        config.probe.ping_backoff_ms = 1;

        let tracker = Arc::new(Tracker::default());
        let connector = TrackedConnector {
            tracker: tracker.clone(),
            local_state,
            ping_ok,
            fail_open: AtomicBool::new(false),
        };
        let check = ClusterCheck::new(Arc::new(CheckPolicy::from(&config)), Arc::new(connector));
        (check, tracker)
    }

    #[tokio::test]
    async fn test_session_closed_on_success() {
        let (check, tracker) = check_with(Some("4"), true, "127.0.0.1:3306");
        assert_eq!(check.run().await, Verdict::Available);
        assert_eq!(tracker.opened.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_session_closed_on_read_failure() {
        let (check, tracker) = check_with(None, true, "127.0.0.1:3306");
        assert_eq!(
            check.run().await,
            Verdict::Unavailable(Reason::VariableReadFailed {
                name: LOCAL_STATE_VARIABLE
            })
        );
        assert_eq!(tracker.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_session_closed_on_ping_failure() {
        let (check, tracker) = check_with(Some("4"), false, "127.0.0.1:3306");
        let verdict = check.run().await;
        assert!(matches!(
            verdict,
            Verdict::Unavailable(Reason::LivenessCheckFailed { attempts: 2, .. })
        ));
        assert_eq!(tracker.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_open_failure_is_unavailable() {
        let tracker = Arc::new(Tracker::default());
        let connector = TrackedConnector {
            tracker: tracker.clone(),
            local_state: Some("4"),
            ping_ok: true,
            fail_open: AtomicBool::new(true),
        };
        let mut config = CheckConfig::default();
        config.probe.tcp_check = false;
        let check = ClusterCheck::new(Arc::new(CheckPolicy::from(&config)), Arc::new(connector));

        assert!(matches!(
            check.run().await,
            Verdict::Unavailable(Reason::SessionOpenFailed(_))
        ));
        assert_eq!(tracker.opened.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unreachable_host_never_opens_session() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let host = listener.local_addr().unwrap().to_string();
        drop(listener);

        let mut config = CheckConfig::default();
        config.database.host = host.clone();
        config.probe.connect_attempts = 3;
        config.probe.connect_backoff_ms = 5;
        config.probe.connect_timeout_ms = 500;

        let tracker = Arc::new(Tracker::default());
        let connector = TrackedConnector {
            tracker: tracker.clone(),
            local_state: Some("4"),
            ping_ok: true,
            fail_open: AtomicBool::new(false),
        };
        let check = ClusterCheck::new(Arc::new(CheckPolicy::from(&config)), Arc::new(connector));

        match check.run().await {
            Verdict::Unavailable(Reason::ConnectionRefused { host: h, attempts, .. }) => {
                assert_eq!(h, host);
                assert_eq!(attempts, 3);
            }
            other => panic!("unexpected verdict: {other:?}"),
        }
        assert_eq!(tracker.opened.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_bounds_ping_retries() {
        let (check, tracker) = {
            let mut config = CheckConfig::default();
            config.probe.tcp_check = false;
            config.probe.ping_attempts = 100;
            config.probe.ping_backoff_ms = 1_000;
            config.probe.deadline_secs = Some(3);

            let tracker = Arc::new(Tracker::default());
            let connector = TrackedConnector {
                tracker: tracker.clone(),
                local_state: Some("4"),
                ping_ok: false,
                fail_open: AtomicBool::new(false),
            };
            let policy = Arc::new(CheckPolicy::from(&config));
            (ClusterCheck::new(policy, Arc::new(connector)), tracker)
        };

        let started = Instant::now();
        let verdict = check.run().await;
        assert!(matches!(
            verdict,
            Verdict::Unavailable(Reason::LivenessCheckFailed { .. })
        ));
        assert!(started.elapsed() < Duration::from_secs(3));
        assert_eq!(tracker.closed.load(Ordering::SeqCst), 1);
    }
}
