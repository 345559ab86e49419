//! Galera / Percona XtraDB Cluster node health check.
//!
//! Answers load balancer polls with 200 when the local node is synced (or
//! an admitted donor) and writable, 503 with a reason otherwise.

pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod session;

pub use config::schema::CheckConfig;
pub use health::{ClusterCheck, Verdict};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
