//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Probe attempts, retries, verdicts:
//!     → logging.rs (timestamped structured log events, stdout)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Every check runs in a span carrying a unique check_id
//! - Observability never influences a verdict

pub mod logging;
pub mod metrics;
