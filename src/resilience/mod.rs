//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Connectivity probe stage (tcp connect / session ping):
//!     → retries.rs (attempt, on failure sleep fixed backoff, try again)
//!     → success: hand result to the next stage
//!     → exhausted or past deadline: terminal failure for this check
//! ```
//!
//! # Design Decisions
//! - Only connectivity is retried; state reads are authoritative
//! - Each stage owns its own attempt ceiling and backoff
//! - Every external call has a deadline (per-attempt timeout)

pub mod retries;

pub use retries::{retry, Attempted, Exhausted, RetryPolicy};
