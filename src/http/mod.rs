//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (any method, any path)
//!     → server.rs (Axum setup, one task per request)
//!     → health::ClusterCheck::run
//!     → response.rs (Verdict → 200 / 503 + reason)
//!     → Send to load balancer
//! ```

pub mod response;
pub mod server;

pub use server::HttpServer;
