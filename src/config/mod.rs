//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! built-in defaults
//!     → optional config file (TOML, --config)
//!     → loader.rs (parse & deserialize)
//!     → environment overlay (MYSQL_*, AVAILABLE_WHEN_*)
//!     → validation.rs (semantic checks)
//!     → CheckConfig (validated, immutable)
//!     → CheckPolicy shared via Arc with every request
//! ```
//!
//! # Design Decisions
//! - Config is loaded once at startup and never changes afterwards
//! - All fields have defaults to allow running with environment only
//! - Environment wins over the file
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::CheckConfig;
pub use schema::DatabaseConfig;
pub use schema::ListenerConfig;
pub use schema::LogFormat;
pub use schema::ObservabilityConfig;
pub use schema::PolicyConfig;
pub use schema::ProbeConfig;
