//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::schema::CheckConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Password for the check user.
pub const ENV_PASSWORD: &str = "MYSQL_ROOT_PASSWORD";
/// Database address, `host:port`.
pub const ENV_HOST: &str = "MYSQL_CHECK_HOST";
/// Any non-empty value admits donor/desynced nodes.
pub const ENV_AVAILABLE_WHEN_DONOR: &str = "AVAILABLE_WHEN_DONNOR";
/// `0` admits read-only nodes.
pub const ENV_AVAILABLE_WHEN_READONLY: &str = "AVAILABLE_WHEN_READONLY";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: defaults, then the optional TOML file, then the
/// process environment. The result is validated before it is returned.
pub fn load_config(path: Option<&Path>) -> Result<CheckConfig, ConfigError> {
    let mut config: CheckConfig = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => CheckConfig::default(),
    };

    apply_env(&mut config, |key| std::env::var(key).ok());

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment variables onto `config`.
///
/// `lookup` returns the raw value of a variable, if set.
pub fn apply_env<F>(config: &mut CheckConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(password) = lookup(ENV_PASSWORD) {
        config.database.password = password;
    }

    if let Some(host) = lookup(ENV_HOST).filter(|h| !h.is_empty()) {
        config.database.host = host;
    }

    if let Some(donor) = lookup(ENV_AVAILABLE_WHEN_DONOR) {
        config.policy.available_when_donor = !donor.is_empty();
    }

    if let Some(read_only) = lookup(ENV_AVAILABLE_WHEN_READONLY) {
        config.policy.available_when_read_only = read_only == "0";
    }
}
