use std::collections::HashSet;

use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - At least one attempt per request, with a non-zero deadline
/// - Base URL and payload key are set
/// - Rover list is non-empty and has no duplicates (aggregate keys are unique)
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.retry.max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "retry.max_attempts must be at least 1".to_string(),
        ));
    }

    if config.retry.attempt_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "retry.attempt_timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.api.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "api.base_url cannot be empty".to_string(),
        ));
    }

    if config.api.payload_key.is_empty() {
        return Err(ConfigError::ValidationError(
            "api.payload_key cannot be empty".to_string(),
        ));
    }

    if config.rovers.is_empty() {
        return Err(ConfigError::ValidationError(
            "rovers cannot be empty".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for rover in &config.rovers {
        if !seen.insert(rover) {
            return Err(ConfigError::ValidationError(format!(
                "rover '{}' is listed more than once",
                rover
            )));
        }
    }

    Ok(())
}
