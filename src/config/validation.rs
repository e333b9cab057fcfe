use crate::config::types::{Config, FetcherConfig, OutputConfig};
use crate::ConfigError;

const MIN_REQUEST_TIMEOUT_MS: u64 = 100;
const MAX_REQUEST_TIMEOUT_MS: u64 = 300_000;
const MAX_CONCURRENT_FETCHES: usize = 1_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetcher_config(&config.fetcher)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if !(MIN_REQUEST_TIMEOUT_MS..=MAX_REQUEST_TIMEOUT_MS).contains(&config.request_timeout_ms) {
        return Err(ConfigError::Validation(format!(
            "request_timeout_ms must be between {} and {}, got {}",
            MIN_REQUEST_TIMEOUT_MS, MAX_REQUEST_TIMEOUT_MS, config.request_timeout_ms
        )));
    }

    if !(1..=MAX_CONCURRENT_FETCHES).contains(&config.max_concurrent_fetches) {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_fetches must be between 1 and {}, got {}",
            MAX_CONCURRENT_FETCHES, config.max_concurrent_fetches
        )));
    }

    if let Some(user_agent) = &config.user_agent {
        validate_user_agent(user_agent)?;
    }

    Ok(())
}

/// User agents end up in a request header, so they must be visible ASCII
fn validate_user_agent(user_agent: &str) -> Result<(), ConfigError> {
    if user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if !user_agent.chars().all(|c| c == ' ' || c.is_ascii_graphic()) {
        return Err(ConfigError::Validation(format!(
            "user_agent must contain only printable ASCII characters, got '{}'",
            user_agent
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if let Some(path) = &config.summary_path {
        if path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "summary_path cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}
