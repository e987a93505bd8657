use crate::config::types::{Config, FetchConfig, RetryConfig, ServerConfig, UserAgentConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_server_config(&config.server)?;
    validate_retry_config(&config.retry)?;
    validate_fetch_config(&config.fetch)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

/// Validates listener configuration
fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    if config.address.trim().is_empty() {
        return Err(ConfigError::Validation(
            "server address cannot be empty".to_string(),
        ));
    }

    if config.address.chars().any(char::is_whitespace) {
        return Err(ConfigError::Validation(format!(
            "server address cannot contain whitespace, got '{}'",
            config.address
        )));
    }

    Ok(())
}

/// Validates retry configuration
fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    // delay_secs >= 0 is always true for u64, so no check needed

    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    Ok(())
}

/// Validates outbound timing configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "connect_timeout_secs must be >= 1, got {}",
            config.connect_timeout_secs
        )));
    }

    Ok(())
}

/// Validates request identification headers
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    // Header values must be visible ASCII or spaces
    for (name, value) in [
        ("user_agent", &config.user_agent),
        ("accept", &config.accept),
        ("accept_language", &config.accept_language),
    ] {
        if !value.chars().all(|c| c == ' ' || c.is_ascii_graphic()) {
            return Err(ConfigError::Validation(format!(
                "{} contains characters not allowed in an HTTP header",
                name
            )));
        }
    }

    Ok(())
}
