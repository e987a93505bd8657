use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::str::FromStr;

/// Overrides `retry.max-attempts`
pub const ENV_RETRY_LIMIT: &str = "URL_RETRY_LIMIT";

/// Overrides `retry.delay-secs`
pub const ENV_RETRY_DELAY: &str = "URL_RETRY_DELAY";

/// Overrides `server.address`
pub const ENV_SERVER_ADDRESS: &str = "SERVER_ADDRESS";

/// Overrides `server.port`
pub const ENV_SERVER_PORT: &str = "SERVER_PORT";

/// Loads the configuration, applies environment overrides and validates it
///
/// # Arguments
///
/// * `path` - Optional path to a TOML configuration file. Without one the
///   built-in defaults are used as the base layer.
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use page_analyzer::config::load_config;
///
/// let config = load_config(Some(Path::new("analyzer.toml"))).unwrap();
/// println!("Listening on port {}", config.server.port);
/// ```
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    validate(&config)?;

    Ok(config)
}

/// Layers environment values over `config`
///
/// `lookup` resolves a variable name to its value. Values that fail to parse,
/// and a retry limit of zero, are ignored with a warning and the existing
/// setting is kept.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    match parse_var::<u32, F>(&lookup, ENV_RETRY_LIMIT) {
        Some(0) => tracing::warn!("Ignoring {}=0: must be at least 1", ENV_RETRY_LIMIT),
        Some(limit) => config.retry.max_attempts = limit,
        None => {}
    }

    if let Some(delay) = parse_var::<u64, F>(&lookup, ENV_RETRY_DELAY) {
        config.retry.delay_secs = delay;
    }

    if let Some(address) = lookup(ENV_SERVER_ADDRESS).filter(|v| !v.trim().is_empty()) {
        config.server.address = address.trim().to_string();
    }

    if let Some(port) = parse_var::<u16, F>(&lookup, ENV_SERVER_PORT) {
        config.server.port = port;
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring {}={:?}: not a valid value", key, raw);
            None
        }
    }
}

/// Computes a SHA-256 hash of the configuration file content
///
/// The hash is logged at startup so a running instance can be matched to
/// the configuration it was started with.
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its file hash
///
/// The hash is `None` when no file was given.
pub fn load_config_with_hash(path: Option<&Path>) -> Result<(Config, Option<String>), ConfigError> {
    let config = load_config(path)?;
    let hash = path.map(compute_config_hash).transpose()?;
    Ok((config, hash))
}
