//! Configuration module for Page Analyzer
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file, and layering the deployment's environment variables
//! on top of it.
//!
//! # Example
//!
//! ```no_run
//! use page_analyzer::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Some(Path::new("analyzer.toml"))).unwrap();
//! println!("Retry attempts: {}", config.retry.max_attempts);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, FetchConfig, RetryConfig, ServerConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{
    apply_env_overrides, compute_config_hash, load_config, load_config_with_hash,
    ENV_RETRY_DELAY, ENV_RETRY_LIMIT, ENV_SERVER_ADDRESS, ENV_SERVER_PORT,
};
pub use validation::validate;
