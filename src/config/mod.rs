//! Configuration module for Sumi-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section and key is optional; missing values fall back to the fixed
//! fetch policy (5 second timeout, 50 concurrent fetches).
//!
//! # Example
//!
//! ```no_run
//! use sumi_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("At most {} fetches in flight", config.fetcher.max_concurrent_fetches);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, FetcherConfig, OutputConfig, DEFAULT_MAX_CONCURRENT_FETCHES, DEFAULT_REQUEST_TIMEOUT_MS,
};

// Re-export parser and validation functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
