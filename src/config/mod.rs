//! Configuration module for Usage-Drill
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use usage_drill::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("usage-drill.toml")).unwrap();
//! println!("Pagination limit per node: {}", config.traversal.max_show_more);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, DeliveryOrder, PortalConfig, SinkConfig, StorageConfig, SyncConfig, TimeoutConfig,
    TraversalConfig, WatermarkPolicy, WebDriverConfig,
};

// Re-export parser functions
pub use parser::{
    apply_env_overrides, compute_config_hash, load_config, load_config_with_env,
    load_config_with_hash, ENV_PASSWORD, ENV_SINK_TOKEN, ENV_USERNAME,
};
