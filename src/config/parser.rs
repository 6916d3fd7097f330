use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Environment variable that overrides `portal.username`
pub const ENV_USERNAME: &str = "USAGE_DRILL_USERNAME";

/// Environment variable that overrides `portal.password`
pub const ENV_PASSWORD: &str = "USAGE_DRILL_PASSWORD";

/// Environment variable that overrides `sink.token`
pub const ENV_SINK_TOKEN: &str = "USAGE_DRILL_SINK_TOKEN";

/// Loads and parses a configuration file from the given path
///
/// Secrets found in the process environment replace the file values before
/// validation. This is the only place the environment is consulted.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use usage_drill::config::load_config;
///
/// let config = load_config(Path::new("usage-drill.toml")).unwrap();
/// println!("Sink: {}", config.sink.url);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Loads a configuration, resolving secret overrides through `lookup`
pub fn load_config_with_env<F>(path: &Path, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let content = std::fs::read_to_string(path)?;
    let mut config: Config = toml::from_str(&content)?;

    apply_env_overrides(&mut config, lookup);

    validate(&config)?;

    Ok(config)
}

/// Replaces credentials and the sink token with non-empty values from `lookup`
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

    if let Some(username) = non_empty(ENV_USERNAME) {
        config.portal.username = username;
    }
    if let Some(password) = non_empty(ENV_PASSWORD) {
        config.portal.password = password;
    }
    if let Some(token) = non_empty(ENV_SINK_TOKEN) {
        config.sink.token = token;
    }
}

/// Computes a SHA-256 hash of the configuration file content
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}
