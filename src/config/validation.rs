use crate::config::types::{
    Config, PortalConfig, SinkConfig, StorageConfig, TimeoutConfig, TraversalConfig,
    WebDriverConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_portal_config(&config.portal)?;
    validate_webdriver_config(&config.webdriver)?;
    validate_timeouts(&config.timeouts)?;
    validate_traversal_config(&config.traversal)?;
    validate_sink_config(&config.sink)?;
    validate_storage_config(&config.storage)?;
    Ok(())
}

fn validate_portal_config(config: &PortalConfig) -> Result<(), ConfigError> {
    let url = parse_http_url("login-url", &config.login_url)?;
    if url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "login-url '{}' must use HTTPS scheme",
            config.login_url
        )));
    }

    if config.username.is_empty() {
        return Err(ConfigError::Validation(
            "portal username is not set (config or USAGE_DRILL_USERNAME)".to_string(),
        ));
    }

    if config.password.is_empty() {
        return Err(ConfigError::Validation(
            "portal password is not set (config or USAGE_DRILL_PASSWORD)".to_string(),
        ));
    }

    Ok(())
}

fn validate_webdriver_config(config: &WebDriverConfig) -> Result<(), ConfigError> {
    parse_http_url("webdriver endpoint", &config.endpoint)?;

    if config.browser.is_empty() {
        return Err(ConfigError::Validation(
            "webdriver browser cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_timeouts(config: &TimeoutConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("page-load-secs", config.page_load_secs),
        ("element-secs", config.element_secs),
        ("show-more-secs", config.show_more_secs),
        ("login-secs", config.login_secs),
        ("delivery-secs", config.delivery_secs),
    ] {
        if value == 0 || value > 600 {
            return Err(ConfigError::Validation(format!(
                "{} must be between 1 and 600, got {}",
                name, value
            )));
        }
    }

    if config.poll_interval_ms < 10 {
        return Err(ConfigError::Validation(format!(
            "poll-interval-ms must be >= 10ms, got {}ms",
            config.poll_interval_ms
        )));
    }

    Ok(())
}

fn validate_traversal_config(config: &TraversalConfig) -> Result<(), ConfigError> {
    if config.max_show_more < 1 {
        return Err(ConfigError::Validation(format!(
            "max-show-more must be >= 1, got {}",
            config.max_show_more
        )));
    }
    Ok(())
}

fn validate_sink_config(config: &SinkConfig) -> Result<(), ConfigError> {
    parse_http_url("sink url", &config.url)?;

    if config.token.is_empty() {
        return Err(ConfigError::Validation(
            "sink token is not set (config or USAGE_DRILL_SINK_TOKEN)".to_string(),
        ));
    }

    Ok(())
}

fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.state_path.is_empty() {
        return Err(ConfigError::Validation(
            "state-path cannot be empty".to_string(),
        ));
    }

    if config.data_path.is_empty() {
        return Err(ConfigError::Validation(
            "data-path cannot be empty".to_string(),
        ));
    }

    if config.state_path == config.data_path {
        return Err(ConfigError::Validation(format!(
            "state-path and data-path must differ, both are '{}'",
            config.state_path
        )));
    }

    Ok(())
}

/// Parses a URL and requires an HTTP(S) scheme
fn parse_http_url(field: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    Ok(url)
}
