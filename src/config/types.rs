use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Usage-Drill
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub portal: PortalConfig,
    #[serde(default)]
    pub webdriver: WebDriverConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub traversal: TraversalConfig,
    pub sink: SinkConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Utility portal account configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PortalConfig {
    /// Login page of the customer portal
    #[serde(rename = "login-url")]
    pub login_url: String,

    /// Account user name (may come from USAGE_DRILL_USERNAME instead)
    #[serde(default)]
    pub username: String,

    /// Account password (may come from USAGE_DRILL_PASSWORD instead)
    #[serde(default)]
    pub password: String,
}

/// WebDriver server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WebDriverConfig {
    /// Base URL of the WebDriver server (chromedriver, geckodriver, ...)
    #[serde(default = "default_webdriver_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_browser")]
    pub browser: String,

    #[serde(default = "default_true")]
    pub headless: bool,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            endpoint: default_webdriver_endpoint(),
            browser: default_browser(),
            headless: true,
        }
    }
}

/// Per-operation wait limits, in seconds unless noted
#[derive(Debug, Clone, Deserialize)]
pub struct TimeoutConfig {
    /// Waiting for `document.readyState == "complete"`
    #[serde(rename = "page-load-secs", default = "default_page_load")]
    pub page_load_secs: u64,

    /// Waiting for a navigation element to become clickable
    #[serde(rename = "element-secs", default = "default_element")]
    pub element_secs: u64,

    /// Waiting for the "reveal more" trigger
    #[serde(rename = "show-more-secs", default = "default_show_more")]
    pub show_more_secs: u64,

    /// Waiting for the login form
    #[serde(rename = "login-secs", default = "default_login")]
    pub login_secs: u64,

    /// Whole request timeout for one delivery
    #[serde(rename = "delivery-secs", default = "default_delivery")]
    pub delivery_secs: u64,

    /// Interval between polls while waiting (milliseconds)
    #[serde(rename = "poll-interval-ms", default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

impl TimeoutConfig {
    pub fn page_load(&self) -> Duration {
        Duration::from_secs(self.page_load_secs)
    }

    pub fn element(&self) -> Duration {
        Duration::from_secs(self.element_secs)
    }

    pub fn show_more(&self) -> Duration {
        Duration::from_secs(self.show_more_secs)
    }

    pub fn login(&self) -> Duration {
        Duration::from_secs(self.login_secs)
    }

    pub fn delivery(&self) -> Duration {
        Duration::from_secs(self.delivery_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            page_load_secs: default_page_load(),
            element_secs: default_element(),
            show_more_secs: default_show_more(),
            login_secs: default_login(),
            delivery_secs: default_delivery(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

/// Traversal limits
#[derive(Debug, Clone, Deserialize)]
pub struct TraversalConfig {
    /// Maximum "reveal more" activations at a single node before the node is abandoned
    #[serde(rename = "max-show-more", default = "default_max_show_more")]
    pub max_show_more: u32,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            max_show_more: default_max_show_more(),
        }
    }
}

/// Metrics sink configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SinkConfig {
    /// Home Assistant state endpoint, e.g. `http://ha:8123/api/states/sensor.energy_usage`
    pub url: String,

    /// Long-lived access token (may come from USAGE_DRILL_SINK_TOKEN instead)
    #[serde(default)]
    pub token: String,
}

/// Locations of the persisted state and snapshot files
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(rename = "state-path", default = "default_state_path")]
    pub state_path: String,

    #[serde(rename = "data-path", default = "default_data_path")]
    pub data_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_path: default_state_path(),
            data_path: default_data_path(),
        }
    }
}

/// Delta ordering and watermark policy
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub order: DeliveryOrder,

    #[serde(rename = "watermark-policy", default)]
    pub watermark_policy: WatermarkPolicy,
}

/// Order in which delta records are handed to the sink
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryOrder {
    /// Page order of the extracted tree
    #[default]
    Tree,

    /// Ascending day date (stable for equal dates)
    Chronological,
}

/// How far a successful delivery may move the watermark
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WatermarkPolicy {
    /// Advance to the date of every successful delivery, even past earlier failures
    #[default]
    LatestSuccess,

    /// Advance only past dates whose earlier-dated delta records were all delivered
    ContiguousPrefix,
}

fn default_webdriver_endpoint() -> String {
    "http://localhost:9515".to_string()
}

fn default_browser() -> String {
    "chrome".to_string()
}

fn default_true() -> bool {
    true
}

fn default_page_load() -> u64 {
    30
}

fn default_element() -> u64 {
    30
}

fn default_show_more() -> u64 {
    10
}

fn default_login() -> u64 {
    20
}

fn default_delivery() -> u64 {
    30
}

fn default_poll_interval() -> u64 {
    250
}

fn default_max_show_more() -> u32 {
    50
}

fn default_state_path() -> String {
    "ambit_energy_last_state.json".to_string()
}

fn default_data_path() -> String {
    "ambit_energy_usage.json".to_string()
}
