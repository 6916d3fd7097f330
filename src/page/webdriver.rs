//! W3C WebDriver page provider
//!
//! Speaks the WebDriver wire protocol over HTTP to a running driver such as
//! chromedriver. Only the handful of commands the traversal needs are
//! implemented:
//! - session creation and deletion
//! - navigation and `document.readyState` polling
//! - element lookup, visibility/enabled checks, click and send-keys
//! - page source retrieval

use crate::config::{TimeoutConfig, WebDriverConfig};
use crate::page::{ClickOutcome, Locator, PageError, PageProvider, PageResult};
use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Key under which W3C drivers return element references
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// A live WebDriver session
pub struct WebDriverPage {
    client: Client,
    endpoint: String,
    session_id: String,
    page_load: Duration,
    poll_interval: Duration,
    closed: bool,
}

impl WebDriverPage {
    /// Opens a new browser session on the configured driver
    ///
    /// Failure here is fatal for the run: without a session nothing can be
    /// extracted.
    pub async fn start(config: &WebDriverConfig, timeouts: &TimeoutConfig) -> PageResult<Self> {
        // Navigation commands block until the page loads, so the HTTP timeout
        // has to outlast the driver's own page-load timeout.
        let client = Client::builder()
            .timeout(timeouts.page_load() + Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let endpoint = config.endpoint.trim_end_matches('/').to_string();
        let capabilities = build_capabilities(config, timeouts);

        tracing::info!(
            "Starting {} session on {} (headless: {})",
            config.browser,
            endpoint,
            config.headless
        );

        let response = client
            .post(format!("{}/session", endpoint))
            .json(&capabilities)
            .send()
            .await?;
        let value = decode(response).await?;

        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| PageError::Protocol(format!("no sessionId in {}", value)))?
            .to_string();

        tracing::debug!("WebDriver session {} created", session_id);

        Ok(Self {
            client,
            endpoint,
            session_id,
            page_load: timeouts.page_load(),
            poll_interval: timeouts.poll_interval(),
            closed: false,
        })
    }

    /// Sends a session-scoped command and returns the `value` member
    async fn command(&self, method: Method, path: &str, body: Option<Value>) -> PageResult<Value> {
        let url = format!("{}/session/{}{}", self.endpoint, self.session_id, path);
        let request = self.client.request(method, &url);
        let request = match body {
            Some(body) => request.json(&body),
            None => request,
        };
        decode(request.send().await?).await
    }

    /// Looks up a single element, `None` when nothing matches
    async fn find_element(&self, locator: &Locator) -> PageResult<Option<String>> {
        let (using, value) = match locator {
            Locator::Css(selector) => ("css selector", selector.as_str()),
            Locator::PartialLinkText(text) => ("partial link text", text.as_str()),
        };

        let result = self
            .command(
                Method::POST,
                "/element",
                Some(json!({ "using": using, "value": value })),
            )
            .await;

        match result {
            Ok(found) => found
                .get(ELEMENT_KEY)
                .and_then(Value::as_str)
                .map(|id| Some(id.to_string()))
                .ok_or_else(|| PageError::Protocol(format!("no element reference in {}", found))),
            Err(PageError::WebDriver { error, .. }) if error == "no such element" => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Reads a boolean element property (`displayed`, `enabled`)
    ///
    /// A stale reference reads as `false`; the caller looks the element up again.
    async fn element_flag(&self, element_id: &str, flag: &str) -> PageResult<bool> {
        let path = format!("/element/{}/{}", element_id, flag);
        match self.command(Method::GET, &path, None).await {
            Ok(value) => Ok(value.as_bool().unwrap_or(false)),
            Err(PageError::WebDriver { error, .. }) if error == "stale element reference" => {
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    async fn is_interactable(&self, element_id: &str) -> PageResult<bool> {
        Ok(self.element_flag(element_id, "displayed").await?
            && self.element_flag(element_id, "enabled").await?)
    }
}

#[async_trait]
impl PageProvider for WebDriverPage {
    async fn navigate(&mut self, url: &str) -> PageResult<()> {
        tracing::debug!("Navigating to {}", url);
        self.command(Method::POST, "/url", Some(json!({ "url": url })))
            .await?;
        Ok(())
    }

    async fn wait_until_loaded(&mut self) -> PageResult<()> {
        let deadline = Instant::now() + self.page_load;
        let script = json!({ "script": "return document.readyState", "args": [] });

        loop {
            let state = self
                .command(Method::POST, "/execute/sync", Some(script.clone()))
                .await?;
            if state.as_str() == Some("complete") {
                tracing::trace!("Page load complete");
                return Ok(());
            }

            if Instant::now() >= deadline {
                return Err(PageError::Timeout {
                    what: "document.readyState == complete".to_string(),
                    waited: self.page_load,
                });
            }
            sleep(self.poll_interval).await;
        }
    }

    async fn find_and_click(
        &mut self,
        locator: &Locator,
        wait: Duration,
    ) -> PageResult<ClickOutcome> {
        let deadline = Instant::now() + wait;
        let mut seen = false;

        loop {
            if let Some(element_id) = self.find_element(locator).await? {
                seen = true;
                if self.is_interactable(&element_id).await? {
                    let path = format!("/element/{}/click", element_id);
                    return match self.command(Method::POST, &path, Some(json!({}))).await {
                        Ok(_) => Ok(ClickOutcome::Clicked),
                        Err(PageError::WebDriver { error, message })
                            if is_not_interactable(&error) =>
                        {
                            tracing::debug!("Click on {} refused: {}", locator, message);
                            Ok(ClickOutcome::NotInteractable)
                        }
                        Err(e) => Err(e),
                    };
                }
            }

            if Instant::now() >= deadline {
                return Ok(if seen {
                    ClickOutcome::NotInteractable
                } else {
                    ClickOutcome::NotFound
                });
            }
            sleep(self.poll_interval).await;
        }
    }

    async fn current_content(&mut self) -> PageResult<String> {
        let source = self.command(Method::GET, "/source", None).await?;
        source
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| PageError::Protocol("page source is not a string".to_string()))
    }

    async fn wait_for(&mut self, locator: &Locator, wait: Duration) -> PageResult<bool> {
        let deadline = Instant::now() + wait;
        loop {
            if self.find_element(locator).await?.is_some() {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            sleep(self.poll_interval).await;
        }
    }

    async fn type_text(&mut self, locator: &Locator, text: &str) -> PageResult<()> {
        let element_id = self
            .find_element(locator)
            .await?
            .ok_or_else(|| PageError::WebDriver {
                error: "no such element".to_string(),
                message: locator.to_string(),
            })?;

        let path = format!("/element/{}/value", element_id);
        self.command(Method::POST, &path, Some(json!({ "text": text })))
            .await?;
        Ok(())
    }

    async fn close(&mut self) -> PageResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.command(Method::DELETE, "", None).await?;
        tracing::debug!("WebDriver session {} closed", self.session_id);
        Ok(())
    }
}

/// Builds the `POST /session` payload
fn build_capabilities(config: &WebDriverConfig, timeouts: &TimeoutConfig) -> Value {
    let mut always_match = json!({
        "browserName": config.browser,
        "timeouts": { "pageLoad": timeouts.page_load().as_millis() as u64, "implicit": 0 },
    });

    match config.browser.as_str() {
        "chrome" | "chromium" => {
            let mut args = vec!["--no-sandbox", "--disable-dev-shm-usage"];
            if config.headless {
                args.insert(0, "--headless");
            }
            always_match["goog:chromeOptions"] = json!({ "args": args });
        }
        "firefox" if config.headless => {
            always_match["moz:firefoxOptions"] = json!({ "args": ["-headless"] });
        }
        _ => {}
    }

    json!({ "capabilities": { "alwaysMatch": always_match } })
}

/// Unwraps the WebDriver response envelope
async fn decode(response: Response) -> PageResult<Value> {
    let status = response.status();
    let body: Value = response.json().await?;
    let value = body.get("value").cloned().unwrap_or(Value::Null);

    if status.is_success() {
        return Ok(value);
    }

    let error = value
        .get("error")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("http {}", status.as_u16()));
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Err(PageError::WebDriver { error, message })
}

fn is_not_interactable(error: &str) -> bool {
    matches!(
        error,
        "element not interactable" | "element click intercepted" | "stale element reference"
    )
}
