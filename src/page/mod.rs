//! Page provider interface
//!
//! The traversal never talks to a browser directly. It drives a
//! `PageProvider`: something that can load a URL, wait for the document to
//! settle, click an element by locator and hand back the rendered markup.
//!
//! - `WebDriverPage`: W3C WebDriver client (chromedriver, geckodriver, Selenium)

mod webdriver;

pub use webdriver::WebDriverPage;

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a page provider
#[derive(Debug, Error)]
pub enum PageError {
    #[error("HTTP error talking to browser driver: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebDriver error '{error}': {message}")]
    WebDriver { error: String, message: String },

    #[error("Timed out after {waited:?} waiting for {what}")]
    Timeout { what: String, waited: Duration },

    #[error("Unexpected driver response: {0}")]
    Protocol(String),
}

/// Result type for page operations
pub type PageResult<T> = Result<T, PageError>;

/// How an element is located on the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// CSS selector
    Css(String),

    /// Anchor whose visible text contains the given string
    PartialLinkText(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    pub fn link_text(text: impl Into<String>) -> Self {
        Self::PartialLinkText(text.into())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(selector) => write!(f, "css `{}`", selector),
            Self::PartialLinkText(text) => write!(f, "link text `{}`", text),
        }
    }
}

/// Outcome of trying to click an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The element was found and clicked
    Clicked,

    /// No element matched within the wait
    NotFound,

    /// An element matched but was hidden, disabled or covered
    NotInteractable,
}

/// A single interactive browsing session
///
/// Calls are strictly sequential; each one mutates the shared current view.
#[async_trait]
pub trait PageProvider: Send {
    /// Loads `url` in the current session
    async fn navigate(&mut self, url: &str) -> PageResult<()>;

    /// Blocks until the document reports it finished loading
    async fn wait_until_loaded(&mut self) -> PageResult<()>;

    /// Waits up to `wait` for `locator` to be clickable, then clicks it
    ///
    /// Missing or non-interactable elements are outcomes, not errors.
    async fn find_and_click(&mut self, locator: &Locator, wait: Duration)
        -> PageResult<ClickOutcome>;

    /// Snapshot of the rendered markup
    async fn current_content(&mut self) -> PageResult<String>;

    /// Waits up to `wait` for `locator` to be present; returns whether it appeared
    async fn wait_for(&mut self, locator: &Locator, wait: Duration) -> PageResult<bool>;

    /// Types `text` into the element matched by `locator`
    async fn type_text(&mut self, locator: &Locator, text: &str) -> PageResult<()>;

    /// Releases the session
    async fn close(&mut self) -> PageResult<()>;
}
