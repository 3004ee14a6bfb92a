// src/automation/mod.rs

//! Browser automation seam.
//!
//! The crawler and wizard drive the vendor portal through the
//! [`PageAutomator`] trait rather than a concrete WebDriver client, so
//! the whole flow can run against an in-memory fake in tests. The
//! production implementation backed by chromedriver lives in
//! [`WebDriverSession`].

mod webdriver;

#[cfg(test)]
pub mod fake;

pub use webdriver::WebDriverSession;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// How to address an element on the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// CSS selector
    Css(String),
    /// XPath expression
    XPath(String),
    /// Input nested inside a custom element's shadow content: `host`
    /// selects the outer element, `input` the field within it
    ShadowInput { host: String, input: String },
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    pub fn shadow_input(host: impl Into<String>, input: impl Into<String>) -> Self {
        Self::ShadowInput {
            host: host.into(),
            input: input.into(),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css `{s}`"),
            Self::XPath(s) => write!(f, "xpath `{s}`"),
            Self::ShadowInput { host, input } => write!(f, "shadow `{host}` > `{input}`"),
        }
    }
}

/// Single-session page automation capability.
///
/// One operation is in flight at a time; callers sequence every
/// navigation, read, and click strictly after the previous one. Element
/// misses and expired waits surface as errors whose
/// [`is_miss`](crate::error::AppError::is_miss) is true, so callers can
/// downgrade them to logged skips.
#[async_trait]
pub trait PageAutomator: Send + Sync {
    /// Load `url` in the session.
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Rendered markup of the current page.
    async fn page_source(&self) -> Result<String>;

    /// Block until `locator` matches something, up to `timeout`.
    async fn wait_for(&self, locator: &Locator, timeout: Duration) -> Result<()>;

    /// Visible text of every element matching `locator`, in page order.
    /// No matches is an empty vec, not an error.
    async fn find_all_text(&self, locator: &Locator) -> Result<Vec<String>>;

    /// Click the first element matching `locator`.
    async fn click(&self, locator: &Locator) -> Result<()>;

    /// Click the element at `index` among those matching `locator`.
    async fn click_nth(&self, locator: &Locator, index: usize) -> Result<()>;

    /// Double-click the element at `index` among those matching `locator`.
    async fn double_click_nth(&self, locator: &Locator, index: usize) -> Result<()>;

    /// Clear the field addressed by `locator` and type `text` into it.
    async fn type_into(&self, locator: &Locator, text: &str) -> Result<()>;

    /// Whether the first element matching `locator` is removed from
    /// layout (`display: none`). A missing element counts as hidden.
    async fn is_hidden(&self, locator: &Locator) -> Result<bool>;

    /// Pause for a fixed interval to let the page re-render.
    async fn settle(&self, duration: Duration);
}
