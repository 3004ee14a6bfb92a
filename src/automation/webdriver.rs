// src/automation/webdriver.rs

//! Production [`PageAutomator`] backed by a WebDriver session.
//!
//! Connects through chromedriver and, when a debugger address is
//! configured, attaches to an already-running Chrome so the operator's
//! signed-in profile is reused. The session is never closed from this
//! side; an interrupted run leaves the browser exactly where it was.

use std::time::Duration;

use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::Locator as WdLocator;
use fantoccini::{Client, ClientBuilder};

use crate::automation::{Locator, PageAutomator};
use crate::error::{AppError, Result};

/// Portal widgets wrap the real control one shadow level down; click
/// the inner button when there is one.
const CLICK_SCRIPT: &str = "\
    const el = arguments[0]; \
    const inner = el.shadowRoot ? el.shadowRoot.querySelector('button') : null; \
    (inner || el).click();";

const DOUBLE_CLICK_SCRIPT: &str = "\
    arguments[0].dispatchEvent(new MouseEvent('dblclick', \
        { bubbles: true, cancelable: true, view: window }));";

const HIDDEN_SCRIPT: &str = "\
    const el = document.querySelector(arguments[0]); \
    if (!el) { return true; } \
    return window.getComputedStyle(el).display === 'none';";

/// Descends host shadow root -> kat-input -> its shadow root -> input,
/// then sets the value and fires the events the component listens for.
const SHADOW_TYPE_SCRIPT: &str = "\
    const host = document.querySelector(arguments[0]); \
    if (!host || !host.shadowRoot) { return 'no host'; } \
    const field = host.shadowRoot.querySelector('kat-input'); \
    if (!field || !field.shadowRoot) { return 'no inner field'; } \
    const input = field.shadowRoot.querySelector(arguments[1]); \
    if (!input) { return 'no input'; } \
    input.value = ''; \
    input.value = arguments[2]; \
    input.dispatchEvent(new Event('input', { bubbles: true })); \
    input.dispatchEvent(new Event('change', { bubbles: true })); \
    return 'ok';";

/// WebDriver-backed page automation.
pub struct WebDriverSession {
    client: Client,
}

impl WebDriverSession {
    /// Connect to a WebDriver endpoint. A non-empty `debugger_address`
    /// attaches to the Chrome instance already listening there instead
    /// of launching a fresh profile.
    pub async fn connect(webdriver_url: &str, debugger_address: &str) -> Result<Self> {
        let mut builder = ClientBuilder::native();
        if !debugger_address.is_empty() {
            let mut capabilities = serde_json::Map::new();
            capabilities.insert(
                "goog:chromeOptions".to_string(),
                serde_json::json!({ "debuggerAddress": debugger_address }),
            );
            builder.capabilities(capabilities);
            log::info!("Attaching to Chrome at {debugger_address}");
        }
        let client = builder.connect(webdriver_url).await?;
        log::info!("WebDriver session established via {webdriver_url}");
        Ok(Self { client })
    }

    async fn find_nth(&self, locator: &Locator, index: usize) -> Result<Element> {
        let elements = self
            .client
            .find_all(as_wd(locator)?)
            .await
            .map_err(|e| classify(e, locator))?;
        let count = elements.len();
        elements.into_iter().nth(index).ok_or_else(|| {
            AppError::not_found(format!("{count} elements for {locator}, wanted index {index}"))
        })
    }

    async fn js_click(&self, element: &Element, locator: &Locator) -> Result<()> {
        self.client
            .execute(CLICK_SCRIPT, vec![serde_json::to_value(element)?])
            .await
            .map_err(|e| classify(e, locator))?;
        Ok(())
    }
}

#[async_trait]
impl PageAutomator for WebDriverSession {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.client.goto(url).await?;
        Ok(())
    }

    async fn page_source(&self) -> Result<String> {
        Ok(self.client.source().await?)
    }

    async fn wait_for(&self, locator: &Locator, timeout: Duration) -> Result<()> {
        self.client
            .wait()
            .at_most(timeout)
            .for_element(as_wd(locator)?)
            .await
            .map(|_| ())
            .map_err(|e| classify(e, locator))
    }

    async fn find_all_text(&self, locator: &Locator) -> Result<Vec<String>> {
        let elements = self
            .client
            .find_all(as_wd(locator)?)
            .await
            .map_err(|e| classify(e, locator))?;
        let mut texts = Vec::with_capacity(elements.len());
        for element in &elements {
            texts.push(element.text().await?);
        }
        Ok(texts)
    }

    async fn click(&self, locator: &Locator) -> Result<()> {
        let element = self
            .client
            .find(as_wd(locator)?)
            .await
            .map_err(|e| classify(e, locator))?;
        self.js_click(&element, locator).await
    }

    async fn click_nth(&self, locator: &Locator, index: usize) -> Result<()> {
        let element = self.find_nth(locator, index).await?;
        self.js_click(&element, locator).await
    }

    async fn double_click_nth(&self, locator: &Locator, index: usize) -> Result<()> {
        let element = self.find_nth(locator, index).await?;
        self.client
            .execute(DOUBLE_CLICK_SCRIPT, vec![serde_json::to_value(&element)?])
            .await
            .map_err(|e| classify(e, locator))?;
        Ok(())
    }

    async fn type_into(&self, locator: &Locator, text: &str) -> Result<()> {
        match locator {
            Locator::ShadowInput { host, input } => {
                let outcome = self
                    .client
                    .execute(
                        SHADOW_TYPE_SCRIPT,
                        vec![
                            serde_json::Value::String(host.clone()),
                            serde_json::Value::String(input.clone()),
                            serde_json::Value::String(text.to_string()),
                        ],
                    )
                    .await
                    .map_err(|e| classify(e, locator))?;
                match outcome.as_str() {
                    Some("ok") => Ok(()),
                    Some(status) => Err(AppError::not_found(format!(
                        "Input not reachable ({status}) for {locator}"
                    ))),
                    None => Err(AppError::not_found(format!(
                        "Input not reachable for {locator}"
                    ))),
                }
            }
            _ => {
                let element = self
                    .client
                    .find(as_wd(locator)?)
                    .await
                    .map_err(|e| classify(e, locator))?;
                element.clear().await.map_err(|e| classify(e, locator))?;
                element
                    .send_keys(text)
                    .await
                    .map_err(|e| classify(e, locator))?;
                Ok(())
            }
        }
    }

    async fn is_hidden(&self, locator: &Locator) -> Result<bool> {
        let Locator::Css(selector) = locator else {
            return Err(AppError::selector(
                locator.to_string(),
                "visibility probe needs a css locator",
            ));
        };
        let value = self
            .client
            .execute(
                HIDDEN_SCRIPT,
                vec![serde_json::Value::String(selector.clone())],
            )
            .await
            .map_err(|e| classify(e, locator))?;
        Ok(value.as_bool().unwrap_or(true))
    }

    async fn settle(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

fn as_wd(locator: &Locator) -> Result<WdLocator<'_>> {
    match locator {
        Locator::Css(s) => Ok(WdLocator::Css(s.as_str())),
        Locator::XPath(s) => Ok(WdLocator::XPath(s.as_str())),
        Locator::ShadowInput { .. } => Err(AppError::selector(
            locator.to_string(),
            "shadow locators only support typing",
        )),
    }
}

fn classify(err: CmdError, locator: &Locator) -> AppError {
    if matches!(err, CmdError::WaitTimeout) {
        AppError::timeout(locator.to_string())
    } else if err.is_no_such_element() {
        AppError::not_found(format!("No element for {locator}"))
    } else {
        AppError::WebDriver(err)
    }
}
