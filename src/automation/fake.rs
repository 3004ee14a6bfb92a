// src/automation/fake.rs

//! In-memory [`PageAutomator`] for tests.
//!
//! A [`FakePage`] is a fixed list of [`Screen`]s. Navigation selects the
//! first screen whose url fragment matches, clicking a screen's advance
//! control moves to the next screen in the list, and waits resolve
//! immediately. Every successful interaction is recorded as an [`Event`]
//! for assertions.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::automation::{Locator, PageAutomator};
use crate::error::{AppError, Result};

/// Interaction performed against the fake, keyed by the locator's
/// display form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Navigated(String),
    Clicked(String),
    ClickedNth(String, usize),
    DoubleClicked(String, usize),
    Typed(String, String),
}

/// One rendered page state.
pub struct Screen {
    url_part: String,
    source: String,
    elements: HashMap<String, Vec<String>>,
    hidden: HashSet<String>,
    advance_on: Option<String>,
}

impl Screen {
    pub fn new(url_part: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            url_part: url_part.into(),
            source: source.into(),
            elements: HashMap::new(),
            hidden: HashSet::new(),
            advance_on: None,
        }
    }

    /// Declare elements matching `locator`, one entry per element text.
    /// Declare an empty slice for a present element whose text is unused.
    pub fn element(mut self, locator: &Locator, texts: &[&str]) -> Self {
        self.elements.insert(
            locator.to_string(),
            texts.iter().map(|t| (*t).to_string()).collect(),
        );
        self
    }

    /// Declare an element that is present but removed from layout.
    pub fn hidden(mut self, locator: &Locator) -> Self {
        let key = locator.to_string();
        self.elements.entry(key.clone()).or_default();
        self.hidden.insert(key);
        self
    }

    /// Clicking this locator moves the fake to the next screen in the
    /// list. On the last screen the click lands but nothing advances.
    pub fn advance_on(mut self, locator: &Locator) -> Self {
        self.advance_on = Some(locator.to_string());
        self
    }

    fn has(&self, key: &str) -> bool {
        self.elements.contains_key(key) || self.advance_on.as_deref() == Some(key)
    }
}

struct State {
    current: Option<usize>,
    events: Vec<Event>,
}

/// Scripted page automation over a fixed screen list.
pub struct FakePage {
    screens: Vec<Screen>,
    state: Mutex<State>,
}

impl FakePage {
    pub fn new(screens: Vec<Screen>) -> Self {
        Self {
            screens,
            state: Mutex::new(State {
                current: None,
                events: Vec::new(),
            }),
        }
    }

    /// Everything performed against the fake so far, in order.
    pub fn events(&self) -> Vec<Event> {
        self.lock().events.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn current_screen(&self, state: &State) -> Result<&Screen> {
        state
            .current
            .and_then(|idx| self.screens.get(idx))
            .ok_or_else(|| AppError::validation("No screen loaded"))
    }
}

#[async_trait]
impl PageAutomator for FakePage {
    async fn navigate(&self, url: &str) -> Result<()> {
        let mut state = self.lock();
        state.events.push(Event::Navigated(url.to_string()));
        match self
            .screens
            .iter()
            .position(|screen| url.contains(&screen.url_part))
        {
            Some(idx) => {
                state.current = Some(idx);
                Ok(())
            }
            None => Err(AppError::not_found(format!("No screen for {url}"))),
        }
    }

    async fn page_source(&self) -> Result<String> {
        let state = self.lock();
        Ok(self.current_screen(&state)?.source.clone())
    }

    async fn wait_for(&self, locator: &Locator, _timeout: Duration) -> Result<()> {
        let state = self.lock();
        if self.current_screen(&state)?.has(&locator.to_string()) {
            Ok(())
        } else {
            Err(AppError::timeout(locator.to_string()))
        }
    }

    async fn find_all_text(&self, locator: &Locator) -> Result<Vec<String>> {
        let state = self.lock();
        Ok(self
            .current_screen(&state)?
            .elements
            .get(&locator.to_string())
            .cloned()
            .unwrap_or_default())
    }

    async fn click(&self, locator: &Locator) -> Result<()> {
        let key = locator.to_string();
        let mut state = self.lock();
        let screen = self.current_screen(&state)?;
        if screen.advance_on.as_deref() == Some(key.as_str()) {
            let next = state.current.map(|idx| (idx + 1).min(self.screens.len() - 1));
            state.current = next;
            state.events.push(Event::Clicked(key));
            Ok(())
        } else if screen.elements.contains_key(&key) {
            state.events.push(Event::Clicked(key));
            Ok(())
        } else {
            Err(AppError::not_found(format!("No element for {locator}")))
        }
    }

    async fn click_nth(&self, locator: &Locator, index: usize) -> Result<()> {
        let key = locator.to_string();
        let mut state = self.lock();
        let present = self
            .current_screen(&state)?
            .elements
            .get(&key)
            .is_some_and(|texts| index < texts.len());
        if present {
            state.events.push(Event::ClickedNth(key, index));
            Ok(())
        } else {
            Err(AppError::not_found(format!(
                "No element at index {index} for {locator}"
            )))
        }
    }

    async fn double_click_nth(&self, locator: &Locator, index: usize) -> Result<()> {
        let key = locator.to_string();
        let mut state = self.lock();
        let present = self
            .current_screen(&state)?
            .elements
            .get(&key)
            .is_some_and(|texts| index < texts.len());
        if present {
            state.events.push(Event::DoubleClicked(key, index));
            Ok(())
        } else {
            Err(AppError::not_found(format!(
                "No element at index {index} for {locator}"
            )))
        }
    }

    async fn type_into(&self, locator: &Locator, text: &str) -> Result<()> {
        let key = locator.to_string();
        let mut state = self.lock();
        if self.current_screen(&state)?.elements.contains_key(&key) {
            state
                .events
                .push(Event::Typed(key, text.to_string()));
            Ok(())
        } else {
            Err(AppError::not_found(format!(
                "Input not reachable for {locator}"
            )))
        }
    }

    async fn is_hidden(&self, locator: &Locator) -> Result<bool> {
        let key = locator.to_string();
        let state = self.lock();
        let screen = self.current_screen(&state)?;
        if screen.hidden.contains(&key) {
            Ok(true)
        } else {
            Ok(!screen.has(&key))
        }
    }

    async fn settle(&self, _duration: Duration) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn advance_click_moves_to_next_screen() {
        let next = Locator::css("#next");
        let page = FakePage::new(vec![
            Screen::new("list", "<p>one</p>").advance_on(&next),
            Screen::new("list", "<p>two</p>"),
        ]);

        page.navigate("https://example.com/list").await.unwrap();
        assert_eq!(page.page_source().await.unwrap(), "<p>one</p>");
        page.click(&next).await.unwrap();
        assert_eq!(page.page_source().await.unwrap(), "<p>two</p>");
        // nothing declared on the second screen, so the control is gone
        assert!(page.click(&next).await.unwrap_err().is_miss());
    }

    #[tokio::test]
    async fn missing_elements_count_as_hidden() {
        let control = Locator::css("#pager");
        let page = FakePage::new(vec![
            Screen::new("list", "").hidden(&control),
            Screen::new("other", ""),
        ]);

        page.navigate("https://example.com/list").await.unwrap();
        assert!(page.is_hidden(&control).await.unwrap());
        page.navigate("https://example.com/other").await.unwrap();
        assert!(page.is_hidden(&control).await.unwrap());
    }

    #[tokio::test]
    async fn records_interactions_in_order() {
        let cell = Locator::css(".cell");
        let input = Locator::shadow_input("kat-date-picker#p", "input");
        let page = FakePage::new(vec![Screen::new("wizard", "")
            .element(&cell, &["a", "b"])
            .element(&input, &[])]);

        page.navigate("https://example.com/wizard").await.unwrap();
        page.double_click_nth(&cell, 1).await.unwrap();
        page.click_nth(&cell, 0).await.unwrap();
        page.type_into(&input, "01/20/2025").await.unwrap();

        assert_eq!(
            page.events(),
            vec![
                Event::Navigated("https://example.com/wizard".to_string()),
                Event::DoubleClicked(cell.to_string(), 1),
                Event::ClickedNth(cell.to_string(), 0),
                Event::Typed(input.to_string(), "01/20/2025".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn waits_resolve_immediately() {
        let marker = Locator::xpath("//img[@height='45']");
        let page = FakePage::new(vec![Screen::new("wizard", "").element(&marker, &[])]);

        page.navigate("https://example.com/wizard").await.unwrap();
        page.wait_for(&marker, Duration::from_secs(600)).await.unwrap();
        let missing = Locator::css("#absent");
        assert!(page
            .wait_for(&missing, Duration::from_secs(600))
            .await
            .unwrap_err()
            .is_miss());
    }
}
