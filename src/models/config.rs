//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::ShipmentId;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Browser session and timing settings
    #[serde(default)]
    pub session: SessionConfig,

    /// Selectors, labels, and URLs of the target surface
    #[serde(default)]
    pub surface: SurfaceConfig,

    /// Input/output file locations
    #[serde(default)]
    pub paths: PathsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    ///
    /// Every CSS selector must parse and the warehouse pattern must compile,
    /// so a typo surfaces at startup instead of as a silent no-match run.
    pub fn validate(&self) -> Result<()> {
        if self.session.element_timeout_secs == 0 {
            return Err(AppError::validation(
                "session.element_timeout_secs must be > 0",
            ));
        }
        if self.session.submit_timeout_secs == 0 {
            return Err(AppError::validation(
                "session.submit_timeout_secs must be > 0",
            ));
        }
        if self.session.max_pages == 0 {
            return Err(AppError::validation("session.max_pages must be > 0"));
        }
        if self.session.submit_retry_limit == 0 {
            return Err(AppError::validation(
                "session.submit_retry_limit must be > 0",
            ));
        }
        if self.session.webdriver_url.trim().is_empty() {
            return Err(AppError::validation("session.webdriver_url is empty"));
        }

        url::Url::parse(&self.surface.queue_url)?;
        url::Url::parse(&self.surface.submission_url)?;

        for selector in [
            &self.surface.queue_label_selector,
            &self.surface.next_container,
            &self.surface.trigger_link_selector,
            &self.surface.label_cell_selector,
            &self.surface.tracking_cell_selector,
            &self.surface.picklist_row_selector,
            &self.surface.ship_picker,
            &self.surface.edd_picker,
            &self.surface.picker_input,
        ] {
            check_selector(selector)?;
        }
        for label in [
            &self.surface.step_two_label,
            &self.surface.step_three_label,
            &self.surface.step_four_label,
            &self.surface.submit_label,
        ] {
            if label.trim().is_empty() {
                return Err(AppError::validation("surface step/submit label is empty"));
            }
            check_selector(&self.surface.button_selector(label))?;
        }
        for xpath in [
            &self.surface.next_label_xpath,
            &self.surface.render_marker_xpath,
        ] {
            if xpath.trim().is_empty() {
                return Err(AppError::validation("surface XPath expression is empty"));
            }
        }

        regex::Regex::new(&self.surface.warehouse_pattern).map_err(|e| {
            AppError::validation(format!(
                "surface.warehouse_pattern does not compile: {e}"
            ))
        })?;

        if self.surface.carrier_prefix.is_empty() {
            return Err(AppError::validation("surface.carrier_prefix is empty"));
        }

        Ok(())
    }
}

fn check_selector(selector: &str) -> Result<()> {
    scraper::Selector::parse(selector)
        .map(|_| ())
        .map_err(|e| AppError::selector(selector, format!("{e:?}")))
}

/// Browser session and timing behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// WebDriver endpoint (chromedriver) to connect through
    #[serde(default = "defaults::webdriver_url")]
    pub webdriver_url: String,

    /// Debugger address of the already-authenticated Chrome to attach to
    #[serde(default = "defaults::debugger_address")]
    pub debugger_address: String,

    /// Bounded wait for element location, in seconds
    #[serde(default = "defaults::element_timeout")]
    pub element_timeout_secs: u64,

    /// Bounded wait for the final submit control, in seconds
    #[serde(default = "defaults::submit_timeout")]
    pub submit_timeout_secs: u64,

    /// Pause after opening the shipping queue, in milliseconds
    #[serde(default = "defaults::queue_settle")]
    pub queue_settle_ms: u64,

    /// Pause after page turns and between shipments, in milliseconds
    #[serde(default = "defaults::page_settle")]
    pub page_settle_ms: u64,

    /// Pause after step-advance clicks, in milliseconds
    #[serde(default = "defaults::step_settle")]
    pub step_settle_ms: u64,

    /// Pause after date injection, in milliseconds
    #[serde(default = "defaults::injection_settle")]
    pub injection_settle_ms: u64,

    /// Hard cap on queue pages visited in one run
    #[serde(default = "defaults::max_pages")]
    pub max_pages: usize,

    /// Click the final confirm-and-submit control on each shipment
    #[serde(default)]
    pub submit: bool,

    /// Click attempts for the submit control
    #[serde(default = "defaults::submit_retry_limit")]
    pub submit_retry_limit: u32,

    /// Delay between submit click attempts, in milliseconds
    #[serde(default = "defaults::submit_retry_delay")]
    pub submit_retry_delay_ms: u64,
}

impl SessionConfig {
    pub fn element_timeout(&self) -> Duration {
        Duration::from_secs(self.element_timeout_secs)
    }

    pub fn submit_timeout(&self) -> Duration {
        Duration::from_secs(self.submit_timeout_secs)
    }

    pub fn queue_settle(&self) -> Duration {
        Duration::from_millis(self.queue_settle_ms)
    }

    pub fn page_settle(&self) -> Duration {
        Duration::from_millis(self.page_settle_ms)
    }

    pub fn step_settle(&self) -> Duration {
        Duration::from_millis(self.step_settle_ms)
    }

    pub fn injection_settle(&self) -> Duration {
        Duration::from_millis(self.injection_settle_ms)
    }

    pub fn submit_retry_delay(&self) -> Duration {
        Duration::from_millis(self.submit_retry_delay_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            webdriver_url: defaults::webdriver_url(),
            debugger_address: defaults::debugger_address(),
            element_timeout_secs: defaults::element_timeout(),
            submit_timeout_secs: defaults::submit_timeout(),
            queue_settle_ms: defaults::queue_settle(),
            page_settle_ms: defaults::page_settle(),
            step_settle_ms: defaults::step_settle(),
            injection_settle_ms: defaults::injection_settle(),
            max_pages: defaults::max_pages(),
            submit: false,
            submit_retry_limit: defaults::submit_retry_limit(),
            submit_retry_delay_ms: defaults::submit_retry_delay(),
        }
    }
}

/// Selectors, labels, and URLs of the vendor shipping surface.
///
/// Any drift on the target surface shows up as logged "not found" skips, so
/// every hook lives here where an operator can patch it without a rebuild.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceConfig {
    /// Shipping queue list view
    #[serde(default = "defaults::queue_url")]
    pub queue_url: String,

    /// ASN submission wizard, parameterized by arn/asnId
    #[serde(default = "defaults::submission_url")]
    pub submission_url: String,

    /// Queue labels carrying pickup text and the composite shipment id
    #[serde(default = "defaults::queue_label_selector")]
    pub queue_label_selector: String,

    /// Container whose computed display signals the last page
    #[serde(default = "defaults::next_container")]
    pub next_container: String,

    /// Clickable "next >" affordance inside the pagination container
    #[serde(default = "defaults::next_label_xpath")]
    pub next_label_xpath: String,

    /// Image marker confirming the wizard page has rendered
    #[serde(default = "defaults::render_marker_xpath")]
    pub render_marker_xpath: String,

    /// Trigger links; the second carries the warehouse label
    #[serde(default = "defaults::trigger_link_selector")]
    pub trigger_link_selector: String,

    /// Warehouse labels start with a 4-char alphanumeric code and a comma
    #[serde(default = "defaults::warehouse_pattern")]
    pub warehouse_pattern: String,

    #[serde(default = "defaults::step_two_label")]
    pub step_two_label: String,

    #[serde(default = "defaults::step_three_label")]
    pub step_three_label: String,

    #[serde(default = "defaults::step_four_label")]
    pub step_four_label: String,

    #[serde(default = "defaults::submit_label")]
    pub submit_label: String,

    /// Carton label grid cells
    #[serde(default = "defaults::label_cell_selector")]
    pub label_cell_selector: String,

    /// Carrier tracking grid cells, parallel to the label cells
    #[serde(default = "defaults::tracking_cell_selector")]
    pub tracking_cell_selector: String,

    /// Rows of the picklist opened by double-activating a tracking cell
    #[serde(default = "defaults::picklist_row_selector")]
    pub picklist_row_selector: String,

    /// Label prefix marking carrier-labeled cartons
    #[serde(default = "defaults::carrier_prefix")]
    pub carrier_prefix: String,

    /// Ship-date picker host element
    #[serde(default = "defaults::ship_picker")]
    pub ship_picker: String,

    /// Estimated-delivery-date picker host element
    #[serde(default = "defaults::edd_picker")]
    pub edd_picker: String,

    /// Input nested inside the picker's shadow content
    #[serde(default = "defaults::picker_input")]
    pub picker_input: String,
}

impl SurfaceConfig {
    /// Build the wizard URL for one shipment.
    pub fn submission_url_for(&self, shipment: &ShipmentId) -> Result<String> {
        let url = url::Url::parse_with_params(
            &self.submission_url,
            &[("arn", shipment.arn.as_str()), ("asnId", shipment.asn.as_str())],
        )?;
        Ok(url.to_string())
    }

    /// CSS selector for a kat-button with the given visible label.
    pub fn button_selector(&self, label: &str) -> String {
        format!(r#"kat-button[label="{label}"]"#)
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            queue_url: defaults::queue_url(),
            submission_url: defaults::submission_url(),
            queue_label_selector: defaults::queue_label_selector(),
            next_container: defaults::next_container(),
            next_label_xpath: defaults::next_label_xpath(),
            render_marker_xpath: defaults::render_marker_xpath(),
            trigger_link_selector: defaults::trigger_link_selector(),
            warehouse_pattern: defaults::warehouse_pattern(),
            step_two_label: defaults::step_two_label(),
            step_three_label: defaults::step_three_label(),
            step_four_label: defaults::step_four_label(),
            submit_label: defaults::submit_label(),
            label_cell_selector: defaults::label_cell_selector(),
            tracking_cell_selector: defaults::tracking_cell_selector(),
            picklist_row_selector: defaults::picklist_row_selector(),
            carrier_prefix: defaults::carrier_prefix(),
            ship_picker: defaults::ship_picker(),
            edd_picker: defaults::edd_picker(),
            picker_input: defaults::picker_input(),
        }
    }
}

/// Input/output file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Lead-time table: column 0 = warehouse code, column 2 = lead days
    #[serde(default = "defaults::lead_times")]
    pub lead_times: PathBuf,

    /// Report written once at the end of the run
    #[serde(default = "defaults::output")]
    pub output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            lead_times: defaults::lead_times(),
            output: defaults::output(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Session defaults
    pub fn webdriver_url() -> String {
        "http://localhost:4444".into()
    }
    pub fn debugger_address() -> String {
        "127.0.0.1:9225".into()
    }
    pub fn element_timeout() -> u64 {
        10
    }
    pub fn submit_timeout() -> u64 {
        15
    }
    pub fn queue_settle() -> u64 {
        10_000
    }
    pub fn page_settle() -> u64 {
        2_000
    }
    pub fn step_settle() -> u64 {
        20
    }
    pub fn injection_settle() -> u64 {
        3_000
    }
    pub fn max_pages() -> usize {
        25
    }
    pub fn submit_retry_limit() -> u32 {
        10
    }
    pub fn submit_retry_delay() -> u64 {
        500
    }

    // Surface defaults
    pub fn queue_url() -> String {
        "https://vendorcentral.amazon.com/kt/vendor/members/afi-shipment-mgr/shippingqueue".into()
    }
    pub fn submission_url() -> String {
        "https://vendorcentral.amazon.com/kt/vendor/members/afi-shipment-mgr/asnsubmission".into()
    }
    pub fn queue_label_selector() -> String {
        "kat-label.kat-label-light-text".into()
    }
    pub fn next_container() -> String {
        "#sq-pag-next-div".into()
    }
    pub fn next_label_xpath() -> String {
        "//div[@id='sq-pag-next-div']//kat-label[@class='kat-label-link-text']//span[contains(text(), 'next >')]"
            .into()
    }
    pub fn render_marker_xpath() -> String {
        "//img[@height='45']".into()
    }
    pub fn trigger_link_selector() -> String {
        "kat-link[slot='trigger']".into()
    }
    pub fn warehouse_pattern() -> String {
        "^[A-Za-z0-9]{4},".into()
    }
    pub fn step_two_label() -> String {
        "Continue to step 2".into()
    }
    pub fn step_three_label() -> String {
        "Continue to step 3".into()
    }
    pub fn step_four_label() -> String {
        "Continue to step 4".into()
    }
    pub fn submit_label() -> String {
        "Confirm and submit shipment".into()
    }
    pub fn label_cell_selector() -> String {
        r#"div[col-id="cartonLabelBarcode"]"#.into()
    }
    pub fn tracking_cell_selector() -> String {
        r#"div[col-id="carrierTrackingNumber"]"#.into()
    }
    pub fn picklist_row_selector() -> String {
        ".ag-rich-select-row".into()
    }
    pub fn carrier_prefix() -> String {
        "AMZN".into()
    }
    pub fn ship_picker() -> String {
        "kat-date-picker#asnlabel-shipdate-picker".into()
    }
    pub fn edd_picker() -> String {
        "kat-date-picker#asnlabel-edd-picker".into()
    }
    pub fn picker_input() -> String {
        r#"input[placeholder="MM/DD/YYYY"]"#.into()
    }

    // Path defaults
    pub fn lead_times() -> PathBuf {
        PathBuf::from("warehouse_ship_days.csv")
    }
    pub fn output() -> PathBuf {
        PathBuf::from("arn_asn_data.csv")
    }
}
