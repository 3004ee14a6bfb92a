// src/services/wizard.rs

//! ASN submission wizard driver.
//!
//! Drives one shipment through the four-step submission form: resolves
//! the warehouse label, extracts carton label / tracking pairs through
//! the picklist overlay, injects the computed ship and delivery dates,
//! and optionally clicks the final confirm control. Missing page
//! features are logged skips, never faults; the session is always left
//! where the wizard last got to.

use regex::Regex;
use scraper::{Html, Selector};

use crate::automation::{Locator, PageAutomator};
use crate::error::{AppError, Result};
use crate::models::{Config, LeadTimeTable, SessionConfig, ShipmentId, SurfaceConfig, TrackingRow};
use crate::schedule::{self, DeliverySchedule};

/// What one wizard pass produced.
#[derive(Debug)]
pub struct WizardOutcome {
    /// Extracted label/tracking rows, in grid order
    pub rows: Vec<TrackingRow>,
    /// Computed dates, absent when the warehouse has no lead time
    pub schedule: Option<DeliverySchedule>,
    /// Whether the confirm control was clicked
    pub submitted: bool,
}

/// Drives single shipments through the submission wizard.
pub struct SubmissionWizard<'a> {
    session: &'a SessionConfig,
    surface: &'a SurfaceConfig,
    page: &'a dyn PageAutomator,
    lead_times: &'a LeadTimeTable,
}

impl<'a> SubmissionWizard<'a> {
    pub fn new(
        config: &'a Config,
        page: &'a dyn PageAutomator,
        lead_times: &'a LeadTimeTable,
    ) -> Self {
        Self {
            session: &config.session,
            surface: &config.surface,
            page,
            lead_times,
        }
    }

    /// Run the whole wizard pass for one shipment.
    pub async fn process(&self, shipment: &ShipmentId, ship_date: &str) -> Result<WizardOutcome> {
        let url = self.surface.submission_url_for(shipment)?;
        self.page.navigate(&url).await?;
        self.wait_for_render(shipment).await?;

        let source = self.page.page_source().await?;
        let warehouse = extract_warehouse(
            &source,
            &self.surface.trigger_link_selector,
            &self.surface.warehouse_pattern,
        )?;
        if warehouse.is_empty() {
            log::warn!("No warehouse label matched for {shipment}");
        } else {
            log::info!("Matching warehouse: {warehouse}");
        }

        self.advance_step(&self.surface.step_two_label).await;
        self.advance_step(&self.surface.step_three_label).await;
        self.page.settle(self.session.step_settle()).await;

        let rows = self.extract_tracking_rows(shipment, &warehouse).await?;

        let schedule = match self.lead_times.lookup(&warehouse) {
            Some(lead_days) => Some(self.inject_dates(ship_date, lead_days).await?),
            None => {
                log::warn!("No lead time for warehouse: {warehouse}");
                None
            }
        };

        let submitted = if self.session.submit {
            self.submit().await?
        } else {
            false
        };
        self.page.settle(self.session.page_settle()).await;

        Ok(WizardOutcome {
            rows,
            schedule,
            submitted,
        })
    }

    async fn wait_for_render(&self, shipment: &ShipmentId) -> Result<()> {
        let marker = Locator::xpath(&self.surface.render_marker_xpath);
        match self
            .page
            .wait_for(&marker, self.session.element_timeout())
            .await
        {
            Ok(()) => Ok(()),
            Err(e) if e.is_miss() => {
                log::warn!("Render marker missing for {shipment}, continuing");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Click a step control by its visible label, tolerating absence:
    /// the wizard may already be past that step or not have rendered it
    /// yet.
    async fn advance_step(&self, label: &str) {
        let button = Locator::css(self.surface.button_selector(label));
        match self.page.click(&button).await {
            Ok(()) => log::debug!("Clicked `{label}`"),
            Err(e) if e.is_miss() => log::debug!("`{label}` control not present"),
            Err(e) => log::warn!("Error clicking `{label}`: {e}"),
        }
    }

    async fn extract_tracking_rows(
        &self,
        shipment: &ShipmentId,
        warehouse: &str,
    ) -> Result<Vec<TrackingRow>> {
        let label_cells = Locator::css(&self.surface.label_cell_selector);
        let tracking_cells = Locator::css(&self.surface.tracking_cell_selector);
        let picklist = Locator::css(&self.surface.picklist_row_selector);

        let labels = self.page.find_all_text(&label_cells).await?;
        let mut rows = Vec::new();

        for (index, label) in labels.iter().enumerate() {
            if !label.starts_with(&self.surface.carrier_prefix) {
                continue;
            }
            // picklist rows sit one position behind the grid cells
            let Some(choice_index) = index.checked_sub(1) else {
                log::warn!("Carrier label `{label}` in header position, skipping");
                continue;
            };
            if let Err(e) = self.page.double_click_nth(&tracking_cells, index).await {
                if e.is_miss() {
                    log::warn!("No tracking cell beside `{label}`, skipping");
                    continue;
                }
                return Err(e);
            }
            let choices = self.page.find_all_text(&picklist).await?;
            if choices.len() <= 1 {
                log::debug!("Picklist for `{label}` has {} rows, skipping", choices.len());
                continue;
            }
            let Some(tracking) = choices.get(choice_index) else {
                log::warn!("Picklist shorter than expected for `{label}`, skipping");
                continue;
            };
            if !tracking.is_empty() {
                if let Err(e) = self.page.click_nth(&picklist, choice_index).await {
                    if e.is_miss() {
                        log::warn!("Picklist row for `{label}` vanished before the click");
                    } else {
                        return Err(e);
                    }
                }
            }
            log::info!(
                "Extracted row: {} {} {label} `{tracking}` ({warehouse})",
                shipment.arn,
                shipment.asn
            );
            rows.push(TrackingRow {
                arn: shipment.arn.clone(),
                asn: shipment.asn.clone(),
                label: label.clone(),
                tracking: tracking.clone(),
                warehouse: warehouse.to_string(),
            });
        }
        Ok(rows)
    }

    /// Compute the schedule, advance to the date step, and type both
    /// dates. A missing date widget only skips the typing.
    async fn inject_dates(&self, ship_date: &str, lead_days: i64) -> Result<DeliverySchedule> {
        let schedule = schedule::plan_delivery(ship_date, lead_days)?;
        log::debug!("Adjusted lead time: {} days", schedule.lead_days);
        self.advance_step(&self.surface.step_four_label).await;

        match self.type_dates(&schedule).await {
            Ok(()) => self.page.settle(self.session.injection_settle()).await,
            Err(e) if e.is_miss() => {
                log::warn!("Couldn't find a date field, skipping injection: {e}");
            }
            Err(e) => return Err(e),
        }
        Ok(schedule)
    }

    async fn type_dates(&self, schedule: &DeliverySchedule) -> Result<()> {
        let ship_input =
            Locator::shadow_input(&self.surface.ship_picker, &self.surface.picker_input);
        self.page.type_into(&ship_input, &schedule.ship_date).await?;
        log::info!("Date set to: {}", schedule.ship_date);

        let edd_input =
            Locator::shadow_input(&self.surface.edd_picker, &self.surface.picker_input);
        self.page
            .type_into(&edd_input, &schedule.delivery_date)
            .await?;
        log::info!("EDD date set to: {}", schedule.delivery_date);
        Ok(())
    }

    /// Bounded-retry click on the confirm control.
    async fn submit(&self) -> Result<bool> {
        let button = Locator::css(self.surface.button_selector(&self.surface.submit_label));
        if let Err(e) = self
            .page
            .wait_for(&button, self.session.submit_timeout())
            .await
        {
            if e.is_miss() {
                log::warn!("Confirm control not found, shipment left unsubmitted");
                return Ok(false);
            }
            return Err(e);
        }
        for attempt in 1..=self.session.submit_retry_limit {
            match self.page.click(&button).await {
                Ok(()) => {
                    log::info!("Confirm and submit clicked");
                    return Ok(true);
                }
                Err(e) if e.is_miss() => {
                    log::debug!("Confirm control not clickable yet (attempt {attempt})");
                    self.page.settle(self.session.submit_retry_delay()).await;
                }
                Err(e) => return Err(e),
            }
        }
        log::warn!("Confirm control never became clickable");
        Ok(false)
    }
}

/// Read the warehouse label from the second trigger link on the page.
/// Absent link or a label failing the pattern leaves it empty.
fn extract_warehouse(source: &str, trigger_selector: &str, pattern: &str) -> Result<String> {
    let selector = Selector::parse(trigger_selector)
        .map_err(|e| AppError::selector(trigger_selector, format!("{e:?}")))?;
    let pattern = Regex::new(pattern)
        .map_err(|e| AppError::validation(format!("Warehouse pattern does not compile: {e}")))?;
    let document = Html::parse_document(source);

    if let Some(link) = document.select(&selector).nth(1) {
        if let Some(label) = link.value().attr("label") {
            if pattern.is_match(label) {
                return Ok(label.to_string());
            }
        }
    }
    Ok(String::new())
}
