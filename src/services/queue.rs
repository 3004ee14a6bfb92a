// src/services/queue.rs

//! Shipping queue crawler.
//!
//! Pages through the queue list view and extracts the shipment
//! identifiers whose pickup label matches the requested marker.

use scraper::{Html, Selector};

use crate::automation::{Locator, PageAutomator};
use crate::error::{AppError, Result};
use crate::models::{Config, SessionConfig, ShipmentId, SurfaceConfig};

/// Crawls the shipping queue list view for shipment identifiers.
pub struct QueueCrawler<'a> {
    session: &'a SessionConfig,
    surface: &'a SurfaceConfig,
    page: &'a dyn PageAutomator,
}

impl<'a> QueueCrawler<'a> {
    pub fn new(config: &'a Config, page: &'a dyn PageAutomator) -> Self {
        Self {
            session: &config.session,
            surface: &config.surface,
            page,
        }
    }

    /// Walk the queue pages and collect every shipment whose pickup
    /// label mentions `pickup_marker`, in page order.
    ///
    /// The walk ends when the pagination container reports hidden, when
    /// the next control cannot be found, or at the configured page cap,
    /// whichever comes first.
    pub async fn collect(&self, pickup_marker: &str) -> Result<Vec<ShipmentId>> {
        self.page.navigate(&self.surface.queue_url).await?;
        self.page.settle(self.session.queue_settle()).await;

        let next_container = Locator::css(&self.surface.next_container);
        let next_label = Locator::xpath(&self.surface.next_label_xpath);
        let mut shipments = Vec::new();
        let mut pages_visited = 0;

        loop {
            if pages_visited == self.session.max_pages {
                log::warn!("Stopping after {pages_visited} queue pages with more left over");
                break;
            }
            pages_visited += 1;

            let source = self.page.page_source().await?;
            let found = extract_shipments(
                &source,
                &self.surface.queue_label_selector,
                pickup_marker,
            )?;
            log::debug!("Queue page {pages_visited}: {} matching labels", found.len());
            shipments.extend(found);

            if self.page.is_hidden(&next_container).await? {
                log::info!("Pages have come to an end");
                break;
            }
            match self.next_page(&next_label).await {
                Ok(()) => self.page.settle(self.session.page_settle()).await,
                Err(e) if e.is_miss() => {
                    log::info!("No more pages");
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        log::info!(
            "Collected {} shipments across {pages_visited} queue pages",
            shipments.len()
        );
        Ok(shipments)
    }

    async fn next_page(&self, next_label: &Locator) -> Result<()> {
        self.page
            .wait_for(next_label, self.session.element_timeout())
            .await?;
        log::info!("Next page found, going to it");
        self.page.click(next_label).await
    }
}

/// Pull matching shipment identifiers out of one rendered queue page.
fn extract_shipments(
    source: &str,
    label_selector: &str,
    pickup_marker: &str,
) -> Result<Vec<ShipmentId>> {
    let selector = Selector::parse(label_selector)
        .map_err(|e| AppError::selector(label_selector, format!("{e:?}")))?;
    let document = Html::parse_document(source);

    let mut found = Vec::new();
    for label in document.select(&selector) {
        let Some(text) = label.value().attr("text") else {
            continue;
        };
        if !text.contains(pickup_marker) {
            continue;
        }
        let Some(id) = label.value().attr("id") else {
            continue;
        };
        match ShipmentId::from_label_id(id) {
            Some(shipment) => {
                log::info!("Extracted ARN: {}, ASN: {}", shipment.arn, shipment.asn);
                found.push(shipment);
            }
            None => log::debug!("Label id `{id}` does not split into a shipment id"),
        }
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automation::fake::{Event, FakePage, Screen};

    fn queue_page(labels: &[(&str, &str)]) -> String {
        let rows: String = labels
            .iter()
            .map(|(id, text)| {
                format!(
                    r#"<kat-label class="kat-label-light-text" id="{id}" text="{text}"></kat-label>"#
                )
            })
            .collect();
        format!("<html><body>{rows}</body></html>")
    }

    #[test]
    fn extracts_ids_from_matching_labels_only() {
        let source = queue_page(&[
            ("shipment-queue-label-P1-S1", "Pickup: Thu, Sep 19, 2024 CDT"),
            ("shipment-queue-label-P2-S2", "Pickup: Fri, Sep 20, 2024 CDT"),
        ]);
        let found = extract_shipments(
            &source,
            "kat-label.kat-label-light-text",
            "Sep 19, 2024",
        )
        .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].arn, "P1");
        assert_eq!(found[0].asn, "S1");
    }

    #[test]
    fn skips_labels_without_usable_attributes() {
        let source = format!(
            "<html><body>{}{}{}</body></html>",
            // id too short to carry both identifiers
            r#"<kat-label class="kat-label-light-text" id="too-short-P9" text="Pickup: marker"></kat-label>"#,
            // no id at all
            r#"<kat-label class="kat-label-light-text" text="Pickup: marker"></kat-label>"#,
            // no text attribute
            r#"<kat-label class="kat-label-light-text" id="queue-label-row-P3-S3"></kat-label>"#,
        );
        let found =
            extract_shipments(&source, "kat-label.kat-label-light-text", "marker").unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn collects_across_pages_until_pager_hides() {
        let config = Config::default();
        let next_container = Locator::css(&config.surface.next_container);
        let next_label = Locator::xpath(&config.surface.next_label_xpath);

        let page_one = Screen::new(
            "shippingqueue",
            queue_page(&[("queue-label-row-P1-S1", "Pickup: X")]),
        )
        .element(&next_container, &[])
        .advance_on(&next_label);
        let page_two = Screen::new(
            "shippingqueue",
            queue_page(&[("queue-label-row-P2-S2", "Pickup: X")]),
        );
        let fake = FakePage::new(vec![page_one, page_two]);

        let crawler = QueueCrawler::new(&config, &fake);
        let shipments = crawler.collect("Pickup: X").await.unwrap();

        assert_eq!(shipments.len(), 2);
        assert_eq!(shipments[0].to_string(), "P1/S1");
        assert_eq!(shipments[1].to_string(), "P2/S2");
        let clicks = fake
            .events()
            .iter()
            .filter(|e| matches!(e, Event::Clicked(_)))
            .count();
        assert_eq!(clicks, 1);
    }

    #[tokio::test]
    async fn page_cap_bounds_a_pager_that_never_hides() {
        let mut config = Config::default();
        config.session.max_pages = 3;
        let next_container = Locator::css(&config.surface.next_container);
        let next_label = Locator::xpath(&config.surface.next_label_xpath);

        // one screen advancing to itself: the pager never reports hidden
        let screen = Screen::new(
            "shippingqueue",
            queue_page(&[("queue-label-row-P1-S1", "Pickup: X")]),
        )
        .element(&next_container, &[])
        .advance_on(&next_label);
        let fake = FakePage::new(vec![screen]);

        let crawler = QueueCrawler::new(&config, &fake);
        let shipments = crawler.collect("Pickup: X").await.unwrap();

        assert_eq!(shipments.len(), 3);
    }

    #[tokio::test]
    async fn explicit_hidden_pager_ends_on_first_page() {
        let config = Config::default();
        let next_container = Locator::css(&config.surface.next_container);

        let screen = Screen::new(
            "shippingqueue",
            queue_page(&[("queue-label-row-P1-S1", "Pickup: X")]),
        )
        .hidden(&next_container);
        let fake = FakePage::new(vec![screen]);

        let crawler = QueueCrawler::new(&config, &fake);
        let shipments = crawler.collect("Pickup: X").await.unwrap();

        assert_eq!(shipments.len(), 1);
        assert!(!fake
            .events()
            .iter()
            .any(|e| matches!(e, Event::Clicked(_))));
    }
}
