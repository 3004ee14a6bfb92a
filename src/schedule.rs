// src/schedule.rs

//! Ship/delivery date scheduling.
//!
//! A shipment's delivery date is its ship date plus the warehouse lead
//! time, padded by two days when the transit window touches a weekend.
//! The weekend scan walks true calendar days; the emitted delivery string
//! adds the padded lead to the ship date's day component with no
//! month/year carry, so its day field can exceed the month's length.
//! Downstream consumes that string verbatim.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::error::{AppError, Result};

/// Computed dates for one shipment, formatted `MM/DD/YYYY`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliverySchedule {
    pub ship_date: String,
    pub delivery_date: String,
    /// Lead days after the weekend adjustment
    pub lead_days: i64,
}

/// Parse a user-supplied `MM/DD/YYYY` ship date.
pub fn parse_ship_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%m/%d/%Y").map_err(|e| {
        AppError::validation(format!(
            "Invalid ship date '{raw}': expected MM/DD/YYYY ({e})"
        ))
    })
}

/// True when any day in the inclusive range `[start, end]` is a Saturday
/// or Sunday.
///
/// Assumes `start <= end`; a reversed range scans nothing and returns
/// false.
pub fn has_weekend_between(start: NaiveDate, end: NaiveDate) -> bool {
    let mut day = start;
    while day <= end {
        if matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            log::debug!("Weekend found on {day}");
            return true;
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    false
}

/// Compute the outgoing ship/delivery dates for one shipment.
///
/// The weekend scan covers the ship date and the transit days before the
/// naive delivery date (`lead_days` of them in total); a hit pads the lead
/// by two days. The delivery string then adds the padded lead to the ship
/// date's day component without carrying.
pub fn plan_delivery(raw_ship_date: &str, lead_days: i64) -> Result<DeliverySchedule> {
    let ship = parse_ship_date(raw_ship_date)?;
    let last_transit_day = ship + chrono::Duration::days(lead_days - 1);

    let lead_days = if has_weekend_between(ship, last_transit_day) {
        log::debug!(
            "Transit window {ship} through {last_transit_day} crosses a weekend, adding 2 days"
        );
        lead_days + 2
    } else {
        lead_days
    };

    Ok(DeliverySchedule {
        ship_date: format!("{:02}/{:02}/{:04}", ship.month(), ship.day(), ship.year()),
        delivery_date: format!(
            "{:02}/{:02}/{:04}",
            ship.month(),
            i64::from(ship.day()) + lead_days,
            ship.year()
        ),
        lead_days,
    })
}
