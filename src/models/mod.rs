// src/models/mod.rs

//! Domain models for the ASN bot.

mod config;
mod leadtime;
mod shipment;

// Re-export all public types
pub use config::{Config, PathsConfig, SessionConfig, SurfaceConfig};
pub use leadtime::{LeadTimeEntry, LeadTimeTable};
pub use shipment::{ShipmentId, TrackingRow};
