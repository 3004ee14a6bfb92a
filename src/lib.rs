// src/lib.rs

//! ASN Bot Library
//!
//! Automates Vendor Central shipment confirmations: crawls the shipping
//! queue for a pickup date, walks each shipment through the ASN wizard,
//! and writes the extracted tracking report to disk.

pub mod automation;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod schedule;
pub mod services;
pub mod storage;

pub use error::{AppError, Result};
