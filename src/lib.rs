//! # Cellular Logger Library
//!
//! Logs LTE link parameters and GNSS fixes from a cellular modem and uploads
//! them as JSON to a REST server.
//!
//! The core is a pair of normalizers that turn modem events into resident
//! frames, handing them to the application through single-slot mailboxes.

pub mod app;
pub mod config;
pub mod error;
pub mod modem;
pub mod rest;
pub mod sync;
pub mod telemetry;
