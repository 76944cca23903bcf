//! # Telemetry Module
//!
//! Normalizes raw modem telemetry into frames ready for upload.
//!
//! This module handles:
//! - LTE link events (registration, mode, cell, PSM, eDRX)
//! - GNSS fix solutions
//! - Decomposition into engineering units
//! - JSON encoding of frame snapshots

pub mod dummy;
pub mod encoder;
pub mod frame;
pub mod gnss;
pub mod lte;
pub mod units;

pub use dummy::DummyFrame;
pub use frame::{GnssFrame, LteFrame};
pub use gnss::{GnssEvent, GnssEventHandler, GnssNormalizer};
pub use lte::{LteEvent, LteEventHandler, LteNormalizer};
