//! # Modem Module
//!
//! Boundary to the cellular modem and its GNSS receiver.
//!
//! This module handles:
//! - The [`Modem`] trait the application drives
//! - LTE and GNSS activation sequences
//! - A simulated modem producing scripted events

pub mod gnss;
pub mod lte;
pub mod simulated;

use std::sync::Arc;

use crate::error::Result;
use crate::telemetry::{GnssEventHandler, LteEventHandler};

pub use simulated::SimulatedModem;

/// Modem functional mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuncMode {
    /// Radio off, settings may be changed
    PowerOff,
    /// LTE radio on
    ActivateLte,
    /// GNSS receiver on
    ActivateGnss,
}

/// Operations the application needs from the modem.
///
/// Handlers are invoked from the modem's own event context, never from the
/// caller of these methods.
#[cfg_attr(test, mockall::automock)]
pub trait Modem: Send {
    /// Initializes the modem library.
    fn init(&mut self) -> Result<()>;

    /// Shuts the modem library down and stops event delivery.
    fn deinit(&mut self) -> Result<()>;

    fn set_func_mode(&mut self, mode: FuncMode) -> Result<()>;

    /// Requests or disables power saving mode.
    fn request_psm(&mut self, enable: bool) -> Result<()>;

    /// Requests or disables extended discontinuous reception.
    fn request_edrx(&mut self, enable: bool) -> Result<()>;

    fn register_lte_handler(&mut self, handler: Arc<dyn LteEventHandler>) -> Result<()>;

    /// Seconds between fixes, zero for a single fix.
    fn set_gnss_fix_interval(&mut self, seconds: u16) -> Result<()>;

    /// Seconds allowed per fix attempt, zero for no limit.
    fn set_gnss_fix_retry(&mut self, seconds: u16) -> Result<()>;

    fn register_gnss_handler(&mut self, handler: Arc<dyn GnssEventHandler>) -> Result<()>;

    fn start_gnss(&mut self) -> Result<()>;

    fn stop_gnss(&mut self) -> Result<()>;
}
