//! # GNSS Telemetry Normalizer
//!
//! Turns PVT (position, velocity, time) notifications into a [`GnssFrame`].
//!
//! Only fix-valid solutions touch the frame: location, date and time are
//! marked valid together and the data mailbox is signaled. A solution that
//! could not be read is logged and dropped, leaving the previous fix and the
//! mailbox as they were. Unlike the LTE path, no invalidated frame is
//! delivered to the consumer.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

use super::frame::{DateSection, Direction, GnssFrame, LocationSection, TimeSection};
use super::units::split_degrees;
use crate::error::Result;
use crate::sync::Mailbox;

/// UTC date and time of a solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PvtDateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub seconds: u8,
    pub ms: u16,
}

/// Position-velocity-time solution from the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PvtSolution {
    /// Latitude in decimal degrees, negative south
    pub latitude: f64,
    /// Longitude in decimal degrees, negative west
    pub longitude: f64,
    pub datetime: PvtDateTime,
    /// Receiver reports a valid fix
    pub fix_valid: bool,
}

/// Failure to read a solution out of the receiver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to read PVT solution: {0}")]
pub struct PvtReadError(pub String);

/// Receiver notifications.
#[derive(Debug, Clone, PartialEq)]
pub enum GnssEvent {
    /// A solution is ready; carries the result of reading it
    Pvt(std::result::Result<PvtSolution, PvtReadError>),
    /// Any other receiver event, identified by its raw kind
    Other(u32),
}

/// Receiver of GNSS events, registered with the modem.
///
/// Called from the modem's event context; must not block.
pub trait GnssEventHandler: Send + Sync {
    fn handle_gnss_event(&self, event: &GnssEvent);
}

/// Resident GNSS frame plus its data mailbox.
#[derive(Debug, Default)]
pub struct GnssNormalizer {
    data: Mailbox<GnssFrame>,
    frame: Mutex<GnssFrame>,
}

impl GnssNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-blocking check for an unread fix.
    pub fn data_available(&self) -> bool {
        self.data.is_available()
    }

    /// Blocks until an unread fix exists or `timeout` elapses.
    pub fn wait_data(&self, timeout: Duration) -> Result<()> {
        if !self.data.is_available() {
            info!("Waiting for GNSS data updates");
        }
        self.data.wait(timeout)
    }

    /// Returns a copy of the frame and marks the fix as read.
    pub fn read(&self) -> GnssFrame {
        self.data.take()
    }

    /// Returns a copy of the resident frame without touching availability.
    pub fn frame(&self) -> GnssFrame {
        *self.lock_frame()
    }

    fn lock_frame(&self) -> MutexGuard<'_, GnssFrame> {
        self.frame.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn on_fix(&self, pvt: &PvtSolution) {
        let (location, date, time) = fix_sections(pvt);

        // Availability lock first (inside signal_with), frame lock second.
        self.data.signal_with(|| {
            let mut frame = self.lock_frame();
            frame.location = location;
            frame.date = date;
            frame.time = time;
            *frame
        });

        info!(
            "Obtained GNSS fix: {} {} {:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:03}",
            location.lat,
            location.lon,
            date.year,
            date.month,
            date.day,
            time.hour,
            time.min,
            time.sec,
            time.msec
        );
    }
}

impl GnssEventHandler for GnssNormalizer {
    fn handle_gnss_event(&self, event: &GnssEvent) {
        match event {
            GnssEvent::Pvt(Ok(pvt)) if pvt.fix_valid => self.on_fix(pvt),
            GnssEvent::Pvt(Ok(_)) => debug!("PVT solution without valid fix"),
            GnssEvent::Pvt(Err(e)) => error!("Failed to parse GNSS fix ({})", e),
            GnssEvent::Other(kind) => debug!("Ignoring GNSS event {}", kind),
        }
    }
}

/// Location, date and time sections for a fix-valid solution.
pub fn fix_sections(pvt: &PvtSolution) -> (LocationSection, DateSection, TimeSection) {
    let lat_dir = if pvt.latitude < 0.0 { Direction::South } else { Direction::North };
    let lon_dir = if pvt.longitude < 0.0 { Direction::West } else { Direction::East };

    let location = LocationSection {
        valid: true,
        lat: split_degrees(pvt.latitude, lat_dir),
        lon: split_degrees(pvt.longitude, lon_dir),
    };

    let dt = pvt.datetime;
    let date = DateSection {
        valid: true,
        year: i32::from(dt.year),
        month: i32::from(dt.month),
        day: i32::from(dt.day),
    };
    let time = TimeSection {
        valid: true,
        hour: i32::from(dt.hour),
        min: i32::from(dt.minute),
        sec: i32::from(dt.seconds),
        msec: i32::from(dt.ms),
    };

    (location, date, time)
}
