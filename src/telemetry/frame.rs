//! # Telemetry Frames
//!
//! Structured snapshots of the latest known LTE and GNSS telemetry.
//!
//! A frame is a set of independently valid sections. Sections are updated
//! one at a time by the normalizers and a frame is never replaced wholesale,
//! so a reader always sees the newest value of every section regardless of
//! which one changed last.
//!
//! Field names serialize to the JSON keys expected by the upload server
//! (`days`, `hours`, `milliseconds`, `latitude`, ...).

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt;

/// LTE network mode as reported by the modem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum NetworkMode {
    /// No active mode
    #[default]
    #[serde(rename = "")]
    None,
    /// LTE Cat-M1
    #[serde(rename = "LTE-M")]
    LteM,
    /// Narrowband IoT
    #[serde(rename = "NB-IoT")]
    NbIot,
}

impl NetworkMode {
    /// Wire representation, empty for [`NetworkMode::None`].
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkMode::None => "",
            NetworkMode::LteM => "LTE-M",
            NetworkMode::NbIot => "NB-IoT",
        }
    }
}

impl fmt::Display for NetworkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hemisphere of a coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Direction {
    #[default]
    #[serde(rename = "")]
    Unknown,
    #[serde(rename = "N")]
    North,
    #[serde(rename = "S")]
    South,
    #[serde(rename = "E")]
    East,
    #[serde(rename = "W")]
    West,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Unknown => "",
            Direction::North => "N",
            Direction::South => "S",
            Direction::East => "E",
            Direction::West => "W",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// LTE
// ---------------------------------------------------------------------------

/// Complete LTE link state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LteFrame {
    pub mode: ModeSection,
    pub cell: CellSection,
    pub psm: PsmSection,
    pub edrx: EdrxSection,
}

/// Active network mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ModeSection {
    pub valid: bool,
    pub mode: NetworkMode,
}

/// Serving cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CellSection {
    pub valid: bool,
    /// E-UTRAN cell ID
    pub id: i32,
    /// Tracking area code
    pub tac: i32,
}

/// Power Saving Mode parameters granted by the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PsmSection {
    pub valid: bool,
    /// Periodic tracking area update interval
    pub tau: TauInterval,
    /// Active time window
    pub at: ActiveTime,
}

/// Day-based split of the periodic TAU interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TauInterval {
    #[serde(rename = "days")]
    pub day: i32,
    #[serde(rename = "hours")]
    pub hour: i32,
    #[serde(rename = "minutes")]
    pub min: i32,
    #[serde(rename = "seconds")]
    pub sec: i32,
}

/// Hour-based split of the PSM active time. `hour` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ActiveTime {
    #[serde(rename = "hours")]
    pub hour: i32,
    #[serde(rename = "minutes")]
    pub min: i32,
    #[serde(rename = "seconds")]
    pub sec: i32,
}

/// Extended DRX parameters granted by the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct EdrxSection {
    pub valid: bool,
    pub mode: NetworkMode,
    /// eDRX cycle length
    pub edrx: EdrxCycle,
    /// Paging time window
    pub ptw: PagingWindow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct EdrxCycle {
    #[serde(rename = "hours")]
    pub hour: i32,
    #[serde(rename = "minutes")]
    pub min: i32,
    #[serde(rename = "seconds")]
    pub sec: i32,
    #[serde(rename = "milliseconds")]
    pub msec: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PagingWindow {
    #[serde(rename = "seconds")]
    pub sec: i32,
    #[serde(rename = "milliseconds")]
    pub msec: i32,
}

// ---------------------------------------------------------------------------
// GNSS
// ---------------------------------------------------------------------------

/// Latest GNSS fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct GnssFrame {
    pub location: LocationSection,
    pub date: DateSection,
    pub time: TimeSection,
}

/// Position in degrees, minutes, seconds and milliseconds of arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LocationSection {
    pub valid: bool,
    #[serde(rename = "latitude")]
    pub lat: Coordinate,
    #[serde(rename = "longitude")]
    pub lon: Coordinate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Coordinate {
    #[serde(rename = "direction")]
    pub dir: Direction,
    #[serde(rename = "degrees")]
    pub deg: i32,
    #[serde(rename = "minutes")]
    pub min: i32,
    #[serde(rename = "seconds")]
    pub sec: i32,
    #[serde(rename = "milliseconds")]
    pub msec: i32,
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}°{}'{}.{:03}\"{}",
            self.deg, self.min, self.sec, self.msec, self.dir
        )
    }
}

/// UTC date of the fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DateSection {
    pub valid: bool,
    pub year: i32,
    pub month: i32,
    pub day: i32,
}

/// UTC time of the fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TimeSection {
    pub valid: bool,
    pub hour: i32,
    #[serde(rename = "minute")]
    pub min: i32,
    #[serde(rename = "second")]
    pub sec: i32,
    #[serde(rename = "millisecond")]
    pub msec: i32,
}

impl GnssFrame {
    /// Combined UTC timestamp of the fix.
    ///
    /// `None` unless both the date and time sections are valid and describe a
    /// real calendar instant.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        if !self.date.valid || !self.time.valid {
            return None;
        }

        let date = NaiveDate::from_ymd_opt(
            self.date.year,
            u32::try_from(self.date.month).ok()?,
            u32::try_from(self.date.day).ok()?,
        )?;

        date.and_hms_milli_opt(
            u32::try_from(self.time.hour).ok()?,
            u32::try_from(self.time.min).ok()?,
            u32::try_from(self.time.sec).ok()?,
            u32::try_from(self.time.msec).ok()?,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_lte_frame_starts_invalid_and_zeroed() {
        let frame = LteFrame::default();
        assert!(!frame.mode.valid);
        assert_eq!(frame.mode.mode, NetworkMode::None);
        assert!(!frame.cell.valid);
        assert_eq!((frame.cell.id, frame.cell.tac), (0, 0));
        assert!(!frame.psm.valid);
        assert_eq!(frame.psm.tau, TauInterval::default());
        assert!(!frame.edrx.valid);
        assert_eq!(frame.edrx.ptw, PagingWindow::default());
    }

    #[test]
    fn test_gnss_frame_starts_invalid_and_zeroed() {
        let frame = GnssFrame::default();
        assert!(!frame.location.valid);
        assert_eq!(frame.location.lat.dir, Direction::Unknown);
        assert!(!frame.date.valid);
        assert!(!frame.time.valid);
        assert_eq!(frame.timestamp(), None);
    }

    #[test]
    fn test_network_mode_strings() {
        assert_eq!(NetworkMode::None.as_str(), "");
        assert_eq!(NetworkMode::LteM.to_string(), "LTE-M");
        assert_eq!(NetworkMode::NbIot.to_string(), "NB-IoT");
    }

    #[test]
    fn test_coordinate_display() {
        let coord = Coordinate {
            dir: Direction::South,
            deg: 33,
            min: 52,
            sec: 7,
            msec: 68,
        };
        assert_eq!(coord.to_string(), "33°52'7.068\"S");
    }

    #[test]
    fn test_timestamp_from_valid_sections() {
        let mut frame = GnssFrame::default();
        frame.date = DateSection { valid: true, year: 2024, month: 3, day: 14 };
        frame.time = TimeSection { valid: true, hour: 9, min: 26, sec: 53, msec: 589 };

        let ts = frame.timestamp().expect("valid timestamp");
        assert_eq!((ts.year(), ts.month(), ts.day()), (2024, 3, 14));
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (9, 26, 53));
        assert_eq!(ts.nanosecond(), 589_000_000);
    }

    #[test]
    fn test_timestamp_rejects_out_of_range_date() {
        let mut frame = GnssFrame::default();
        frame.date = DateSection { valid: true, year: 2024, month: 13, day: 1 };
        frame.time = TimeSection { valid: true, hour: 0, min: 0, sec: 0, msec: 0 };
        assert_eq!(frame.timestamp(), None);
    }

    #[test]
    fn test_timestamp_requires_valid_time() {
        let mut frame = GnssFrame::default();
        frame.date = DateSection { valid: true, year: 2024, month: 1, day: 1 };
        assert_eq!(frame.timestamp(), None);
    }
}
