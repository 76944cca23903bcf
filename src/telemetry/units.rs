//! # Unit Decomposition
//!
//! Splits raw radio and positioning quantities into calendar-style fields.
//!
//! Every split uses cascading truncation: the largest unit is truncated
//! first and each smaller unit is computed from the remainder of the raw
//! value minus the larger units already extracted. Integer inputs use integer
//! division; real-valued inputs are truncated toward zero.
//!
//! ```
//! use cellular_logger::telemetry::units::{split_active_time, split_tau};
//!
//! let tau = split_tau(90_000);
//! assert_eq!((tau.day, tau.hour, tau.min, tau.sec), (1, 1, 0, 0));
//!
//! let at = split_active_time(125);
//! assert_eq!((at.hour, at.min, at.sec), (0, 2, 5));
//! ```

use super::frame::{ActiveTime, Coordinate, Direction, EdrxCycle, PagingWindow, TauInterval};

pub const SECONDS_PER_MINUTE: i32 = 60;
pub const SECONDS_PER_HOUR: i32 = 3_600;
pub const SECONDS_PER_DAY: i32 = 86_400;

/// Splits a non-negative periodic TAU (seconds) into days, hours, minutes
/// and seconds.
pub fn split_tau(tau: i32) -> TauInterval {
    let day = tau / SECONDS_PER_DAY;
    let hour = tau / SECONDS_PER_HOUR - 24 * day;
    let min = tau / SECONDS_PER_MINUTE - 1_440 * day - 60 * hour;
    let sec = tau - SECONDS_PER_DAY * day - SECONDS_PER_HOUR * hour - SECONDS_PER_MINUTE * min;

    TauInterval { day, hour, min, sec }
}

/// Splits a non-negative PSM active time (seconds) into hours, minutes and
/// seconds. There is no day term, so `hour` is unbounded.
pub fn split_active_time(active_time: i32) -> ActiveTime {
    let hour = active_time / SECONDS_PER_HOUR;
    let min = active_time / SECONDS_PER_MINUTE - 60 * hour;
    let sec = active_time - SECONDS_PER_HOUR * hour - SECONDS_PER_MINUTE * min;

    ActiveTime { hour, min, sec }
}

/// Splits an eDRX cycle length (fractional seconds) into hours, minutes,
/// seconds and milliseconds.
///
/// Arithmetic stays in `f32`, the precision the modem reports the value in.
pub fn split_edrx(edrx: f32) -> EdrxCycle {
    let hour = (edrx / 3_600.0) as i32;
    let min = (edrx / 60.0 - 60.0 * hour as f32) as i32;
    let sec = (edrx - 3_600.0 * hour as f32 - 60.0 * min as f32) as i32;
    let msec = (1_000.0 * edrx
        - 3_600_000.0 * hour as f32
        - 60_000.0 * min as f32
        - 1_000.0 * sec as f32) as i32;

    EdrxCycle { hour, min, sec, msec }
}

/// Splits a paging time window (fractional seconds) into seconds and
/// milliseconds.
pub fn split_ptw(ptw: f32) -> PagingWindow {
    let sec = ptw as i32;
    let msec = (1_000.0 * ptw - 1_000.0 * sec as f32) as i32;

    PagingWindow { sec, msec }
}

/// Splits a decimal-degree value into degrees, minutes, seconds and
/// milliseconds of arc.
///
/// The magnitude of `degrees` is decomposed; the sign is expressed only
/// through `dir`, which the caller picks.
pub fn split_degrees(degrees: f64, dir: Direction) -> Coordinate {
    let value = degrees.abs();

    let deg = value as i32;
    let min = (60.0 * value - 60.0 * deg as f64) as i32;
    let sec = (3_600.0 * value - 3_600.0 * deg as f64 - 60.0 * min as f64) as i32;
    let msec = (3_600_000.0 * value
        - 3_600_000.0 * deg as f64
        - 60_000.0 * min as f64
        - 1_000.0 * sec as f64) as i32;

    Coordinate { dir, deg, min, sec, msec }
}
