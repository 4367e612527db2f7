//! Timestamp scale resolution
//!
//! Block timestamps are stored as an integer count of some unit since the Unix
//! epoch, the unit being given by a separate scale code (the protobuf-net
//! `TimeSpanScale` table).
use chrono::{DateTime, Utc};

use crate::{Error, Result};

/// `ctime(3)` layout, e.g. `Sat Mar 25 14:03:00 2017`
const CTIME_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// Unit of a stored timestamp value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimeScale {
    #[default]
    Days,
    Hours,
    Minutes,
    Seconds,
    Milliseconds,
    /// 100 ns units
    Ticks,
}

impl TimeScale {
    /// Map a wire scale code to a unit
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            0 => Ok(TimeScale::Days),
            1 => Ok(TimeScale::Hours),
            2 => Ok(TimeScale::Minutes),
            3 => Ok(TimeScale::Seconds),
            4 => Ok(TimeScale::Milliseconds),
            5 => Ok(TimeScale::Ticks),
            other => Err(Error::UnsupportedTimestampUnit(other)),
        }
    }

    /// Multiplier turning a stored value into seconds
    pub fn seconds_per_unit(self) -> f64 {
        match self {
            TimeScale::Days => 86_400.0,
            TimeScale::Hours => 3_600.0,
            TimeScale::Minutes => 60.0,
            TimeScale::Seconds => 1.0,
            TimeScale::Milliseconds => 1.0 / 1_000.0,
            TimeScale::Ticks => 1.0 / 10_000_000.0,
        }
    }
}

/// Resolve a wire scale code straight to its seconds multiplier
pub fn resolve_scale(code: i32) -> Result<f64> {
    TimeScale::from_code(code).map(TimeScale::seconds_per_unit)
}

/// A stored timestamp: `value` units of `scale` since 1970-01-01 UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timestamp {
    pub value: i64,
    pub scale: TimeScale,
}

impl Timestamp {
    pub fn new(value: i64, scale: TimeScale) -> Self {
        Self { value, scale }
    }

    /// Seconds since the Unix epoch
    pub fn epoch_seconds(&self) -> f64 {
        let value = self.value as f64;
        // divide for sub-second units so whole seconds stay exact
        match self.scale {
            TimeScale::Milliseconds => value / 1_000.0,
            TimeScale::Ticks => value / 10_000_000.0,
            scale => value * scale.seconds_per_unit(),
        }
    }

    /// UTC instant, `None` when outside chrono's representable range
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        let seconds = self.epoch_seconds();
        if !seconds.is_finite() {
            return None;
        }
        let whole = seconds.floor();
        let nanos = ((seconds - whole) * 1e9).round().min(999_999_999.0) as u32;
        DateTime::<Utc>::from_timestamp(whole as i64, nanos)
    }

    /// Human-readable UTC rendering in `ctime` layout
    pub fn format_ctime(&self) -> String {
        format_epoch_seconds(self.epoch_seconds())
    }
}

/// Render epoch seconds in `ctime` layout, falling back to the raw number
pub fn format_epoch_seconds(seconds: f64) -> String {
    if !seconds.is_finite() {
        return format!("{seconds}");
    }
    match DateTime::<Utc>::from_timestamp(seconds.floor() as i64, 0) {
        Some(dt) => dt.format(CTIME_FORMAT).to_string(),
        None => format!("{seconds}"),
    }
}
