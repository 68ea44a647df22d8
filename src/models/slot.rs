//! Slot windows.
//!
//! A slot label such as `"1:00-1:25"` resolves to an absolute minute
//! interval. Labels carry no AM/PM marker; the hour is taken literally,
//! so all labels of one grid must share a clock convention.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::validation::{ConfigError, ConfigErrorKind};

/// A slot interval [start, end) in minutes.
///
/// Half-open interval: includes start, excludes end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotWindow {
    /// Interval start (minutes, inclusive).
    pub start_minute: i64,
    /// Interval end (minutes, exclusive).
    pub end_minute: i64,
}

impl SlotWindow {
    /// Creates a new slot window.
    pub fn new(start_minute: i64, end_minute: i64) -> Self {
        Self {
            start_minute,
            end_minute,
        }
    }

    /// Duration of this window (minutes).
    #[inline]
    pub fn duration_minutes(&self) -> i64 {
        self.end_minute - self.start_minute
    }

    /// Whether two windows overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start_minute < other.end_minute && other.start_minute < self.end_minute
    }

    /// Whether `next` starts before this window ends plus `buffer_minutes`.
    ///
    /// This is the movement test: a visitor leaving this window cannot
    /// reach a meeting that starts inside the buffered end.
    #[inline]
    pub fn blocks(&self, next: &Self, buffer_minutes: u32) -> bool {
        next.start_minute < self.end_minute + i64::from(buffer_minutes)
    }
}

impl FromStr for SlotWindow {
    type Err = ConfigError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        let malformed = || {
            ConfigError::new(
                ConfigErrorKind::MalformedSlot,
                format!("slot label '{label}' is not of the form H:MM-H:MM"),
            )
        };
        let (start, end) = label.split_once('-').ok_or_else(malformed)?;
        let start = parse_clock(start).ok_or_else(malformed)?;
        let end = parse_clock(end).ok_or_else(malformed)?;
        Ok(Self::new(start, end))
    }
}

impl fmt::Display for SlotWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{:02}-{}:{:02}",
            self.start_minute / 60,
            self.start_minute % 60,
            self.end_minute / 60,
            self.end_minute % 60
        )
    }
}

fn parse_clock(text: &str) -> Option<i64> {
    let (hours, minutes) = text.trim().split_once(':')?;
    let hours: i64 = hours.trim().parse().ok()?;
    let minutes: i64 = minutes.trim().parse().ok()?;
    if hours < 0 || !(0..60).contains(&minutes) {
        return None;
    }
    Some(60 * hours + minutes)
}
