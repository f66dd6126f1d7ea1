//! Minute-precision wall-clock times for same-day bookings.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::DeskError;

/// Time of day as minutes since midnight, written as `HH:MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(u16);

impl ClockTime {
    pub const MINUTES_PER_DAY: u16 = 24 * 60;

    pub fn from_hm(hour: u16, minute: u16) -> Result<Self, DeskError> {
        if hour > 23 || minute > 59 {
            return Err(DeskError::validation(format!(
                "invalid time {:02}:{:02}",
                hour, minute
            )));
        }
        Ok(Self(hour * 60 + minute))
    }

    pub fn minutes(&self) -> u16 {
        self.0
    }

    pub fn hour(&self) -> u16 {
        self.0 / 60
    }

    pub fn minute(&self) -> u16 {
        self.0 % 60
    }
}

impl FromStr for ClockTime {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || DeskError::validation(format!("time '{}' is not HH:MM", s));
        let (h, m) = s.trim().split_once(':').ok_or_else(bad)?;
        let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if h.is_empty() || h.len() > 2 || m.len() != 2 || !digits(h) || !digits(m) {
            return Err(bad());
        }
        let hour: u16 = h.parse().map_err(|_| bad())?;
        let minute: u16 = m.parse().map_err(|_| bad())?;
        Self::from_hm(hour, minute)
    }
}

impl std::fmt::Display for ClockTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl TryFrom<String> for ClockTime {
    type Error = DeskError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

/// Daily window in which meetings may be booked (inclusive bounds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHours {
    pub start: ClockTime,
    pub end: ClockTime,
}

impl WorkingHours {
    pub fn new(start: ClockTime, end: ClockTime) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, start: ClockTime, end: ClockTime) -> bool {
        start >= self.start && end <= self.end
    }
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self {
            start: ClockTime(7 * 60),
            end: ClockTime(17 * 60),
        }
    }
}
