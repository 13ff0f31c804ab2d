//! Wall-clock times of day as used by programs and their entries.
//!
//! A [`ClockTime`] counts minutes since midnight. Derived entry times are
//! allowed to run past `24:00` (a program starting at `23:00` with a
//! three-hour block ends at `26:00`); only a program's own start time must
//! fall inside a single day.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::PlanError;

const MINUTES_PER_HOUR: u32 = 60;
const HOURS_PER_DAY: u32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(u32);

impl ClockTime {
    pub const MIDNIGHT: ClockTime = ClockTime(0);

    pub fn from_minutes(minutes: u32) -> Self {
        Self(minutes)
    }

    pub fn from_hm(hours: u32, minutes: u32) -> Self {
        Self(hours * MINUTES_PER_HOUR + minutes)
    }

    pub fn minutes(self) -> u32 {
        self.0
    }

    pub fn hours_part(self) -> u32 {
        self.0 / MINUTES_PER_HOUR
    }

    pub fn minutes_part(self) -> u32 {
        self.0 % MINUTES_PER_HOUR
    }

    /// Advances the clock. Saturates instead of overflowing.
    pub fn plus_minutes(self, minutes: u32) -> Self {
        Self(self.0.saturating_add(minutes))
    }

    /// Parses a program start time: exactly `HH:MM` with the hour inside
    /// one day. No padding, extra digits or seconds.
    pub fn parse_start(value: &str) -> Result<Self, PlanError> {
        let is_hh_mm = matches!(
            value.as_bytes(),
            [h1, h2, b':', m1, m2] if [h1, h2, m1, m2].iter().all(|b| b.is_ascii_digit())
        );
        if !is_hh_mm {
            return Err(PlanError::Validation(format!(
                "Invalid start time '{}', expected HH:MM",
                value
            )));
        }

        let time: ClockTime = value.parse()?;
        if time.hours_part() >= HOURS_PER_DAY {
            return Err(PlanError::Validation(format!(
                "Start time '{}' must be between 00:00 and 23:59",
                value
            )));
        }
        Ok(time)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hours_part(), self.minutes_part())
    }
}

/// Lenient parse: any non-negative hour count, minutes `00`-`59`.
/// A trailing `:SS` seconds component (as Postgres renders `TIME`) is
/// accepted when it is `00`.
impl FromStr for ClockTime {
    type Err = PlanError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || PlanError::Validation(format!("Invalid time '{}', expected HH:MM", value));

        let mut parts = value.trim().split(':');
        let hours = parts.next().ok_or_else(invalid)?;
        let minutes = parts.next().ok_or_else(invalid)?;
        if let Some(seconds) = parts.next() {
            if seconds != "00" {
                return Err(invalid());
            }
        }
        if parts.next().is_some() {
            return Err(invalid());
        }

        if hours.len() < 2 || minutes.len() != 2 {
            return Err(invalid());
        }
        if !hours.bytes().all(|b| b.is_ascii_digit()) || !minutes.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let hours: u32 = hours.parse().map_err(|_| invalid())?;
        let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
        if minutes >= MINUTES_PER_HOUR {
            return Err(invalid());
        }
        let total = hours
            .checked_mul(MINUTES_PER_HOUR)
            .and_then(|h| h.checked_add(minutes))
            .ok_or_else(invalid)?;

        Ok(Self(total))
    }
}

impl TryFrom<String> for ClockTime {
    type Error = PlanError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}
