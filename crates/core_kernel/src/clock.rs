//! Campus-local time source
//!
//! Dues are computed against the calendar date at the campus, not at the
//! server. The clock owns the campus timezone and answers "what month is
//! it" in local terms. A clock can be pinned to a fixed date so that
//! month-sensitive logic stays deterministic under test.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use std::str::FromStr;
use thiserror::Error;

use crate::month::BillingMonth;

/// Errors from clock construction
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClockError {
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
}

/// A timezone-aware source of the current campus date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CampusClock {
    tz: Tz,
    pinned: Option<NaiveDate>,
}

impl CampusClock {
    /// Creates a clock reading the system time in the given timezone
    pub fn new(tz: Tz) -> Self {
        Self { tz, pinned: None }
    }

    /// Creates a clock from an IANA timezone name, e.g. "Asia/Dhaka"
    pub fn from_name(name: &str) -> Result<Self, ClockError> {
        Tz::from_str(name)
            .map(Self::new)
            .map_err(|_| ClockError::UnknownTimezone(name.to_string()))
    }

    /// Creates a clock pinned to a fixed local date
    pub fn fixed(tz: Tz, date: NaiveDate) -> Self {
        Self {
            tz,
            pinned: Some(date),
        }
    }

    /// Returns the campus timezone
    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Returns the current date at the campus
    pub fn today(&self) -> NaiveDate {
        match self.pinned {
            Some(date) => date,
            None => Utc::now().with_timezone(&self.tz).date_naive(),
        }
    }

    /// Returns the billing month containing today
    pub fn current_month(&self) -> BillingMonth {
        BillingMonth::from_date(self.today())
    }

    /// Returns the current instant for record timestamps
    pub fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl Default for CampusClock {
    fn default() -> Self {
        Self::new(chrono_tz::Asia::Dhaka)
    }
}
