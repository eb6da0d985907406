//! Billing month arithmetic
//!
//! A tuition cycle is addressed by calendar month, not by day. This module
//! provides a compact (year, month) value with zero-based month ordinals,
//! total ordering, and the range walks the dues engine is built on.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// English month names indexed by zero-based ordinal
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Looks up the display name for a zero-based month ordinal
pub fn month_name(month: u32) -> Option<&'static str> {
    MONTH_NAMES.get(month as usize).copied()
}

/// Errors from billing month construction
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MonthError {
    #[error("Month ordinal out of range: {0} (expected 0..=11)")]
    OrdinalOutOfRange(u32),
}

/// A calendar month in a specific year
///
/// The month ordinal is zero-based (0 = January, 11 = December). Ordering
/// is chronological, which for the derived lexicographic order of
/// (year, month) is the same thing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct BillingMonth {
    year: i32,
    month: u32,
}

impl BillingMonth {
    /// Creates a billing month, rejecting out-of-range ordinals
    pub fn new(year: i32, month: u32) -> Result<Self, MonthError> {
        if month > 11 {
            return Err(MonthError::OrdinalOutOfRange(month));
        }
        Ok(Self { year, month })
    }

    /// Returns the billing month containing the given date
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month0(),
        }
    }

    /// Returns the year
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Returns the zero-based month ordinal
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Returns the linearized month index (year * 12 + month)
    ///
    /// Differences of indexes count the months between two billing months.
    pub fn index(&self) -> i64 {
        self.year as i64 * 12 + self.month as i64
    }

    /// Rebuilds a billing month from its linearized index
    pub fn from_index(index: i64) -> Self {
        Self {
            year: index.div_euclid(12) as i32,
            month: index.rem_euclid(12) as u32,
        }
    }

    /// Returns the following month, rolling December into January
    pub fn next(&self) -> Self {
        if self.month == 11 {
            Self {
                year: self.year + 1,
                month: 0,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Walks the inclusive range of months from `from` to `to`
    ///
    /// Returns an empty vector when `from` is after `to`.
    pub fn range(from: BillingMonth, to: BillingMonth) -> Vec<BillingMonth> {
        if from > to {
            return Vec::new();
        }
        let mut months = Vec::with_capacity((to.index() - from.index() + 1) as usize);
        let mut current = from;
        while current <= to {
            months.push(current);
            current = current.next();
        }
        months
    }

    /// Returns the English month name
    pub fn name(&self) -> &'static str {
        MONTH_NAMES[self.month as usize]
    }

    /// Returns the display label, e.g. "January 2025"
    pub fn label(&self) -> String {
        format!("{} {}", self.name(), self.year)
    }

    /// Returns the first day of the month
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
            .expect("month ordinal is validated at construction")
    }

    /// Returns the date tuition for this month falls due (the 5th)
    pub fn due_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month + 1, 5)
            .expect("month ordinal is validated at construction")
    }
}

impl fmt::Display for BillingMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_month() -> impl Strategy<Value = BillingMonth> {
        (2000i32..2100, 0u32..12).prop_map(|(y, m)| BillingMonth::new(y, m).unwrap())
    }

    proptest! {
        #[test]
        fn range_length_matches_index_distance(
            from in arb_month(),
            span in 0i64..60
        ) {
            let mut to = from;
            for _ in 0..span {
                to = to.next();
            }
            let months = BillingMonth::range(from, to);
            prop_assert_eq!(months.len() as i64, span + 1);
            prop_assert_eq!(to.index() - from.index(), span);
        }

        #[test]
        fn range_is_contiguous_and_ordered(from in arb_month(), span in 0i64..60) {
            let mut to = from;
            for _ in 0..span {
                to = to.next();
            }
            let months = BillingMonth::range(from, to);
            for pair in months.windows(2) {
                prop_assert_eq!(pair[0].next(), pair[1]);
                prop_assert!(pair[0] < pair[1]);
            }
        }

        #[test]
        fn next_advances_index_by_one(m in arb_month()) {
            prop_assert_eq!(m.next().index(), m.index() + 1);
        }

        #[test]
        fn index_round_trips(m in arb_month()) {
            prop_assert_eq!(BillingMonth::from_index(m.index()), m);
        }
    }
}
