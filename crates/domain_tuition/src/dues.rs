//! Dues calculation
//!
//! The dues engine answers "how much does this student owe right now".
//! The month a student enrolls counts as the first owed month, so a student
//! admitted on January 31st already owes January in full. Overpayment on one
//! enrollment never offsets another: the floor at zero is applied per
//! enrollment before summing.

use chrono::{Datelike, NaiveDate};
use core_kernel::{EnrollmentId, Money, StudentId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enrollment::Enrollment;
use crate::error::TuitionError;
use crate::settlement::Settlement;

/// Outstanding position of a single enrollment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentDue {
    pub enrollment_id: EnrollmentId,
    pub course_name: String,
    pub time_slot: String,
    pub monthly_fee: Money,
    /// Months elapsed since enrollment, admission month included
    pub months_owed: i64,
    pub outstanding: Money,
}

/// A student's dues across all active enrollments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuesReport {
    pub student_id: StudentId,
    pub total_due: Money,
    pub enrollments: Vec<EnrollmentDue>,
}

/// Pure dues arithmetic shared by the allocator, history, and statistics
pub struct DuesCalculator;

impl DuesCalculator {
    /// Months elapsed from `admitted_on` to `as_of`, inclusive of the
    /// admission month
    ///
    /// The result is signed; a future admission date yields zero or a
    /// negative count, which callers clamp.
    pub fn elapsed_months(admitted_on: NaiveDate, as_of: NaiveDate) -> i64 {
        let years = as_of.year() as i64 - admitted_on.year() as i64;
        let months = as_of.month0() as i64 - admitted_on.month0() as i64;
        years * 12 + months + 1
    }

    /// Months this enrollment owes as of the given date, never negative
    pub fn owed_months(enrollment: &Enrollment, as_of: NaiveDate) -> i64 {
        Self::elapsed_months(enrollment.enrolled_on, as_of).max(0)
    }

    /// Outstanding tuition for one enrollment, floored at zero
    ///
    /// `settlements` must be the rows of this enrollment only; advance rows
    /// count as credit against the term.
    pub fn enrollment_outstanding(
        enrollment: &Enrollment,
        settlements: &[Settlement],
        as_of: NaiveDate,
    ) -> Result<Money, TuitionError> {
        let currency = enrollment.monthly_fee.currency();
        let owed = enrollment
            .monthly_fee
            .multiply(Decimal::from(Self::owed_months(enrollment, as_of)));

        let mut paid = Money::zero(currency);
        let mut discount = Money::zero(currency);
        for row in settlements {
            if row.enrollment_id != enrollment.id {
                continue;
            }
            paid = paid.checked_add(&row.amount_paid)?;
            discount = discount.checked_add(&row.discount)?;
        }

        Ok(owed.saturating_sub(&paid)?.saturating_sub(&discount)?)
    }

    /// Dues report across a student's active enrollments
    ///
    /// Each enrollment is floored independently before summing, so advance
    /// credit on one course never hides arrears on another.
    pub fn student_dues(
        student_id: StudentId,
        enrollments: &[Enrollment],
        settlements: &[Settlement],
        as_of: NaiveDate,
        currency: core_kernel::Currency,
    ) -> Result<DuesReport, TuitionError> {
        let mut total = Money::zero(currency);
        let mut per_enrollment = Vec::with_capacity(enrollments.len());

        for enrollment in enrollments {
            let outstanding = Self::enrollment_outstanding(enrollment, settlements, as_of)?;
            total = total.checked_add(&outstanding)?;
            per_enrollment.push(EnrollmentDue {
                enrollment_id: enrollment.id,
                course_name: enrollment.course_name.clone(),
                time_slot: enrollment.time_slot.clone(),
                monthly_fee: enrollment.monthly_fee,
                months_owed: Self::owed_months(enrollment, as_of),
                outstanding,
            });
        }

        Ok(DuesReport {
            student_id,
            total_due: total,
            enrollments: per_enrollment,
        })
    }

    /// Shortfall of one student for the current month
    ///
    /// Sum of active enrollment fees minus what landed on current-month
    /// rows, floored at zero. Discounts do not reduce the shortfall.
    pub fn current_month_shortfall(
        enrollments: &[Enrollment],
        current_month_rows: &[Settlement],
        currency: core_kernel::Currency,
    ) -> Result<Money, TuitionError> {
        let mut fees = Money::zero(currency);
        for enrollment in enrollments {
            fees = fees.checked_add(&enrollment.monthly_fee)?;
        }

        let mut paid = Money::zero(currency);
        for row in current_month_rows {
            paid = paid.checked_add(&row.amount_paid)?;
        }

        Ok(fees.saturating_sub(&paid)?)
    }
}
