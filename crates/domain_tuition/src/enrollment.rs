//! Roster read models
//!
//! Students and enrollments are owned by the roster subsystem; the tuition
//! domain only reads them. An enrollment snapshots the monthly fee at the
//! time the student joined the course, so later fee changes on the course
//! never reprice months already owed.

use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::{BillingMonth, EnrollmentId, Money, StudentId};
use serde::{Deserialize, Serialize};

/// A student as seen by the tuition domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    /// The admission date; the admission month counts as the first owed month
    pub admitted_on: NaiveDate,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Student {
    pub fn new(name: impl Into<String>, admitted_on: NaiveDate) -> Self {
        Self {
            id: StudentId::new_v7(),
            name: name.into(),
            admitted_on,
            active: true,
            created_at: Utc::now(),
        }
    }

    /// Returns the billing month the student was admitted in
    pub fn admission_month(&self) -> BillingMonth {
        BillingMonth::from_date(self.admitted_on)
    }
}

/// A student's membership in a course
///
/// `monthly_fee` is a snapshot taken at enrollment time and never changes
/// afterwards. Deactivating an enrollment stops future billing but leaves
/// all settlement history in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub student_id: StudentId,
    pub course_name: String,
    /// Display label for the batch time, e.g. "7:00 PM"
    pub time_slot: String,
    pub monthly_fee: Money,
    pub enrolled_on: NaiveDate,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Enrollment {
    pub fn new(
        student_id: StudentId,
        course_name: impl Into<String>,
        time_slot: impl Into<String>,
        monthly_fee: Money,
        enrolled_on: NaiveDate,
    ) -> Self {
        Self {
            id: EnrollmentId::new_v7(),
            student_id,
            course_name: course_name.into(),
            time_slot: time_slot.into(),
            monthly_fee,
            enrolled_on,
            active: true,
            created_at: Utc::now(),
        }
    }

    /// Returns the first month this enrollment owes tuition for
    pub fn start_month(&self) -> BillingMonth {
        BillingMonth::from_date(self.enrolled_on)
    }

    /// Marks the enrollment inactive without touching settlement history
    pub fn deactivate(&mut self) {
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn fee(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::BDT)
    }

    #[test]
    fn test_enrollment_start_month() {
        let enrollment = Enrollment::new(
            StudentId::new_v7(),
            "Physics",
            "7:00 PM",
            fee(dec!(500)),
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
        );

        assert_eq!(
            enrollment.start_month(),
            BillingMonth::new(2025, 0).unwrap()
        );
    }

    #[test]
    fn test_deactivate_keeps_fee_snapshot() {
        let mut enrollment = Enrollment::new(
            StudentId::new_v7(),
            "Chemistry",
            "5:00 PM",
            fee(dec!(800)),
            NaiveDate::from_ymd_opt(2024, 11, 1).unwrap(),
        );

        enrollment.deactivate();
        assert!(!enrollment.active);
        assert_eq!(enrollment.monthly_fee, fee(dec!(800)));
    }

    #[test]
    fn test_student_admission_month() {
        let student = Student::new("Rahim", NaiveDate::from_ymd_opt(2025, 3, 31).unwrap());
        assert_eq!(student.admission_month(), BillingMonth::new(2025, 2).unwrap());
    }
}
