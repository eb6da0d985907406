//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible defaults.
//! These builders allow tests to specify only the relevant fields while using
//! defaults for everything else. They produce real domain entities, so anything
//! built here can be saved straight into a test store.

use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::{BillingMonth, EnrollmentId, Money, StudentId};
use domain_tuition::{Enrollment, PaymentMethod, Settlement, Student};
use rust_decimal_macros::dec;

use crate::fixtures::{CalendarFixtures, IdFixtures, MoneyFixtures, StringFixtures};

/// Builder for constructing test students
pub struct StudentBuilder {
    id: Option<StudentId>,
    name: String,
    admitted_on: NaiveDate,
    active: bool,
}

impl Default for StudentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StudentBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            id: None,
            name: StringFixtures::student_name().to_string(),
            admitted_on: CalendarFixtures::enrollment_day(),
            active: true,
        }
    }

    /// Sets the student ID
    pub fn with_id(mut self, id: StudentId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the student name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the admission date
    pub fn with_admitted_on(mut self, date: NaiveDate) -> Self {
        self.admitted_on = date;
        self
    }

    /// Marks the student as inactive
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Builds the student
    pub fn build(self) -> Student {
        let mut student = Student::new(self.name, self.admitted_on);
        if let Some(id) = self.id {
            student.id = id;
        }
        student.active = self.active;
        student
    }
}

/// Builder for constructing test enrollments
pub struct EnrollmentBuilder {
    id: Option<EnrollmentId>,
    student_id: StudentId,
    course_name: String,
    time_slot: String,
    monthly_fee: Money,
    enrolled_on: NaiveDate,
    active: bool,
}

impl Default for EnrollmentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EnrollmentBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            id: None,
            student_id: IdFixtures::student_id(),
            course_name: StringFixtures::course_name().to_string(),
            time_slot: StringFixtures::time_slot().to_string(),
            monthly_fee: MoneyFixtures::monthly_fee(),
            enrolled_on: CalendarFixtures::enrollment_day(),
            active: true,
        }
    }

    /// Sets the enrollment ID
    pub fn with_id(mut self, id: EnrollmentId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the owning student
    pub fn with_student_id(mut self, id: StudentId) -> Self {
        self.student_id = id;
        self
    }

    /// Sets the course name
    pub fn with_course_name(mut self, name: impl Into<String>) -> Self {
        self.course_name = name.into();
        self
    }

    /// Sets the batch time slot
    pub fn with_time_slot(mut self, slot: impl Into<String>) -> Self {
        self.time_slot = slot.into();
        self
    }

    /// Sets the monthly fee
    pub fn with_monthly_fee(mut self, fee: Money) -> Self {
        self.monthly_fee = fee;
        self
    }

    /// Sets the enrollment date
    pub fn with_enrolled_on(mut self, date: NaiveDate) -> Self {
        self.enrolled_on = date;
        self
    }

    /// Marks the enrollment as inactive
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Builds the standard evening Physics enrollment
    pub fn physics() -> Self {
        Self::new()
    }

    /// Builds an afternoon Chemistry enrollment with a higher fee
    pub fn chemistry() -> Self {
        Self::new()
            .with_course_name(StringFixtures::second_course_name())
            .with_time_slot(StringFixtures::second_time_slot())
            .with_monthly_fee(Money::new(dec!(800), MoneyFixtures::monthly_fee().currency()))
    }

    /// Builds the enrollment
    pub fn build(self) -> Enrollment {
        let mut enrollment = Enrollment::new(
            self.student_id,
            self.course_name,
            self.time_slot,
            self.monthly_fee,
            self.enrolled_on,
        );
        if let Some(id) = self.id {
            enrollment.id = id;
        }
        enrollment.active = self.active;
        enrollment
    }
}

/// Builder for constructing settlement rows
pub struct SettlementBuilder {
    student_id: StudentId,
    enrollment_id: EnrollmentId,
    month: BillingMonth,
    fee: Money,
    paid: Money,
    discount: Money,
    method: Option<PaymentMethod>,
    transaction_ref: Option<String>,
    notes: Option<String>,
    paid_at: DateTime<Utc>,
}

impl Default for SettlementBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SettlementBuilder {
    /// Creates a new builder describing an untouched month
    pub fn new() -> Self {
        let fee = MoneyFixtures::monthly_fee();
        Self {
            student_id: IdFixtures::student_id(),
            enrollment_id: IdFixtures::enrollment_id(),
            month: CalendarFixtures::january(),
            fee,
            paid: Money::zero(fee.currency()),
            discount: Money::zero(fee.currency()),
            method: None,
            transaction_ref: None,
            notes: None,
            paid_at: CalendarFixtures::payment_instant(),
        }
    }

    /// Sets the student and enrollment the row belongs to
    pub fn with_keys(mut self, student_id: StudentId, enrollment_id: EnrollmentId) -> Self {
        self.student_id = student_id;
        self.enrollment_id = enrollment_id;
        self
    }

    /// Sets the billed month
    pub fn with_month(mut self, month: BillingMonth) -> Self {
        self.month = month;
        self
    }

    /// Sets the fee the month was billed at
    pub fn with_fee(mut self, fee: Money) -> Self {
        self.fee = fee;
        self
    }

    /// Sets the amount already received
    pub fn with_paid(mut self, paid: Money) -> Self {
        self.paid = paid;
        self
    }

    /// Sets the discount already granted
    pub fn with_discount(mut self, discount: Money) -> Self {
        self.discount = discount;
        self
    }

    /// Sets the payment method
    pub fn with_method(mut self, method: PaymentMethod) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the transaction reference
    pub fn with_transaction_ref(mut self, reference: impl Into<String>) -> Self {
        self.transaction_ref = Some(reference.into());
        self
    }

    /// Sets the payment note
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Sets the payment timestamp
    pub fn with_paid_at(mut self, at: DateTime<Utc>) -> Self {
        self.paid_at = at;
        self
    }

    /// Builds a row whose fee is fully settled
    pub fn paid() -> Self {
        let builder = Self::new();
        let fee = builder.fee;
        builder.with_paid(fee)
    }

    /// Builds a row with a 200 payment against the standard fee
    pub fn partial() -> Self {
        let builder = Self::new();
        let currency = builder.fee.currency();
        builder.with_paid(Money::new(dec!(200), currency))
    }

    /// Builds the settlement row
    pub fn build(self) -> Settlement {
        let mut row = Settlement::unpaid(self.student_id, self.enrollment_id, self.month, self.fee);
        if self.discount.is_positive() {
            row.add_discount(self.discount).unwrap();
        }
        if self.paid.is_positive() {
            row.receive(self.paid, self.paid_at).unwrap();
        }
        row.attach_payment_details(self.method, self.transaction_ref, self.notes);
        row
    }
}
