//! In-Memory Backend Test Utilities
//!
//! Provides a fully wired tuition backend over the in-memory store so
//! workflow tests can enroll students, collect payments, and inspect the
//! resulting ledger without any external infrastructure.

use std::sync::Arc;

use chrono::NaiveDate;
use chrono_tz::Tz;
use core_kernel::{CampusClock, Currency, Money};
use domain_tuition::{
    CollectPaymentCommand, Enrollment, PaymentCollected, PaymentMethod, StatisticsAggregator,
    Student, TuitionError, TuitionService,
};
use infra_store::{MemoryStore, RosterRepository, TuitionRepository};
use once_cell::sync::Lazy;

use crate::fixtures::{CalendarFixtures, MoneyFixtures, StringFixtures};

static TRACING: Lazy<()> = Lazy::new(|| {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
});

/// Installs a test tracing subscriber once per process
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_test_tracing() {
    Lazy::force(&TRACING);
}

/// A fully wired tuition backend over an in-memory store
///
/// Each instance owns its own store, so tests are isolated by
/// construction. The clock is pinned, which keeps elapsed-month
/// arithmetic deterministic no matter when the suite runs.
pub struct TestBackend {
    pub store: MemoryStore,
    pub roster: Arc<RosterRepository>,
    pub tuition: Arc<TuitionRepository>,
    pub service: TuitionService,
    pub stats: StatisticsAggregator,
    pub clock: CampusClock,
    pub currency: Currency,
}

impl Default for TestBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl TestBackend {
    /// Wires a backend observing from the standard collection day
    pub fn new() -> Self {
        Self::at(CalendarFixtures::collection_day())
    }

    /// Wires a backend observing from a specific local date
    pub fn at(today: NaiveDate) -> Self {
        init_test_tracing();

        let clock = CampusClock::fixed(Tz::Asia__Dhaka, today);
        let currency = Currency::BDT;
        let store = MemoryStore::new();
        let roster = Arc::new(RosterRepository::new(store.clone()));
        let tuition = Arc::new(TuitionRepository::new(store.clone()));

        let service = TuitionService::new(
            tuition.clone(),
            roster.clone(),
            roster.clone(),
            clock,
            currency,
        );
        let stats = StatisticsAggregator::new(
            tuition.clone(),
            roster.clone(),
            roster.clone(),
            currency,
        );

        Self {
            store,
            roster,
            tuition,
            service,
            stats,
            clock,
            currency,
        }
    }

    /// Saves a student and one enrollment for them, returning both
    pub async fn enroll(
        &self,
        name: &str,
        course: &str,
        time_slot: &str,
        fee: Money,
        enrolled_on: NaiveDate,
    ) -> (Student, Enrollment) {
        let student = Student::new(name, enrolled_on);
        self.roster.save_student(student.clone()).await;

        let enrollment = Enrollment::new(student.id, course, time_slot, fee, enrolled_on);
        self.roster
            .save_enrollment(enrollment.clone())
            .await
            .expect("student was just saved");

        (student, enrollment)
    }

    /// Saves the standard evening Physics enrollment from the fixtures
    pub async fn enroll_default(&self) -> (Student, Enrollment) {
        self.enroll(
            StringFixtures::student_name(),
            StringFixtures::course_name(),
            StringFixtures::time_slot(),
            MoneyFixtures::monthly_fee(),
            CalendarFixtures::enrollment_day(),
        )
        .await
    }

    /// Collects a plain cash payment with no discount
    pub async fn collect(
        &self,
        enrollment: &Enrollment,
        amount: Money,
    ) -> Result<PaymentCollected, TuitionError> {
        self.service
            .collect_payment(CollectPaymentCommand {
                student_id: enrollment.student_id,
                enrollment_id: enrollment.id,
                amount,
                discount: Money::zero(amount.currency()),
                method: Some(PaymentMethod::Cash),
                transaction_ref: None,
                notes: None,
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_backend_collects_and_tracks_dues() {
        let backend = TestBackend::new();
        let (student, enrollment) = backend.enroll_default().await;

        let collected = backend
            .collect(&enrollment, Money::new(dec!(1200), backend.currency))
            .await
            .unwrap();
        assert_eq!(collected.outcome.months.len(), 3);

        let report = backend.service.outstanding_due(student.id).await.unwrap();
        assert_eq!(report.total_due.amount(), dec!(800));
    }

    #[tokio::test]
    async fn test_backends_are_isolated() {
        let first = TestBackend::new();
        let second = TestBackend::new();

        let (_, enrollment) = second.enroll_default().await;
        second
            .collect(&enrollment, Money::new(dec!(500), second.currency))
            .await
            .unwrap();

        let untouched = first.service.ledger(1, 10).await.unwrap();
        assert!(untouched.page.entries.is_empty());
    }
}
