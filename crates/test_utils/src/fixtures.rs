//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for common entities across the tuition ledger.
//! These fixtures are designed to be consistent and predictable for unit tests.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use core_kernel::{
    BillingMonth, CampusClock, Currency, EnrollmentId, InvoiceId, LedgerEntryId, Money,
    SettlementId, StudentId,
};
use rust_decimal_macros::dec;
use uuid::Uuid;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// The standard monthly fee charged in most tests
    pub fn monthly_fee() -> Money {
        Money::new(dec!(500), Currency::BDT)
    }

    /// A lump payment covering two full months and part of a third
    pub fn lump_payment() -> Money {
        Money::new(dec!(1200), Currency::BDT)
    }

    /// A follow-up payment that settles a partial month and starts the next
    pub fn top_up() -> Money {
        Money::new(dec!(400), Currency::BDT)
    }

    /// A standard one-shot discount
    pub fn discount() -> Money {
        Money::new(dec!(100), Currency::BDT)
    }

    /// Creates a zero amount
    pub fn bdt_zero() -> Money {
        Money::zero(Currency::BDT)
    }

    /// Creates a USD amount for currency mismatch tests
    pub fn usd_100() -> Money {
        Money::new(dec!(100.00), Currency::USD)
    }
}

/// Fixture for calendar test data
pub struct CalendarFixtures;

impl CalendarFixtures {
    /// Standard enrollment date (Jan 1, 2025)
    pub fn enrollment_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    /// The observation date most scenarios run at (Apr 15, 2025)
    pub fn collection_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 15).unwrap()
    }

    /// Timestamp for recorded payments on the collection day
    pub fn payment_instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 15, 10, 30, 0).unwrap()
    }

    /// First owed month for the standard enrollment
    pub fn january() -> BillingMonth {
        BillingMonth::new(2025, 0).unwrap()
    }

    /// The month the standard scenarios observe from
    pub fn april() -> BillingMonth {
        BillingMonth::new(2025, 3).unwrap()
    }

    /// A month before the standard enrollment began
    pub fn prior_december() -> BillingMonth {
        BillingMonth::new(2024, 11).unwrap()
    }

    /// A campus clock pinned to the collection day in Dhaka
    pub fn dhaka_clock() -> CampusClock {
        CampusClock::fixed(Tz::Asia__Dhaka, Self::collection_day())
    }
}

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    /// Creates a deterministic student ID for testing
    pub fn student_id() -> StudentId {
        StudentId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440001").unwrap())
    }

    /// Creates a deterministic enrollment ID for testing
    pub fn enrollment_id() -> EnrollmentId {
        EnrollmentId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440002").unwrap())
    }

    /// Creates a deterministic settlement ID for testing
    pub fn settlement_id() -> SettlementId {
        SettlementId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440003").unwrap())
    }

    /// Creates a deterministic invoice ID for testing
    pub fn invoice_id() -> InvoiceId {
        InvoiceId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440004").unwrap())
    }

    /// Creates a deterministic ledger entry ID for testing
    pub fn ledger_entry_id() -> LedgerEntryId {
        LedgerEntryId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440005").unwrap())
    }
}

/// Fixture for string test data
pub struct StringFixtures;

impl StringFixtures {
    /// Standard student name
    pub fn student_name() -> &'static str {
        "Rahim Uddin"
    }

    /// A second student name for multi-student tests
    pub fn second_student_name() -> &'static str {
        "Salma Akter"
    }

    /// Standard course name
    pub fn course_name() -> &'static str {
        "Physics"
    }

    /// A second course name for grouping tests
    pub fn second_course_name() -> &'static str {
        "Chemistry"
    }

    /// Standard batch time slot
    pub fn time_slot() -> &'static str {
        "7:00 PM"
    }

    /// A second batch time slot for grouping tests
    pub fn second_time_slot() -> &'static str {
        "5:00 PM"
    }

    /// Test transaction reference
    pub fn transaction_ref() -> &'static str {
        "TXN-2025-000001"
    }

    /// Test payment note
    pub fn payment_note() -> &'static str {
        "Paid at front desk"
    }
}
