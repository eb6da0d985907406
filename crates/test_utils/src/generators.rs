//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that maintains domain invariants.

use chrono::{Duration, NaiveDate};
use core_kernel::{BillingMonth, Currency, EnrollmentId, InvoiceId, Money, StudentId};
use domain_tuition::PaymentMethod;
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Strategy for generating valid Currency values
pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::BDT),
        Just(Currency::USD),
        Just(Currency::EUR),
        Just(Currency::GBP),
        Just(Currency::INR),
    ]
}

/// Strategy for generating valid positive amounts in minor units
pub fn positive_amount_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000_000i64
}

/// Strategy for generating valid Money values with positive amounts
pub fn positive_money_strategy() -> impl Strategy<Value = Money> {
    (positive_amount_minor_strategy(), currency_strategy())
        .prop_map(|(amount, currency)| Money::from_minor(amount, currency))
}

/// Strategy for generating positive BDT Money values
pub fn bdt_money_strategy() -> impl Strategy<Value = Money> {
    positive_amount_minor_strategy().prop_map(|amount| Money::from_minor(amount, Currency::BDT))
}

/// Strategy for generating realistic whole-taka monthly fees
pub fn monthly_fee_strategy() -> impl Strategy<Value = Money> {
    (100i64..10_000i64).prop_map(|taka| Money::new(Decimal::new(taka, 0), Currency::BDT))
}

/// Strategy for generating valid billing months
pub fn billing_month_strategy() -> impl Strategy<Value = BillingMonth> {
    (2020i32..2031i32, 0u32..12u32)
        .prop_map(|(year, month)| BillingMonth::new(year, month).expect("month in range"))
}

/// Strategy for generating ordered month spans up to two years wide
pub fn month_span_strategy() -> impl Strategy<Value = (BillingMonth, BillingMonth)> {
    (billing_month_strategy(), 0i64..24i64)
        .prop_map(|(from, width)| (from, BillingMonth::from_index(from.index() + width)))
}

/// Strategy for generating dates within 2025
pub fn date_2025_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..365i64).prop_map(|days| {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap() + Duration::days(days)
    })
}

/// Strategy for generating StudentId
pub fn student_id_strategy() -> impl Strategy<Value = StudentId> {
    any::<[u8; 16]>().prop_map(|bytes| StudentId::from_uuid(uuid::Uuid::from_bytes(bytes)))
}

/// Strategy for generating EnrollmentId
pub fn enrollment_id_strategy() -> impl Strategy<Value = EnrollmentId> {
    any::<[u8; 16]>().prop_map(|bytes| EnrollmentId::from_uuid(uuid::Uuid::from_bytes(bytes)))
}

/// Strategy for generating InvoiceId
pub fn invoice_id_strategy() -> impl Strategy<Value = InvoiceId> {
    any::<[u8; 16]>().prop_map(|bytes| InvoiceId::from_uuid(uuid::Uuid::from_bytes(bytes)))
}

/// Strategy for generating course names
pub fn course_name_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Physics".to_string()),
        Just("Chemistry".to_string()),
        Just("Higher Math".to_string()),
        Just("Biology".to_string()),
        Just("English".to_string()),
        Just("ICT".to_string()),
    ]
}

/// Strategy for generating batch time slots
pub fn time_slot_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("10:00 AM".to_string()),
        Just("3:00 PM".to_string()),
        Just("5:00 PM".to_string()),
        Just("7:00 PM".to_string()),
    ]
}

/// Strategy for generating payment methods
pub fn payment_method_strategy() -> impl Strategy<Value = PaymentMethod> {
    prop_oneof![
        Just(PaymentMethod::Cash),
        Just(PaymentMethod::BankTransfer),
        Just(PaymentMethod::Card),
        Just(PaymentMethod::MobileWallet),
        Just(PaymentMethod::Check),
    ]
}

/// Strategy for generating student names
pub fn student_name_strategy() -> impl Strategy<Value = String> {
    ("[A-Z][a-z]{2,8}", "[A-Z][a-z]{2,8}")
        .prop_map(|(first, last)| format!("{} {}", first, last))
}
