//! Payment history
//!
//! Builds the month-by-month view of an enrollment: one record per month
//! from the enrollment's start through the current month, plus any advance
//! months that already hold a settlement row. Months without a row show up
//! as unpaid placeholders at the enrollment's current fee.

use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::{BillingMonth, Currency, Money};
use std::collections::BTreeMap;

use crate::enrollment::Enrollment;
use crate::error::TuitionError;
use crate::settlement::{PaymentMethod, Settlement, SettlementStatus};

/// One month of an enrollment's history
#[derive(Debug, Clone, PartialEq)]
pub struct MonthRecord {
    pub month: BillingMonth,
    pub monthly_fee: Money,
    pub amount_paid: Money,
    pub discount: Money,
    pub status: SettlementStatus,
    pub due_date: NaiveDate,
    pub payment_date: Option<DateTime<Utc>>,
    pub method: Option<PaymentMethod>,
    pub transaction_ref: Option<String>,
    pub notes: Option<String>,
}

impl MonthRecord {
    fn from_settlement(settlement: &Settlement) -> Self {
        Self {
            month: settlement.month,
            monthly_fee: settlement.fee_at_settlement,
            amount_paid: settlement.amount_paid,
            discount: settlement.discount,
            status: settlement.status,
            due_date: settlement.month.due_date(),
            payment_date: settlement.payment_date,
            method: settlement.method,
            transaction_ref: settlement.transaction_ref.clone(),
            notes: settlement.notes.clone(),
        }
    }

    fn placeholder(month: BillingMonth, fee: Money) -> Self {
        Self {
            month,
            monthly_fee: fee,
            amount_paid: Money::zero(fee.currency()),
            discount: Money::zero(fee.currency()),
            status: SettlementStatus::Unpaid,
            due_date: month.due_date(),
            payment_date: None,
            method: None,
            transaction_ref: None,
            notes: None,
        }
    }
}

/// Roll-up over a history
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySummary {
    pub paid_months: usize,
    pub partial_months: usize,
    pub unpaid_months: usize,
    /// Total still owed across the listed months
    pub total_due: Money,
}

impl HistorySummary {
    pub fn summarize(records: &[MonthRecord], currency: Currency) -> Result<Self, TuitionError> {
        let mut paid_months = 0;
        let mut partial_months = 0;
        let mut unpaid_months = 0;
        let mut total_due = Money::zero(currency);

        for record in records {
            match record.status {
                SettlementStatus::Paid => paid_months += 1,
                SettlementStatus::Partial => partial_months += 1,
                SettlementStatus::Unpaid => unpaid_months += 1,
            }
            let outstanding = record
                .monthly_fee
                .saturating_sub(&record.amount_paid)?
                .saturating_sub(&record.discount)?;
            total_due = total_due.checked_add(&outstanding)?;
        }

        Ok(Self {
            paid_months,
            partial_months,
            unpaid_months,
            total_due,
        })
    }
}

/// Assembles the per-month ledger view of one enrollment
pub struct PaymentHistoryBuilder;

impl PaymentHistoryBuilder {
    /// Builds the history from the enrollment's start month through
    /// `current_month`, extended by any advance rows beyond it
    ///
    /// Returns records in chronological order with no gaps up to the
    /// later of `current_month` and the last settled month.
    pub fn build(
        enrollment: &Enrollment,
        settlements: &[Settlement],
        current_month: BillingMonth,
    ) -> Vec<MonthRecord> {
        let by_month: BTreeMap<BillingMonth, &Settlement> = settlements
            .iter()
            .filter(|s| s.enrollment_id == enrollment.id)
            .map(|s| (s.month, s))
            .collect();

        let last = by_month
            .keys()
            .next_back()
            .copied()
            .map_or(current_month, |m| m.max(current_month));

        BillingMonth::range(enrollment.start_month(), last)
            .into_iter()
            .map(|month| match by_month.get(&month) {
                Some(settlement) => MonthRecord::from_settlement(settlement),
                None => MonthRecord::placeholder(month, enrollment.monthly_fee),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::StudentId;
    use rust_decimal_macros::dec;

    fn bdt(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::BDT)
    }

    fn month(year: i32, m: u32) -> BillingMonth {
        BillingMonth::new(year, m).unwrap()
    }

    fn enrollment_jan_2025() -> Enrollment {
        Enrollment::new(
            StudentId::new_v7(),
            "Chemistry",
            "5:00 PM",
            bdt(dec!(500)),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        )
    }

    #[test]
    fn test_history_fills_gaps_with_unpaid_placeholders() {
        let enrollment = enrollment_jan_2025();
        let mut february = Settlement::unpaid(
            enrollment.student_id,
            enrollment.id,
            month(2025, 1),
            bdt(dec!(500)),
        );
        february.receive(bdt(dec!(500)), Utc::now()).unwrap();

        let records =
            PaymentHistoryBuilder::build(&enrollment, &[february], month(2025, 2));

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].month, month(2025, 0));
        assert_eq!(records[0].status, SettlementStatus::Unpaid);
        assert!(records[0].amount_paid.is_zero());
        assert_eq!(records[1].status, SettlementStatus::Paid);
        assert_eq!(records[2].status, SettlementStatus::Unpaid);
    }

    #[test]
    fn test_history_extends_through_advance_rows() {
        let enrollment = enrollment_jan_2025();
        let mut may = Settlement::unpaid(
            enrollment.student_id,
            enrollment.id,
            month(2025, 4),
            bdt(dec!(500)),
        );
        may.receive(bdt(dec!(500)), Utc::now()).unwrap();

        let records = PaymentHistoryBuilder::build(&enrollment, &[may], month(2025, 1));

        // January through May even though the current month is February.
        assert_eq!(records.len(), 5);
        assert_eq!(records.last().unwrap().month, month(2025, 4));
        assert_eq!(records.last().unwrap().status, SettlementStatus::Paid);
    }

    #[test]
    fn test_history_ignores_other_enrollments_rows() {
        let enrollment = enrollment_jan_2025();
        let other = enrollment_jan_2025();
        let mut foreign = Settlement::unpaid(
            other.student_id,
            other.id,
            month(2025, 0),
            bdt(dec!(900)),
        );
        foreign.receive(bdt(dec!(900)), Utc::now()).unwrap();

        let records =
            PaymentHistoryBuilder::build(&enrollment, &[foreign], month(2025, 0));

        assert_eq!(records.len(), 1);
        assert!(records[0].amount_paid.is_zero());
        assert_eq!(records[0].monthly_fee, bdt(dec!(500)));
    }

    #[test]
    fn test_placeholder_due_date_is_the_fifth() {
        let enrollment = enrollment_jan_2025();
        let records = PaymentHistoryBuilder::build(&enrollment, &[], month(2025, 0));

        assert_eq!(
            records[0].due_date,
            NaiveDate::from_ymd_opt(2025, 1, 5).unwrap()
        );
    }

    #[test]
    fn test_summary_counts_statuses_and_totals_due() {
        let enrollment = enrollment_jan_2025();
        let mut january = Settlement::unpaid(
            enrollment.student_id,
            enrollment.id,
            month(2025, 0),
            bdt(dec!(500)),
        );
        january.receive(bdt(dec!(500)), Utc::now()).unwrap();
        let mut february = Settlement::unpaid(
            enrollment.student_id,
            enrollment.id,
            month(2025, 1),
            bdt(dec!(500)),
        );
        february.receive(bdt(dec!(200)), Utc::now()).unwrap();

        let records = PaymentHistoryBuilder::build(
            &enrollment,
            &[january, february],
            month(2025, 2),
        );
        let summary = HistorySummary::summarize(&records, Currency::BDT).unwrap();

        assert_eq!(summary.paid_months, 1);
        assert_eq!(summary.partial_months, 1);
        assert_eq!(summary.unpaid_months, 1);
        // 0 outstanding + 300 + 500
        assert_eq!(summary.total_due, bdt(dec!(800)));
    }

    #[test]
    fn test_discount_reduces_summary_due() {
        let enrollment = enrollment_jan_2025();
        let mut january = Settlement::unpaid(
            enrollment.student_id,
            enrollment.id,
            month(2025, 0),
            bdt(dec!(500)),
        );
        january.add_discount(bdt(dec!(100))).unwrap();
        january.receive(bdt(dec!(100)), Utc::now()).unwrap();

        let records =
            PaymentHistoryBuilder::build(&enrollment, &[january], month(2025, 0));
        let summary = HistorySummary::summarize(&records, Currency::BDT).unwrap();

        assert_eq!(summary.total_due, bdt(dec!(300)));
    }
}
