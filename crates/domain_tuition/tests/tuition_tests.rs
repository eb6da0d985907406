//! Comprehensive tests for domain_tuition

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use core_kernel::{BillingMonth, Currency, Money, StudentId};

use domain_tuition::allocator::{AllocationPlan, AllocationRequest, PaymentAllocator};
use domain_tuition::dues::DuesCalculator;
use domain_tuition::enrollment::Enrollment;
use domain_tuition::history::{HistorySummary, PaymentHistoryBuilder};
use domain_tuition::invoice::Invoice;
use domain_tuition::ledger::{LedgerEntry, LedgerTotals};
use domain_tuition::ports::Versioned;
use domain_tuition::settlement::{Settlement, SettlementStatus};

fn bdt(amount: rust_decimal::Decimal) -> Money {
    Money::new(amount, Currency::BDT)
}

fn month(year: i32, m: u32) -> BillingMonth {
    BillingMonth::new(year, m).unwrap()
}

fn enrollment(fee: rust_decimal::Decimal, enrolled_on: NaiveDate) -> Enrollment {
    Enrollment::new(StudentId::new_v7(), "Physics", "7:00 PM", bdt(fee), enrolled_on)
}

/// Applies a plan the way the store's commit would, producing the next
/// snapshot.
fn apply_plan(
    snapshot: Vec<Versioned<Settlement>>,
    plan: &AllocationPlan,
) -> Vec<Versioned<Settlement>> {
    let mut rows: std::collections::BTreeMap<BillingMonth, Versioned<Settlement>> =
        snapshot.into_iter().map(|v| (v.data.month, v)).collect();
    for create in &plan.creates {
        assert!(
            rows.insert(create.month, Versioned::new(1, create.clone())).is_none(),
            "create collided with an existing row"
        );
    }
    for update in &plan.updates {
        let row = rows.get_mut(&update.settlement.month).expect("row exists");
        assert_eq!(row.version, update.expected_version, "stale version in plan");
        *row = Versioned::new(update.expected_version + 1, update.settlement.clone());
    }
    rows.into_values().collect()
}

fn settle(
    enrollment: &Enrollment,
    snapshot: Vec<Versioned<Settlement>>,
    current: BillingMonth,
    amount: Money,
) -> (Vec<Versioned<Settlement>>, AllocationPlan) {
    let request = AllocationRequest::new(amount, Money::zero(amount.currency()));
    let plan = PaymentAllocator::plan(enrollment, &snapshot, current, &request).unwrap();
    (apply_plan(snapshot, &plan), plan)
}

mod dues_workflow {
    use super::*;

    /// A student enrolled on January 1st owes four months by mid April,
    /// the enrollment month included.
    #[test]
    fn test_four_months_elapsed_by_mid_april() {
        let enrollment = enrollment(dec!(500), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        let as_of = NaiveDate::from_ymd_opt(2025, 4, 15).unwrap();

        assert_eq!(DuesCalculator::owed_months(&enrollment, as_of), 4);

        let due =
            DuesCalculator::enrollment_outstanding(&enrollment, &[], as_of).unwrap();
        assert_eq!(due, bdt(dec!(2000)));
    }

    #[test]
    fn test_dues_cross_year_boundary() {
        let enrollment =
            enrollment(dec!(500), NaiveDate::from_ymd_opt(2024, 11, 20).unwrap());
        let as_of = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();

        // Nov, Dec, Jan, Feb.
        assert_eq!(DuesCalculator::owed_months(&enrollment, as_of), 4);
    }

    #[test]
    fn test_settled_months_reduce_dues() {
        let e = enrollment(dec!(500), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        let (snapshot, _) = settle(&e, vec![], month(2025, 3), bdt(dec!(1200)));
        let rows: Vec<Settlement> = snapshot.iter().map(|v| v.data.clone()).collect();

        let due = DuesCalculator::enrollment_outstanding(
            &e,
            &rows,
            NaiveDate::from_ymd_opt(2025, 4, 15).unwrap(),
        )
        .unwrap();
        assert_eq!(due, bdt(dec!(800)));
    }

    /// Overpayment on one enrollment never hides arrears on another.
    #[test]
    fn test_per_enrollment_floor_in_student_dues() {
        let student_id = StudentId::new_v7();
        let physics = Enrollment::new(
            student_id,
            "Physics",
            "7:00 PM",
            bdt(dec!(500)),
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        );
        let chemistry = Enrollment::new(
            student_id,
            "Chemistry",
            "5:00 PM",
            bdt(dec!(700)),
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        );

        // Physics paid a year ahead; chemistry untouched.
        let (snapshot, _) = settle(&physics, vec![], month(2025, 2), bdt(dec!(6000)));
        let rows: Vec<Settlement> = snapshot.iter().map(|v| v.data.clone()).collect();

        let report = DuesCalculator::student_dues(
            student_id,
            &[physics, chemistry],
            &rows,
            NaiveDate::from_ymd_opt(2025, 4, 15).unwrap(),
            Currency::BDT,
        )
        .unwrap();

        // Two months of chemistry, nothing netted from physics credit.
        assert_eq!(report.total_due, bdt(dec!(1400)));
        assert!(report.enrollments[0].outstanding.is_zero());
        assert_eq!(report.enrollments[1].outstanding, bdt(dec!(1400)));
    }
}

mod allocation_workflow {
    use super::*;

    /// 1200 against a 500 fee enrolled in January, paid in April: two
    /// full months and a partial third.
    #[test]
    fn test_first_collection_spreads_oldest_first() {
        let e = enrollment(dec!(500), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        let (snapshot, plan) = settle(&e, vec![], month(2025, 3), bdt(dec!(1200)));

        assert_eq!(plan.outcome.created_count, 3);
        let statuses: Vec<SettlementStatus> =
            snapshot.iter().map(|v| v.data.status).collect();
        assert_eq!(
            statuses,
            vec![
                SettlementStatus::Paid,
                SettlementStatus::Paid,
                SettlementStatus::Partial
            ]
        );
        assert_eq!(snapshot[2].data.amount_paid, bdt(dec!(200)));
    }

    /// The follow-up 400 completes March and opens April at 100.
    #[test]
    fn test_follow_up_collection_continues_the_sweep() {
        let e = enrollment(dec!(500), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        let (snapshot, _) = settle(&e, vec![], month(2025, 3), bdt(dec!(1200)));
        let (snapshot, plan) = settle(&e, snapshot, month(2025, 3), bdt(dec!(400)));

        assert_eq!(plan.outcome.updated_count, 1);
        assert_eq!(plan.outcome.created_count, 1);

        let march = snapshot.iter().find(|v| v.data.month == month(2025, 2)).unwrap();
        assert_eq!(march.data.status, SettlementStatus::Paid);
        let april = snapshot.iter().find(|v| v.data.month == month(2025, 3)).unwrap();
        assert_eq!(april.data.amount_paid, bdt(dec!(100)));
        assert_eq!(april.data.status, SettlementStatus::Partial);
    }

    /// A caught-up student paying two fees lands May and June in advance.
    #[test]
    fn test_caught_up_collection_rolls_into_advance() {
        let e = enrollment(dec!(500), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        let (snapshot, _) = settle(&e, vec![], month(2025, 3), bdt(dec!(2000)));
        let (snapshot, plan) = settle(&e, snapshot, month(2025, 3), bdt(dec!(1000)));

        assert_eq!(plan.months(), vec![month(2025, 4), month(2025, 5)]);
        assert_eq!(snapshot.len(), 6);
        assert!(snapshot.iter().all(|v| v.data.status == SettlementStatus::Paid));
    }

    #[test]
    fn test_discount_consumed_by_first_touched_month_only() {
        let e = enrollment(dec!(500), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        let request =
            AllocationRequest::new(bdt(dec!(800)), bdt(dec!(200)));
        let plan = PaymentAllocator::plan(&e, &[], month(2025, 1), &request).unwrap();
        let snapshot = apply_plan(vec![], &plan);

        let january = &snapshot[0].data;
        assert_eq!(january.discount, bdt(dec!(200)));
        assert_eq!(january.amount_paid, bdt(dec!(300)));
        assert_eq!(january.status, SettlementStatus::Paid);

        let february = &snapshot[1].data;
        assert!(february.discount.is_zero());
        assert_eq!(february.amount_paid, bdt(dec!(500)));
    }

    /// Re-running the same payment against the updated snapshot never
    /// double-settles: the already-paid months are skipped.
    #[test]
    fn test_sequential_payments_never_double_settle() {
        let e = enrollment(dec!(500), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        let (snapshot, _) = settle(&e, vec![], month(2025, 3), bdt(dec!(500)));
        let (snapshot, plan) = settle(&e, snapshot, month(2025, 3), bdt(dec!(500)));

        assert_eq!(plan.months(), vec![month(2025, 1)]);
        assert_eq!(snapshot.len(), 2);
        let total: Money = snapshot
            .iter()
            .fold(bdt(dec!(0)), |acc, v| acc + v.data.amount_paid);
        assert_eq!(total, bdt(dec!(1000)));
    }
}

mod history_workflow {
    use super::*;

    /// With no settlements the history is exactly the elapsed months,
    /// every entry unpaid with nothing received.
    #[test]
    fn test_untouched_enrollment_projects_all_unpaid() {
        let e = enrollment(dec!(500), NaiveDate::from_ymd_opt(2025, 1, 10).unwrap());
        let records = PaymentHistoryBuilder::build(&e, &[], month(2025, 3));

        assert_eq!(records.len(), 4);
        for record in &records {
            assert_eq!(record.status, SettlementStatus::Unpaid);
            assert!(record.amount_paid.is_zero());
            assert_eq!(record.monthly_fee, bdt(dec!(500)));
        }
    }

    #[test]
    fn test_history_after_collections_matches_allocation() {
        let e = enrollment(dec!(500), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        let (snapshot, _) = settle(&e, vec![], month(2025, 3), bdt(dec!(1200)));
        let rows: Vec<Settlement> = snapshot.iter().map(|v| v.data.clone()).collect();

        let records = PaymentHistoryBuilder::build(&e, &rows, month(2025, 3));
        let summary = HistorySummary::summarize(&records, Currency::BDT).unwrap();

        assert_eq!(records.len(), 4);
        assert_eq!(summary.paid_months, 2);
        assert_eq!(summary.partial_months, 1);
        assert_eq!(summary.unpaid_months, 1);
        assert_eq!(summary.total_due, bdt(dec!(800)));
    }

    #[test]
    fn test_due_dates_fall_on_the_fifth() {
        let e = enrollment(dec!(500), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        let records = PaymentHistoryBuilder::build(&e, &[], month(2025, 1));

        assert_eq!(
            records[0].due_date,
            NaiveDate::from_ymd_opt(2025, 1, 5).unwrap()
        );
        assert_eq!(
            records[1].due_date,
            NaiveDate::from_ymd_opt(2025, 2, 5).unwrap()
        );
    }
}

mod invoice_workflow {
    use super::*;

    /// An invoice captures the plan it came from; the reversal expense
    /// nets the income entry to zero.
    #[test]
    fn test_invoice_and_reversal_net_to_zero() {
        let e = enrollment(dec!(500), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        let (_, plan) = settle(&e, vec![], month(2025, 3), bdt(dec!(1200)));

        let invoice = Invoice::new(
            e.student_id,
            plan.months(),
            bdt(dec!(1200)),
            bdt(dec!(2000)),
            plan.settlement_ids(),
        );
        assert_eq!(invoice.payment_ids.len(), 3);
        assert_eq!(
            invoice.month_labels(),
            vec!["January 2025", "February 2025", "March 2025"]
        );

        let income = LedgerEntry::income("Tuition payment", invoice.amount);
        let expense = LedgerEntry::expense(
            format!("Reversal of invoice {}", invoice.id),
            invoice.amount,
        );
        let totals = LedgerTotals {
            income: income.amount,
            expense: expense.amount,
        };
        assert!(totals.profit().unwrap().is_zero());
    }

    #[test]
    fn test_invoice_ids_follow_month_order() {
        let e = enrollment(dec!(500), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        let (snapshot, _) = settle(&e, vec![], month(2025, 3), bdt(dec!(700)));
        let (_, plan) = settle(&e, snapshot, month(2025, 3), bdt(dec!(600)));

        // Updates February, creates March: ids come back oldest month
        // first regardless of create/update split.
        let ids = plan.settlement_ids();
        let months = plan.months();
        assert_eq!(ids.len(), months.len());
        assert_eq!(months, vec![month(2025, 1), month(2025, 2)]);
    }
}

mod ledger_workflow {
    use super::*;
    use domain_tuition::ledger::LedgerPage;

    #[test]
    fn test_page_count_rounds_up() {
        let entries: Vec<LedgerEntry> = (0..5)
            .map(|i| LedgerEntry::income(format!("payment {i}"), bdt(dec!(100))))
            .collect();
        let page = LedgerPage {
            entries,
            page: 1,
            per_page: 2,
            total_entries: 5,
        };
        assert_eq!(page.total_pages(), 3);
    }

    #[test]
    fn test_profit_can_run_negative() {
        let totals = LedgerTotals {
            income: bdt(dec!(100)),
            expense: bdt(dec!(250)),
        };
        let profit = totals.profit().unwrap();
        assert!(profit.is_negative());
        assert_eq!(profit, bdt(dec!(-150)));
    }
}

mod wire_format {
    use super::*;
    use domain_tuition::ledger::EntryKind;
    use domain_tuition::settlement::PaymentMethod;

    /// Status strings are part of the API contract; clients match on them.
    #[test]
    fn test_settlement_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&SettlementStatus::Paid).unwrap(),
            "\"paid\""
        );
        assert_eq!(
            serde_json::to_string(&SettlementStatus::Partial).unwrap(),
            "\"partial\""
        );
        assert_eq!(
            serde_json::to_string(&SettlementStatus::Unpaid).unwrap(),
            "\"unpaid\""
        );
    }

    #[test]
    fn test_payment_method_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::BankTransfer).unwrap(),
            "\"bank_transfer\""
        );
        let parsed: PaymentMethod = serde_json::from_str("\"mobile_wallet\"").unwrap();
        assert_eq!(parsed, PaymentMethod::MobileWallet);
    }

    #[test]
    fn test_entry_kind_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&EntryKind::Income).unwrap(),
            "\"income\""
        );
        assert_eq!(
            serde_json::to_string(&EntryKind::Expense).unwrap(),
            "\"expense\""
        );
    }

    #[test]
    fn test_settlement_row_roundtrips_through_json() {
        let e = enrollment(dec!(500), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        let (snapshot, _) = settle(&e, vec![], month(2025, 3), bdt(dec!(700)));

        let json = serde_json::to_string(&snapshot[0].data).unwrap();
        let parsed: Settlement = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot[0].data);
    }
}
