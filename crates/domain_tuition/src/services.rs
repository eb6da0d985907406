//! Tuition services
//!
//! `TuitionService` is the write-side orchestrator: it loads the roster
//! context, plans an allocation, and commits the whole thing as one
//! batch. A version conflict means another collection won the race for
//! the same rows; the service replans against a fresh snapshot and
//! tries again, up to a bounded number of attempts.

use std::sync::Arc;

use core_kernel::{CampusClock, Currency, EnrollmentId, InvoiceId, Money, StudentId};

use crate::allocator::{AllocationOutcome, AllocationRequest, PaymentAllocator};
use crate::dues::{DuesCalculator, DuesReport};
use crate::enrollment::Enrollment;
use crate::error::TuitionError;
use crate::history::{HistorySummary, MonthRecord, PaymentHistoryBuilder};
use crate::invoice::Invoice;
use crate::ledger::{LedgerEntry, LedgerPage, LedgerTotals};
use crate::ports::{EnrollmentSource, StudentSource, TuitionStore, WriteBatch};
use crate::settlement::{PaymentMethod, Settlement};

const DEFAULT_MAX_RETRIES: u32 = 3;

/// One request to collect a payment against an enrollment
#[derive(Debug, Clone)]
pub struct CollectPaymentCommand {
    pub student_id: StudentId,
    pub enrollment_id: EnrollmentId,
    pub amount: Money,
    pub discount: Money,
    pub method: Option<PaymentMethod>,
    pub transaction_ref: Option<String>,
    pub notes: Option<String>,
}

/// Result of a successful collection
#[derive(Debug, Clone)]
pub struct PaymentCollected {
    pub invoice: Invoice,
    pub outcome: AllocationOutcome,
}

/// An enrollment's month-by-month history with its roll-up
#[derive(Debug, Clone)]
pub struct EnrollmentHistory {
    pub enrollment: Enrollment,
    pub records: Vec<MonthRecord>,
    pub summary: HistorySummary,
}

/// One page of the ledger together with the running totals
#[derive(Debug, Clone)]
pub struct LedgerView {
    pub page: LedgerPage,
    pub totals: LedgerTotals,
}

/// Write-side orchestrator for collections and reversals
pub struct TuitionService {
    store: Arc<dyn TuitionStore>,
    enrollments: Arc<dyn EnrollmentSource>,
    students: Arc<dyn StudentSource>,
    clock: CampusClock,
    currency: Currency,
    max_retries: u32,
}

impl TuitionService {
    pub fn new(
        store: Arc<dyn TuitionStore>,
        enrollments: Arc<dyn EnrollmentSource>,
        students: Arc<dyn StudentSource>,
        clock: CampusClock,
        currency: Currency,
    ) -> Self {
        Self {
            store,
            enrollments,
            students,
            clock,
            currency,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Collects one payment: allocates it across months, writes the
    /// settlement rows, the invoice, and the income ledger entry as a
    /// single atomic batch
    ///
    /// Replans on a version conflict; gives up after `max_retries`
    /// attempts.
    pub async fn collect_payment(
        &self,
        cmd: CollectPaymentCommand,
    ) -> Result<PaymentCollected, TuitionError> {
        let enrollment = self.enrollments.get_enrollment(cmd.enrollment_id).await?;
        if enrollment.student_id != cmd.student_id {
            return Err(TuitionError::not_found(format!(
                "enrollment {} does not belong to student {}",
                cmd.enrollment_id, cmd.student_id
            )));
        }
        if !enrollment.active {
            return Err(TuitionError::validation(
                "cannot collect a payment against an inactive enrollment",
            ));
        }
        let student = self.students.get_student(cmd.student_id).await?;

        let request = AllocationRequest {
            amount: cmd.amount,
            discount: cmd.discount,
            method: cmd.method,
            transaction_ref: cmd.transaction_ref.clone(),
            notes: cmd.notes.clone(),
            paid_at: self.clock.now(),
        };

        let mut attempt = 0;
        loop {
            attempt += 1;

            let snapshot = self.store.settlements_for_enrollment(enrollment.id).await?;
            let rows: Vec<Settlement> = snapshot.iter().map(|v| v.data.clone()).collect();
            let due_snapshot =
                DuesCalculator::enrollment_outstanding(&enrollment, &rows, self.clock.today())?;

            let current_month = self.clock.current_month();
            let plan = PaymentAllocator::plan(&enrollment, &snapshot, current_month, &request)?;

            let invoice = Invoice::new(
                cmd.student_id,
                plan.months(),
                cmd.amount,
                due_snapshot,
                plan.settlement_ids(),
            );
            let entry = LedgerEntry::income(
                format!(
                    "Tuition payment from {} for {}",
                    student.name,
                    invoice.month_labels().join(", ")
                ),
                cmd.amount,
            );

            let outcome = plan.outcome.clone();
            let mut batch = WriteBatch::new();
            for settlement in plan.creates {
                batch = batch.create_settlement(settlement);
            }
            for update in plan.updates {
                batch = batch.update_settlement(update.expected_version, update.settlement);
            }
            batch = batch.create_invoice(invoice.clone()).append_ledger_entry(entry);

            match self.store.commit(batch).await {
                Ok(()) => {
                    tracing::info!(
                        invoice_id = %invoice.id,
                        student_id = %cmd.student_id,
                        enrollment_id = %enrollment.id,
                        amount = %cmd.amount,
                        months = outcome.months.len(),
                        "payment collected"
                    );
                    return Ok(PaymentCollected { invoice, outcome });
                }
                Err(err) if err.is_conflict() && attempt < self.max_retries => {
                    tracing::warn!(
                        enrollment_id = %enrollment.id,
                        attempt,
                        "allocation lost a write race, replanning on a fresh snapshot"
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Reverses one invoice: deletes it with every settlement row it
    /// owns and appends the offsetting expense entry, atomically
    pub async fn delete_invoice(&self, id: InvoiceId) -> Result<Invoice, TuitionError> {
        let invoice = self.store.get_invoice(id).await?;

        let mut batch = WriteBatch::new().delete_invoice(invoice.id);
        for settlement_id in &invoice.payment_ids {
            batch = batch.delete_settlement(*settlement_id);
        }
        batch = batch.append_ledger_entry(LedgerEntry::expense(
            format!("Reversal of invoice {}", invoice.id),
            invoice.amount,
        ));

        self.store.commit(batch).await?;
        tracing::info!(
            invoice_id = %invoice.id,
            student_id = %invoice.student_id,
            amount = %invoice.amount,
            rows = invoice.payment_ids.len(),
            "invoice reversed"
        );
        Ok(invoice)
    }

    /// Month-by-month history of one enrollment with its summary
    ///
    /// Inactive enrollments keep their history readable.
    pub async fn payment_history(
        &self,
        student_id: StudentId,
        enrollment_id: EnrollmentId,
    ) -> Result<EnrollmentHistory, TuitionError> {
        let enrollment = self.enrollments.get_enrollment(enrollment_id).await?;
        if enrollment.student_id != student_id {
            return Err(TuitionError::not_found(format!(
                "enrollment {} does not belong to student {}",
                enrollment_id, student_id
            )));
        }

        let snapshot = self.store.settlements_for_enrollment(enrollment.id).await?;
        let rows: Vec<Settlement> = snapshot.into_iter().map(|v| v.data).collect();

        let records =
            PaymentHistoryBuilder::build(&enrollment, &rows, self.clock.current_month());
        let summary = HistorySummary::summarize(&records, self.currency)?;

        Ok(EnrollmentHistory {
            enrollment,
            records,
            summary,
        })
    }

    /// Outstanding dues across a student's active enrollments
    pub async fn outstanding_due(&self, student_id: StudentId) -> Result<DuesReport, TuitionError> {
        self.students.get_student(student_id).await?;
        let enrollments = self
            .enrollments
            .active_enrollments_for_student(student_id)
            .await?;
        let settlements = self.store.settlements_for_student(student_id).await?;

        DuesCalculator::student_dues(
            student_id,
            &enrollments,
            &settlements,
            self.clock.today(),
            self.currency,
        )
    }

    /// One ledger page plus the all-time totals
    pub async fn ledger(&self, page: u32, per_page: u32) -> Result<LedgerView, TuitionError> {
        let page = self.store.ledger_page(page, per_page).await?;
        let totals = self.store.ledger_totals(self.currency).await?;
        Ok(LedgerView { page, totals })
    }
}
