//! Tuition Domain Ports
//!
//! This module defines the port interfaces the tuition domain needs from
//! the outside world: the roster (students and enrollments, owned by
//! another subsystem) and the tuition store (settlements, invoices, the
//! income/expense ledger).
//!
//! # Write model
//!
//! All writes flow through [`TuitionStore::commit`] as a single
//! [`WriteBatch`]. The store validates every precondition in the batch
//! (unique settlement keys, expected versions, existence of deleted rows)
//! and then applies the whole batch, or applies nothing at all. Snapshot
//! reads return [`Versioned`] rows; a stale version at commit time yields
//! `PortError::Conflict` and the caller replans against a fresh snapshot.
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_tuition::ports::TuitionStore;
//! use std::sync::Arc;
//!
//! pub struct TuitionService {
//!     store: Arc<dyn TuitionStore>,
//! }
//!
//! impl TuitionService {
//!     pub async fn reverse(&self, id: InvoiceId) -> Result<(), TuitionError> {
//!         let invoice = self.store.get_invoice(id).await?;
//!         let batch = WriteBatch::new().delete_invoice(invoice.id);
//!         self.store.commit(batch).await?;
//!         Ok(())
//!     }
//! }
//! ```

use async_trait::async_trait;
use std::collections::HashSet;

use core_kernel::{
    BillingMonth, Currency, DomainPort, EnrollmentId, InvoiceId, Money, PortError,
    SettlementId, StudentId,
};

use crate::enrollment::{Enrollment, Student};
use crate::invoice::Invoice;
use crate::ledger::{LedgerEntry, LedgerPage, LedgerTotals};
use crate::settlement::Settlement;

/// A row read together with its store version
///
/// Versions increment on every update; an update staged against a stale
/// version is rejected at commit time.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub version: u64,
    pub data: T,
}

impl<T> Versioned<T> {
    pub fn new(version: u64, data: T) -> Self {
        Self { version, data }
    }
}

/// A single operation inside a write batch
#[derive(Debug, Clone)]
pub enum WriteOp {
    /// Insert a new settlement row; fails on a duplicate
    /// (enrollment, month) key
    CreateSettlement(Settlement),
    /// Replace a settlement row if its version still matches
    UpdateSettlement {
        expected_version: u64,
        settlement: Settlement,
    },
    /// Remove a settlement row; fails if the row is gone
    DeleteSettlement(SettlementId),
    /// Insert a new invoice
    CreateInvoice(Invoice),
    /// Remove an invoice; fails if the invoice is gone
    DeleteInvoice(InvoiceId),
    /// Append a row to the income/expense journal
    AppendLedgerEntry(LedgerEntry),
}

/// An all-or-nothing group of write operations
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_settlement(mut self, settlement: Settlement) -> Self {
        self.ops.push(WriteOp::CreateSettlement(settlement));
        self
    }

    pub fn update_settlement(mut self, expected_version: u64, settlement: Settlement) -> Self {
        self.ops.push(WriteOp::UpdateSettlement {
            expected_version,
            settlement,
        });
        self
    }

    pub fn delete_settlement(mut self, id: SettlementId) -> Self {
        self.ops.push(WriteOp::DeleteSettlement(id));
        self
    }

    pub fn create_invoice(mut self, invoice: Invoice) -> Self {
        self.ops.push(WriteOp::CreateInvoice(invoice));
        self
    }

    pub fn delete_invoice(mut self, id: InvoiceId) -> Self {
        self.ops.push(WriteOp::DeleteInvoice(id));
        self
    }

    pub fn append_ledger_entry(mut self, entry: LedgerEntry) -> Self {
        self.ops.push(WriteOp::AppendLedgerEntry(entry));
        self
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Read access to enrollments, owned by the roster subsystem
#[async_trait]
pub trait EnrollmentSource: DomainPort {
    /// Retrieves an enrollment by id, active or not
    async fn get_enrollment(&self, id: EnrollmentId) -> Result<Enrollment, PortError>;

    /// All active enrollments of one student
    async fn active_enrollments_for_student(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<Enrollment>, PortError>;

    /// Every active enrollment across the roster
    async fn all_active_enrollments(&self) -> Result<Vec<Enrollment>, PortError>;
}

/// Read access to students, owned by the roster subsystem
#[async_trait]
pub trait StudentSource: DomainPort {
    async fn get_student(&self, id: StudentId) -> Result<Student, PortError>;

    async fn list_active_students(&self) -> Result<Vec<Student>, PortError>;

    async fn count_active_students(&self) -> Result<u64, PortError>;
}

/// The tuition store: settlements, invoices, and the journal
///
/// Reads are snapshots; the only write path is [`TuitionStore::commit`].
#[async_trait]
pub trait TuitionStore: DomainPort {
    // ========================================================================
    // Settlement reads
    // ========================================================================

    /// All settlement rows of one enrollment with their versions,
    /// ordered by month
    async fn settlements_for_enrollment(
        &self,
        enrollment_id: EnrollmentId,
    ) -> Result<Vec<Versioned<Settlement>>, PortError>;

    /// All settlement rows of one student across enrollments,
    /// ordered by month
    async fn settlements_for_student(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<Settlement>, PortError>;

    /// All settlement rows for one billing month
    async fn settlements_in_month(
        &self,
        month: BillingMonth,
    ) -> Result<Vec<Settlement>, PortError>;

    /// Sum of `amount_paid` over rows of one billing month
    async fn collected_in_month(
        &self,
        month: BillingMonth,
        currency: Currency,
    ) -> Result<Money, PortError>;

    /// Sum of `amount_paid` over every settlement row
    async fn total_collected(&self, currency: Currency) -> Result<Money, PortError>;

    /// Students that have at least one settlement row in the inclusive
    /// month range
    async fn students_with_settlements_in_range(
        &self,
        from: BillingMonth,
        to: BillingMonth,
    ) -> Result<HashSet<StudentId>, PortError>;

    // ========================================================================
    // Invoice reads
    // ========================================================================

    async fn get_invoice(&self, id: InvoiceId) -> Result<Invoice, PortError>;

    async fn invoices_for_student(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<Invoice>, PortError>;

    // ========================================================================
    // Ledger reads
    // ========================================================================

    /// One page of journal entries, newest first; `page` is 1-based
    async fn ledger_page(&self, page: u32, per_page: u32) -> Result<LedgerPage, PortError>;

    /// Income and expense totals over the whole journal
    async fn ledger_totals(&self, currency: Currency) -> Result<LedgerTotals, PortError>;

    // ========================================================================
    // Writes
    // ========================================================================

    /// Applies a batch atomically, or not at all
    ///
    /// Unique-key collisions, stale versions, and deletes of missing rows
    /// all surface as `PortError::Conflict` and leave the store untouched.
    async fn commit(&self, batch: WriteBatch) -> Result<(), PortError>;
}

/// In-memory mock backends for testing
///
/// These adapters keep everything in process memory and are useful for
/// exercising services without wiring up the store crate.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// In-memory roster holding students and enrollments
    #[derive(Debug, Default)]
    pub struct MockRoster {
        students: Arc<RwLock<HashMap<StudentId, Student>>>,
        enrollments: Arc<RwLock<HashMap<EnrollmentId, Enrollment>>>,
    }

    impl MockRoster {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn add_student(&self, student: Student) {
            self.students.write().await.insert(student.id, student);
        }

        pub async fn add_enrollment(&self, enrollment: Enrollment) {
            self.enrollments
                .write()
                .await
                .insert(enrollment.id, enrollment);
        }

        pub async fn deactivate_enrollment(&self, id: EnrollmentId) {
            if let Some(enrollment) = self.enrollments.write().await.get_mut(&id) {
                enrollment.deactivate();
            }
        }
    }

    impl DomainPort for MockRoster {}

    #[async_trait]
    impl EnrollmentSource for MockRoster {
        async fn get_enrollment(&self, id: EnrollmentId) -> Result<Enrollment, PortError> {
            self.enrollments
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Enrollment", id))
        }

        async fn active_enrollments_for_student(
            &self,
            student_id: StudentId,
        ) -> Result<Vec<Enrollment>, PortError> {
            let mut rows: Vec<_> = self
                .enrollments
                .read()
                .await
                .values()
                .filter(|e| e.student_id == student_id && e.active)
                .cloned()
                .collect();
            rows.sort_by(|a, b| a.enrolled_on.cmp(&b.enrolled_on));
            Ok(rows)
        }

        async fn all_active_enrollments(&self) -> Result<Vec<Enrollment>, PortError> {
            Ok(self
                .enrollments
                .read()
                .await
                .values()
                .filter(|e| e.active)
                .cloned()
                .collect())
        }
    }

    #[async_trait]
    impl StudentSource for MockRoster {
        async fn get_student(&self, id: StudentId) -> Result<Student, PortError> {
            self.students
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Student", id))
        }

        async fn list_active_students(&self) -> Result<Vec<Student>, PortError> {
            Ok(self
                .students
                .read()
                .await
                .values()
                .filter(|s| s.active)
                .cloned()
                .collect())
        }

        async fn count_active_students(&self) -> Result<u64, PortError> {
            Ok(self
                .students
                .read()
                .await
                .values()
                .filter(|s| s.active)
                .count() as u64)
        }
    }

    #[derive(Debug, Clone, Default)]
    struct MockState {
        settlements: HashMap<SettlementId, Versioned<Settlement>>,
        invoices: HashMap<InvoiceId, Invoice>,
        ledger: Vec<LedgerEntry>,
    }

    /// In-memory tuition store with versioned, atomic commits
    #[derive(Debug, Default)]
    pub struct MockTuitionStore {
        state: Arc<RwLock<MockState>>,
    }

    impl MockTuitionStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Bumps the version of a settlement row, simulating a concurrent
        /// writer between snapshot and commit
        pub async fn bump_version(&self, id: SettlementId) {
            if let Some(row) = self.state.write().await.settlements.get_mut(&id) {
                row.version += 1;
            }
        }

        fn apply(state: &mut MockState, op: WriteOp) -> Result<(), PortError> {
            match op {
                WriteOp::CreateSettlement(settlement) => {
                    let duplicate = state
                        .settlements
                        .values()
                        .any(|row| row.data.key() == settlement.key());
                    if duplicate {
                        return Err(PortError::conflict(format!(
                            "settlement already exists for enrollment {} in {}",
                            settlement.enrollment_id, settlement.month
                        )));
                    }
                    state
                        .settlements
                        .insert(settlement.id, Versioned::new(1, settlement));
                    Ok(())
                }
                WriteOp::UpdateSettlement {
                    expected_version,
                    settlement,
                } => {
                    let row = state.settlements.get_mut(&settlement.id).ok_or_else(|| {
                        PortError::conflict(format!(
                            "settlement {} disappeared before commit",
                            settlement.id
                        ))
                    })?;
                    if row.version != expected_version {
                        return Err(PortError::conflict(format!(
                            "settlement {} version {} does not match expected {}",
                            settlement.id, row.version, expected_version
                        )));
                    }
                    *row = Versioned::new(expected_version + 1, settlement);
                    Ok(())
                }
                WriteOp::DeleteSettlement(id) => {
                    state.settlements.remove(&id).map(|_| ()).ok_or_else(|| {
                        PortError::conflict(format!(
                            "settlement {} disappeared before commit",
                            id
                        ))
                    })
                }
                WriteOp::CreateInvoice(invoice) => {
                    state.invoices.insert(invoice.id, invoice);
                    Ok(())
                }
                WriteOp::DeleteInvoice(id) => {
                    state.invoices.remove(&id).map(|_| ()).ok_or_else(|| {
                        PortError::conflict(format!("invoice {} disappeared before commit", id))
                    })
                }
                WriteOp::AppendLedgerEntry(entry) => {
                    state.ledger.push(entry);
                    Ok(())
                }
            }
        }
    }

    impl DomainPort for MockTuitionStore {}

    #[async_trait]
    impl TuitionStore for MockTuitionStore {
        async fn settlements_for_enrollment(
            &self,
            enrollment_id: EnrollmentId,
        ) -> Result<Vec<Versioned<Settlement>>, PortError> {
            let state = self.state.read().await;
            let mut rows: Vec<_> = state
                .settlements
                .values()
                .filter(|row| row.data.enrollment_id == enrollment_id)
                .cloned()
                .collect();
            rows.sort_by_key(|row| row.data.month);
            Ok(rows)
        }

        async fn settlements_for_student(
            &self,
            student_id: StudentId,
        ) -> Result<Vec<Settlement>, PortError> {
            let state = self.state.read().await;
            let mut rows: Vec<_> = state
                .settlements
                .values()
                .filter(|row| row.data.student_id == student_id)
                .map(|row| row.data.clone())
                .collect();
            rows.sort_by_key(|row| row.month);
            Ok(rows)
        }

        async fn settlements_in_month(
            &self,
            month: BillingMonth,
        ) -> Result<Vec<Settlement>, PortError> {
            let state = self.state.read().await;
            Ok(state
                .settlements
                .values()
                .filter(|row| row.data.month == month)
                .map(|row| row.data.clone())
                .collect())
        }

        async fn collected_in_month(
            &self,
            month: BillingMonth,
            currency: Currency,
        ) -> Result<Money, PortError> {
            let state = self.state.read().await;
            let mut total = Money::zero(currency);
            for row in state.settlements.values() {
                if row.data.month == month {
                    total = total
                        .checked_add(&row.data.amount_paid)
                        .map_err(|e| PortError::internal(e.to_string()))?;
                }
            }
            Ok(total)
        }

        async fn total_collected(&self, currency: Currency) -> Result<Money, PortError> {
            let state = self.state.read().await;
            let mut total = Money::zero(currency);
            for row in state.settlements.values() {
                total = total
                    .checked_add(&row.data.amount_paid)
                    .map_err(|e| PortError::internal(e.to_string()))?;
            }
            Ok(total)
        }

        async fn students_with_settlements_in_range(
            &self,
            from: BillingMonth,
            to: BillingMonth,
        ) -> Result<HashSet<StudentId>, PortError> {
            let state = self.state.read().await;
            Ok(state
                .settlements
                .values()
                .filter(|row| row.data.month >= from && row.data.month <= to)
                .map(|row| row.data.student_id)
                .collect())
        }

        async fn get_invoice(&self, id: InvoiceId) -> Result<Invoice, PortError> {
            self.state
                .read()
                .await
                .invoices
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Invoice", id))
        }

        async fn invoices_for_student(
            &self,
            student_id: StudentId,
        ) -> Result<Vec<Invoice>, PortError> {
            let state = self.state.read().await;
            let mut invoices: Vec<_> = state
                .invoices
                .values()
                .filter(|inv| inv.student_id == student_id)
                .cloned()
                .collect();
            invoices.sort_by_key(|inv| inv.created_at);
            Ok(invoices)
        }

        async fn ledger_page(
            &self,
            page: u32,
            per_page: u32,
        ) -> Result<LedgerPage, PortError> {
            if page == 0 {
                return Err(PortError::validation_field("page must be at least 1", "page"));
            }
            let state = self.state.read().await;
            let total_entries = state.ledger.len() as u64;
            let entries = state
                .ledger
                .iter()
                .rev()
                .skip(((page - 1) as usize) * per_page as usize)
                .take(per_page as usize)
                .cloned()
                .collect();
            Ok(LedgerPage {
                entries,
                page,
                per_page,
                total_entries,
            })
        }

        async fn ledger_totals(&self, currency: Currency) -> Result<LedgerTotals, PortError> {
            let state = self.state.read().await;
            let mut income = Money::zero(currency);
            let mut expense = Money::zero(currency);
            for entry in &state.ledger {
                match entry.kind {
                    crate::ledger::EntryKind::Income => {
                        income = income
                            .checked_add(&entry.amount)
                            .map_err(|e| PortError::internal(e.to_string()))?;
                    }
                    crate::ledger::EntryKind::Expense => {
                        expense = expense
                            .checked_add(&entry.amount)
                            .map_err(|e| PortError::internal(e.to_string()))?;
                    }
                }
            }
            Ok(LedgerTotals { income, expense })
        }

        async fn commit(&self, batch: WriteBatch) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            // Apply against a copy so a mid-batch failure leaves the store
            // untouched.
            let mut staged = state.clone();
            for op in batch.into_ops() {
                Self::apply(&mut staged, op)?;
            }
            *state = staged;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{MockRoster, MockTuitionStore};
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn bdt(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::BDT)
    }

    fn sample_settlement(month: u32) -> Settlement {
        Settlement::unpaid(
            StudentId::new_v7(),
            EnrollmentId::new_v7(),
            BillingMonth::new(2025, month).unwrap(),
            bdt(dec!(500)),
        )
    }

    #[tokio::test]
    async fn test_mock_roster_filters_inactive() {
        let roster = MockRoster::new();
        let student = Student::new("Karim", NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        let student_id = student.id;
        roster.add_student(student).await;

        let enrollment = Enrollment::new(
            student_id,
            "Math",
            "5:00 PM",
            bdt(dec!(500)),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        );
        let enrollment_id = enrollment.id;
        roster.add_enrollment(enrollment).await;

        assert_eq!(
            roster
                .active_enrollments_for_student(student_id)
                .await
                .unwrap()
                .len(),
            1
        );

        roster.deactivate_enrollment(enrollment_id).await;
        assert!(roster
            .active_enrollments_for_student(student_id)
            .await
            .unwrap()
            .is_empty());

        // Inactive enrollments stay fetchable by id.
        assert!(roster.get_enrollment(enrollment_id).await.is_ok());
    }

    #[tokio::test]
    async fn test_commit_rejects_duplicate_settlement_key() {
        let store = MockTuitionStore::new();
        let first = sample_settlement(0);
        let mut second = sample_settlement(0);
        second.enrollment_id = first.enrollment_id;

        store
            .commit(WriteBatch::new().create_settlement(first))
            .await
            .unwrap();

        let err = store
            .commit(WriteBatch::new().create_settlement(second))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_commit_rejects_stale_version() {
        let store = MockTuitionStore::new();
        let row = sample_settlement(1);
        let enrollment_id = row.enrollment_id;

        store
            .commit(WriteBatch::new().create_settlement(row))
            .await
            .unwrap();

        let snapshot = store
            .settlements_for_enrollment(enrollment_id)
            .await
            .unwrap();
        let versioned = &snapshot[0];
        store.bump_version(versioned.data.id).await;

        let err = store
            .commit(
                WriteBatch::new()
                    .update_settlement(versioned.version, versioned.data.clone()),
            )
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_failed_batch_leaves_store_untouched() {
        let store = MockTuitionStore::new();
        let existing = sample_settlement(2);
        let dup_key = Settlement {
            id: SettlementId::new_v7(),
            ..existing.clone()
        };

        store
            .commit(WriteBatch::new().create_settlement(existing.clone()))
            .await
            .unwrap();

        // Ledger append would succeed, but the duplicate create poisons
        // the whole batch.
        let entry = LedgerEntry::income("should not land", bdt(dec!(100)));
        let err = store
            .commit(
                WriteBatch::new()
                    .append_ledger_entry(entry)
                    .create_settlement(dup_key),
            )
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        let totals = store.ledger_totals(Currency::BDT).await.unwrap();
        assert!(totals.income.is_zero());
    }

    #[tokio::test]
    async fn test_ledger_page_is_newest_first() {
        let store = MockTuitionStore::new();
        for i in 1..=3 {
            store
                .commit(WriteBatch::new().append_ledger_entry(LedgerEntry::income(
                    format!("entry {}", i),
                    bdt(dec!(100)),
                )))
                .await
                .unwrap();
        }

        let page = store.ledger_page(1, 2).await.unwrap();
        assert_eq!(page.entries.len(), 2);
        assert_eq!(page.entries[0].title, "entry 3");
        assert_eq!(page.total_entries, 3);
        assert_eq!(page.total_pages(), 2);
    }
}
