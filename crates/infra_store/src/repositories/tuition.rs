//! Tuition store repository implementation
//!
//! This module adapts the document store to the `TuitionStore` port:
//! snapshot reads over settlement rows, invoice and ledger lookups, and
//! the single atomic write path through the engine's commit.

use std::collections::HashSet;

use async_trait::async_trait;

use core_kernel::{
    BillingMonth, Currency, DomainPort, EnrollmentId, InvoiceId, Money, PortError, StudentId,
};
use domain_tuition::ledger::EntryKind;
use domain_tuition::{
    Invoice, LedgerPage, LedgerTotals, Settlement, TuitionStore, Versioned, WriteBatch,
};

use crate::store::MemoryStore;

/// Repository for settlements, invoices, and the ledger
#[derive(Clone)]
pub struct TuitionRepository {
    store: MemoryStore,
}

impl TuitionRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

impl DomainPort for TuitionRepository {}

#[async_trait]
impl TuitionStore for TuitionRepository {
    async fn settlements_for_enrollment(
        &self,
        enrollment_id: EnrollmentId,
    ) -> Result<Vec<Versioned<Settlement>>, PortError> {
        let state = self.store.read().await;
        let mut rows: Vec<Versioned<Settlement>> = state
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
        let state = self.store.read().await;
        let mut rows: Vec<Settlement> = state
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
        let state = self.store.read().await;
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
        let state = self.store.read().await;
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
        let state = self.store.read().await;
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
        let state = self.store.read().await;
        Ok(state
            .settlements
            .values()
            .filter(|row| row.data.month >= from && row.data.month <= to)
            .map(|row| row.data.student_id)
            .collect())
    }

    async fn get_invoice(&self, id: InvoiceId) -> Result<Invoice, PortError> {
        let state = self.store.read().await;
        state
            .invoices
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Invoice", id))
    }

    async fn invoices_for_student(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<Invoice>, PortError> {
        let state = self.store.read().await;
        let mut invoices: Vec<Invoice> = state
            .invoices
            .values()
            .filter(|invoice| invoice.student_id == student_id)
            .cloned()
            .collect();
        invoices.sort_by_key(|invoice| invoice.created_at);
        Ok(invoices)
    }

    async fn ledger_page(&self, page: u32, per_page: u32) -> Result<LedgerPage, PortError> {
        if page == 0 {
            return Err(PortError::validation_field("page must be at least 1", "page"));
        }
        let state = self.store.read().await;
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
        let state = self.store.read().await;
        let mut income = Money::zero(currency);
        let mut expense = Money::zero(currency);
        for entry in &state.ledger {
            match entry.kind {
                EntryKind::Income => {
                    income = income
                        .checked_add(&entry.amount)
                        .map_err(|e| PortError::internal(e.to_string()))?;
                }
                EntryKind::Expense => {
                    expense = expense
                        .checked_add(&entry.amount)
                        .map_err(|e| PortError::internal(e.to_string()))?;
                }
            }
        }
        Ok(LedgerTotals { income, expense })
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), PortError> {
        self.store.commit(batch).await.map_err(PortError::from)
    }
}
