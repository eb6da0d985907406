//! In-memory document store
//!
//! A single shared store backs the whole deployment: versioned
//! settlement rows with a unique (enrollment, month) key, invoices, the
//! income/expense journal, and the student roster. Clones share the same
//! state the way a connection pool handle would.
//!
//! All ledger writes arrive as a [`WriteBatch`] through [`MemoryStore::commit`].
//! A commit stages the whole batch against a copy of the state and swaps
//! it in only when every operation validated, so a failure at any point
//! leaves the live store exactly as it was.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::time::timeout;

use core_kernel::{BillingMonth, EnrollmentId, InvoiceId, SettlementId, StudentId};
use domain_tuition::{
    Enrollment, Invoice, LedgerEntry, Settlement, Student, Versioned, WriteBatch, WriteOp,
};

use crate::error::StoreError;

/// Tuning for the store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Upper bound for one commit, lock wait included
    pub write_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            write_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct StoreState {
    pub(crate) settlements: HashMap<SettlementId, Versioned<Settlement>>,
    pub(crate) settlement_keys: HashMap<(EnrollmentId, BillingMonth), SettlementId>,
    pub(crate) invoices: HashMap<InvoiceId, Invoice>,
    pub(crate) ledger: Vec<LedgerEntry>,
    pub(crate) students: HashMap<StudentId, Student>,
    pub(crate) enrollments: HashMap<EnrollmentId, Enrollment>,
}

/// Shared in-memory document store
///
/// Cheap to clone; every clone points at the same state.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<RwLock<StoreState>>,
    config: StoreConfig,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(StoreState::default())),
            config,
        }
    }

    pub(crate) async fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.inner.read().await
    }

    pub(crate) async fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.inner.write().await
    }

    /// Applies a batch as one unit, bounded by the write timeout
    ///
    /// Either every operation lands or none do. Duplicate keys, stale
    /// versions, and vanished rows reject the whole batch.
    pub async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let ops = batch.into_ops();
        if ops.is_empty() {
            return Ok(());
        }
        let op_count = ops.len();

        match timeout(self.config.write_timeout, self.apply(ops)).await {
            Ok(Ok(())) => {
                tracing::debug!(ops = op_count, "batch committed");
                Ok(())
            }
            Ok(Err(err)) => {
                tracing::debug!(ops = op_count, error = %err, "batch rejected");
                Err(err)
            }
            Err(_) => Err(StoreError::timeout(
                "commit",
                self.config.write_timeout.as_millis() as u64,
            )),
        }
    }

    async fn apply(&self, ops: Vec<WriteOp>) -> Result<(), StoreError> {
        let mut state = self.inner.write().await;
        // Stage against a copy so a mid-batch failure leaves the live
        // state untouched.
        let mut staged = state.clone();
        for op in ops {
            Self::apply_op(&mut staged, op)?;
        }
        *state = staged;
        Ok(())
    }

    fn apply_op(state: &mut StoreState, op: WriteOp) -> Result<(), StoreError> {
        match op {
            WriteOp::CreateSettlement(settlement) => {
                let key = (settlement.enrollment_id, settlement.month);
                if state.settlement_keys.contains_key(&key) {
                    return Err(StoreError::duplicate_key(format!(
                        "enrollment {} already has a row for {}",
                        settlement.enrollment_id, settlement.month
                    )));
                }
                if state.settlements.contains_key(&settlement.id) {
                    return Err(StoreError::duplicate_key(format!(
                        "settlement id {} already exists",
                        settlement.id
                    )));
                }
                state.settlement_keys.insert(key, settlement.id);
                state
                    .settlements
                    .insert(settlement.id, Versioned::new(1, settlement));
            }
            WriteOp::UpdateSettlement {
                expected_version,
                settlement,
            } => {
                let current = state.settlements.get(&settlement.id).ok_or_else(|| {
                    StoreError::missing_row(format!("settlement {} is gone", settlement.id))
                })?;
                if current.version != expected_version {
                    return Err(StoreError::version_conflict(format!(
                        "settlement {} is at version {}, batch expected {}",
                        settlement.id, current.version, expected_version
                    )));
                }
                let old_key = (current.data.enrollment_id, current.data.month);
                let new_key = (settlement.enrollment_id, settlement.month);
                if new_key != old_key {
                    if state.settlement_keys.contains_key(&new_key) {
                        return Err(StoreError::duplicate_key(format!(
                            "enrollment {} already has a row for {}",
                            settlement.enrollment_id, settlement.month
                        )));
                    }
                    state.settlement_keys.remove(&old_key);
                    state.settlement_keys.insert(new_key, settlement.id);
                }
                state
                    .settlements
                    .insert(settlement.id, Versioned::new(expected_version + 1, settlement));
            }
            WriteOp::DeleteSettlement(id) => {
                let row = state
                    .settlements
                    .remove(&id)
                    .ok_or_else(|| StoreError::missing_row(format!("settlement {} is gone", id)))?;
                state
                    .settlement_keys
                    .remove(&(row.data.enrollment_id, row.data.month));
            }
            WriteOp::CreateInvoice(invoice) => {
                if state.invoices.contains_key(&invoice.id) {
                    return Err(StoreError::duplicate_key(format!(
                        "invoice id {} already exists",
                        invoice.id
                    )));
                }
                state.invoices.insert(invoice.id, invoice);
            }
            WriteOp::DeleteInvoice(id) => {
                if state.invoices.remove(&id).is_none() {
                    return Err(StoreError::missing_row(format!("invoice {} is gone", id)));
                }
            }
            WriteOp::AppendLedgerEntry(entry) => {
                state.ledger.push(entry);
            }
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}
