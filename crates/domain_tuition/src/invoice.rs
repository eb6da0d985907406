//! Payment invoices
//!
//! An invoice is the immutable receipt for one collection call. It records
//! which settlement rows the call created or topped up, and it owns them:
//! reversing the invoice removes the invoice and every owned row in one
//! atomic step, never a subset.

use chrono::{DateTime, Utc};
use core_kernel::{BillingMonth, InvoiceId, Money, SettlementId, StudentId};
use serde::{Deserialize, Serialize};

/// Receipt for a single payment collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub student_id: StudentId,
    /// Months the payment landed on, oldest first
    pub months: Vec<BillingMonth>,
    /// Gross amount collected by this call
    pub amount: Money,
    /// The enrollment's outstanding due immediately before this call
    pub due_snapshot: Money,
    /// Settlement rows this invoice owns
    pub payment_ids: Vec<SettlementId>,
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    pub fn new(
        student_id: StudentId,
        months: Vec<BillingMonth>,
        amount: Money,
        due_snapshot: Money,
        payment_ids: Vec<SettlementId>,
    ) -> Self {
        Self {
            id: InvoiceId::new_v7(),
            student_id,
            months,
            amount,
            due_snapshot,
            payment_ids,
            created_at: Utc::now(),
        }
    }

    /// Display labels for the covered months, e.g. ["January 2025", "February 2025"]
    pub fn month_labels(&self) -> Vec<String> {
        self.months.iter().map(|m| m.label()).collect()
    }
}
