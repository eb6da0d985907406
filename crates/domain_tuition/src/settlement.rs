//! Monthly tuition settlements
//!
//! A settlement is the per-month account of one enrollment: the fee that
//! month, what has been paid against it, and any discount granted. There is
//! at most one settlement row per (enrollment, month); repeated payments
//! fold into the same row. Rows are only ever removed by invoice reversal.

use chrono::{DateTime, Utc};
use core_kernel::{BillingMonth, EnrollmentId, Money, MoneyError, SettlementId, StudentId};
use serde::{Deserialize, Serialize};

/// How a payment was handed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    BankTransfer,
    Card,
    MobileWallet,
    Check,
}

/// Settlement state of a single month
///
/// Transitions are monotone: Unpaid → Partial → Paid. Nothing lowers a
/// status except deleting the row through invoice reversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementStatus {
    Unpaid,
    Partial,
    Paid,
}

impl SettlementStatus {
    /// Derives the status from the month's amounts
    ///
    /// Paid when payments plus discount cover the fee, Partial when any
    /// payment has landed, Unpaid otherwise. A full-fee discount with no
    /// payment still counts as Paid.
    pub fn for_amounts(
        fee: &Money,
        paid: &Money,
        discount: &Money,
    ) -> Result<Self, MoneyError> {
        let covered = paid.checked_add(discount)?;
        let shortfall = fee.checked_sub(&covered)?;
        if !shortfall.is_positive() {
            Ok(SettlementStatus::Paid)
        } else if paid.is_positive() {
            Ok(SettlementStatus::Partial)
        } else {
            Ok(SettlementStatus::Unpaid)
        }
    }

    pub fn is_paid(&self) -> bool {
        matches!(self, SettlementStatus::Paid)
    }
}

/// One enrollment-month on the tuition ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub id: SettlementId,
    pub student_id: StudentId,
    pub enrollment_id: EnrollmentId,
    pub month: BillingMonth,
    /// The enrollment's monthly fee frozen at settlement time
    pub fee_at_settlement: Money,
    pub amount_paid: Money,
    pub discount: Money,
    pub status: SettlementStatus,
    pub payment_date: Option<DateTime<Utc>>,
    pub method: Option<PaymentMethod>,
    pub transaction_ref: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Settlement {
    /// Creates an unpaid placeholder row for a month with no payments yet
    pub fn unpaid(
        student_id: StudentId,
        enrollment_id: EnrollmentId,
        month: BillingMonth,
        fee: Money,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: SettlementId::new_v7(),
            student_id,
            enrollment_id,
            month,
            fee_at_settlement: fee,
            amount_paid: Money::zero(fee.currency()),
            discount: Money::zero(fee.currency()),
            status: SettlementStatus::Unpaid,
            payment_date: None,
            method: None,
            transaction_ref: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The unique key a store enforces for settlement rows
    pub fn key(&self) -> (EnrollmentId, BillingMonth) {
        (self.enrollment_id, self.month)
    }

    /// Tuition still owed for this month, floored at zero
    pub fn outstanding(&self) -> Result<Money, MoneyError> {
        self.fee_at_settlement
            .saturating_sub(&self.amount_paid)?
            .saturating_sub(&self.discount)
    }

    /// Records a payment against this month and re-derives the status
    pub fn receive(&mut self, amount: Money, paid_at: DateTime<Utc>) -> Result<(), MoneyError> {
        self.amount_paid = self.amount_paid.checked_add(&amount)?;
        self.payment_date = Some(paid_at);
        self.refresh_status()
    }

    /// Grants an additional discount on this month and re-derives the status
    pub fn add_discount(&mut self, amount: Money) -> Result<(), MoneyError> {
        self.discount = self.discount.checked_add(&amount)?;
        self.refresh_status()
    }

    /// Stamps how the latest payment arrived
    pub fn attach_payment_details(
        &mut self,
        method: Option<PaymentMethod>,
        transaction_ref: Option<String>,
        notes: Option<String>,
    ) {
        if method.is_some() {
            self.method = method;
        }
        if transaction_ref.is_some() {
            self.transaction_ref = transaction_ref;
        }
        if notes.is_some() {
            self.notes = notes;
        }
        self.updated_at = Utc::now();
    }

    fn refresh_status(&mut self) -> Result<(), MoneyError> {
        self.status = SettlementStatus::for_amounts(
            &self.fee_at_settlement,
            &self.amount_paid,
            &self.discount,
        )?;
        self.updated_at = Utc::now();
        Ok(())
    }
}
