//! Payment allocation
//!
//! A lump-sum payment walks the enrollment's months oldest-first: unpaid
//! and partial months up to the current month are settled in order, and
//! whatever is left runs forward into advance months until every unit of
//! the payment has landed. The allocator is a pure planner: it stages row
//! creates and version-checked updates without touching the store, so the
//! service layer can commit the whole plan atomically and replan on
//! conflict.

use chrono::{DateTime, Utc};
use core_kernel::{BillingMonth, Money, SettlementId};
use std::collections::BTreeMap;

use crate::enrollment::Enrollment;
use crate::error::TuitionError;
use crate::ports::Versioned;
use crate::settlement::{PaymentMethod, Settlement, SettlementStatus};

/// One collection call against a single enrollment
#[derive(Debug, Clone)]
pub struct AllocationRequest {
    /// Gross amount handed over, spread across months by the allocator
    pub amount: Money,
    /// One-shot discount, granted in full to the first month the call
    /// touches
    pub discount: Money,
    pub method: Option<PaymentMethod>,
    pub transaction_ref: Option<String>,
    pub notes: Option<String>,
    pub paid_at: DateTime<Utc>,
}

impl AllocationRequest {
    pub fn new(amount: Money, discount: Money) -> Self {
        Self {
            amount,
            discount,
            method: None,
            transaction_ref: None,
            notes: None,
            paid_at: Utc::now(),
        }
    }

    pub fn with_method(mut self, method: PaymentMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn with_transaction_ref(mut self, transaction_ref: impl Into<String>) -> Self {
        self.transaction_ref = Some(transaction_ref.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_paid_at(mut self, paid_at: DateTime<Utc>) -> Self {
        self.paid_at = paid_at;
        self
    }

    /// Rejects bad requests before any planning happens
    fn validate(&self, fee: &Money) -> Result<(), TuitionError> {
        if !self.amount.is_positive() {
            return Err(TuitionError::validation("payment amount must be positive"));
        }
        if self.discount.is_negative() {
            return Err(TuitionError::validation("discount cannot be negative"));
        }
        if self.amount.currency() != fee.currency()
            || self.discount.currency() != fee.currency()
        {
            return Err(TuitionError::validation(format!(
                "payment currency must match the enrollment fee currency {}",
                fee.currency()
            )));
        }
        if self.discount > self.amount {
            return Err(TuitionError::validation(
                "discount cannot exceed the payment amount",
            ));
        }
        Ok(())
    }
}

/// What one month received from this call
#[derive(Debug, Clone, PartialEq)]
pub struct MonthAllocation {
    pub month: BillingMonth,
    /// Cash landed on the month by this call
    pub applied: Money,
    /// Discount granted to the month by this call
    pub discount_granted: Money,
    /// Status of the row after this call
    pub status: SettlementStatus,
}

/// Summary of a planned allocation
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationOutcome {
    /// Gross amount of the call; every unit of it lands on some month
    pub total_processed: Money,
    pub created_count: usize,
    pub updated_count: usize,
    /// Months touched by the call, oldest first
    pub months: Vec<MonthAllocation>,
}

/// An update staged against a specific row version
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementUpdate {
    pub expected_version: u64,
    pub settlement: Settlement,
}

/// The staged writes for one collection call
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationPlan {
    pub creates: Vec<Settlement>,
    pub updates: Vec<SettlementUpdate>,
    pub outcome: AllocationOutcome,
}

impl AllocationPlan {
    /// Ids of every settlement row the plan writes, ordered by month
    pub fn settlement_ids(&self) -> Vec<SettlementId> {
        let mut rows: Vec<(BillingMonth, SettlementId)> = self
            .creates
            .iter()
            .map(|s| (s.month, s.id))
            .chain(self.updates.iter().map(|u| (u.settlement.month, u.settlement.id)))
            .collect();
        rows.sort_by_key(|(month, _)| *month);
        rows.into_iter().map(|(_, id)| id).collect()
    }

    /// Months the plan touches, oldest first
    pub fn months(&self) -> Vec<BillingMonth> {
        self.outcome.months.iter().map(|m| m.month).collect()
    }
}

/// Plans how a lump-sum payment spreads across an enrollment's months
pub struct PaymentAllocator;

impl PaymentAllocator {
    /// Plans the allocation of one payment against a settlement snapshot
    ///
    /// `snapshot` must hold every settlement row of the enrollment,
    /// including advance rows beyond `current_month`.
    pub fn plan(
        enrollment: &Enrollment,
        snapshot: &[Versioned<Settlement>],
        current_month: BillingMonth,
        request: &AllocationRequest,
    ) -> Result<AllocationPlan, TuitionError> {
        request.validate(&enrollment.monthly_fee)?;
        if !enrollment.monthly_fee.is_positive() {
            return Err(TuitionError::validation(
                "enrollment monthly fee must be positive",
            ));
        }

        let by_month: BTreeMap<BillingMonth, &Versioned<Settlement>> =
            snapshot.iter().map(|v| (v.data.month, v)).collect();

        let mut remaining = request.amount;
        let mut discount_slot = Some(request.discount).filter(|d| d.is_positive());
        let mut creates: Vec<Settlement> = Vec::new();
        let mut updates: Vec<SettlementUpdate> = Vec::new();
        let mut months: Vec<MonthAllocation> = Vec::new();

        // Oldest-first sweep over owed months up to the current one.
        for month in BillingMonth::range(enrollment.start_month(), current_month) {
            if !remaining.is_positive() {
                break;
            }
            match by_month.get(&month) {
                Some(existing) if existing.data.status.is_paid() => continue,
                Some(existing) => {
                    let mut row = existing.data.clone();
                    if let Some(allocation) = Self::allocate_into(
                        &mut row,
                        &mut remaining,
                        &mut discount_slot,
                        request,
                    )? {
                        months.push(allocation);
                        updates.push(SettlementUpdate {
                            expected_version: existing.version,
                            settlement: row,
                        });
                    }
                }
                None => {
                    let mut row = Settlement::unpaid(
                        enrollment.student_id,
                        enrollment.id,
                        month,
                        enrollment.monthly_fee,
                    );
                    if let Some(allocation) = Self::allocate_into(
                        &mut row,
                        &mut remaining,
                        &mut discount_slot,
                        request,
                    )? {
                        months.push(allocation);
                        creates.push(row);
                    }
                }
            }
        }

        // Whatever is left rolls forward into advance months.
        let mut cursor = current_month.next();
        while remaining.is_positive() {
            match by_month.get(&cursor) {
                Some(existing) if existing.data.status.is_paid() => {}
                Some(existing) => {
                    let mut row = existing.data.clone();
                    if let Some(allocation) = Self::allocate_into(
                        &mut row,
                        &mut remaining,
                        &mut discount_slot,
                        request,
                    )? {
                        months.push(allocation);
                        updates.push(SettlementUpdate {
                            expected_version: existing.version,
                            settlement: row,
                        });
                    }
                }
                None => {
                    let mut row = Settlement::unpaid(
                        enrollment.student_id,
                        enrollment.id,
                        cursor,
                        enrollment.monthly_fee,
                    );
                    if let Some(allocation) = Self::allocate_into(
                        &mut row,
                        &mut remaining,
                        &mut discount_slot,
                        request,
                    )? {
                        months.push(allocation);
                        creates.push(row);
                    }
                }
            }
            cursor = cursor.next();
        }

        let outcome = AllocationOutcome {
            total_processed: request.amount,
            created_count: creates.len(),
            updated_count: updates.len(),
            months,
        };

        Ok(AllocationPlan {
            creates,
            updates,
            outcome,
        })
    }

    /// Lands as much of the remaining cash as the month can take
    ///
    /// Grants the one-shot discount if the slot still holds it, then
    /// settles `min(remaining, outstanding)`. Returns None when the month
    /// took neither cash nor discount.
    fn allocate_into(
        row: &mut Settlement,
        remaining: &mut Money,
        discount_slot: &mut Option<Money>,
        request: &AllocationRequest,
    ) -> Result<Option<MonthAllocation>, TuitionError> {
        let currency = row.fee_at_settlement.currency();
        let mut granted = Money::zero(currency);

        if let Some(discount) = discount_slot.take() {
            row.add_discount(discount)?;
            granted = discount;
        }

        let needed = row.outstanding()?;
        let mut applied = Money::zero(currency);
        if needed.is_positive() && remaining.is_positive() {
            let settle = remaining.min(&needed)?;
            row.receive(settle, request.paid_at)?;
            row.attach_payment_details(
                request.method,
                request.transaction_ref.clone(),
                request.notes.clone(),
            );
            *remaining = remaining.checked_sub(&settle)?;
            applied = settle;
        }

        if applied.is_positive() || granted.is_positive() {
            Ok(Some(MonthAllocation {
                month: row.month,
                applied,
                discount_granted: granted,
                status: row.status,
            }))
        } else {
            Ok(None)
        }
    }
}
