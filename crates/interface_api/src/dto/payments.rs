//! Payment collection DTOs

use chrono::{DateTime, Utc};
use domain_tuition::{AllocationOutcome, Invoice, MonthAllocation, PaymentMethod, SettlementStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Body of `POST /payments`
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CollectPaymentRequest {
    pub student_id: Uuid,
    pub enrollment_id: Uuid,
    #[validate(custom(function = positive_amount))]
    pub amount: Decimal,
    #[validate(custom(function = non_negative_amount))]
    pub discount: Option<Decimal>,
    pub method: Option<PaymentMethod>,
    #[validate(length(max = 100, message = "transaction reference is too long"))]
    pub transaction_ref: Option<String>,
    #[validate(length(max = 500, message = "notes are too long"))]
    pub notes: Option<String>,
}

fn positive_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_positive() && !amount.is_zero() {
        Ok(())
    } else {
        Err(ValidationError::new("positive_amount").with_message("amount must be positive".into()))
    }
}

fn non_negative_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() {
        Err(ValidationError::new("non_negative_amount")
            .with_message("discount cannot be negative".into()))
    } else {
        Ok(())
    }
}

/// What one billing month received from the collection
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthAllocationDto {
    pub month: String,
    pub applied: Decimal,
    pub discount: Decimal,
    pub status: SettlementStatus,
}

impl From<&MonthAllocation> for MonthAllocationDto {
    fn from(allocation: &MonthAllocation) -> Self {
        Self {
            month: allocation.month.label(),
            applied: allocation.applied.amount(),
            discount: allocation.discount_granted.amount(),
            status: allocation.status,
        }
    }
}

/// Payload of a successful collection
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionData {
    pub invoice_id: Uuid,
    pub amount_processed: Decimal,
    pub due_before: Decimal,
    pub created_count: usize,
    pub updated_count: usize,
    pub months: Vec<MonthAllocationDto>,
    pub created_at: DateTime<Utc>,
}

impl CollectionData {
    pub fn from_parts(invoice: &Invoice, outcome: &AllocationOutcome) -> Self {
        Self {
            invoice_id: *invoice.id.as_uuid(),
            amount_processed: outcome.total_processed.amount(),
            due_before: invoice.due_snapshot.amount(),
            created_count: outcome.created_count,
            updated_count: outcome.updated_count,
            months: outcome.months.iter().map(MonthAllocationDto::from).collect(),
            created_at: invoice.created_at,
        }
    }
}

/// Payload of an invoice reversal
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReversalData {
    pub invoice_id: Uuid,
    pub amount_reversed: Decimal,
    pub months: Vec<String>,
}

impl From<&Invoice> for ReversalData {
    fn from(invoice: &Invoice) -> Self {
        Self {
            invoice_id: *invoice.id.as_uuid(),
            amount_reversed: invoice.amount.amount(),
            months: invoice.month_labels(),
        }
    }
}

/// The `{ success, data, message }` envelope payment routes answer with
#[derive(Debug, Serialize)]
pub struct PaymentEnvelope<T> {
    pub success: bool,
    pub data: T,
    pub message: String,
}

impl<T> PaymentEnvelope<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
        }
    }
}
