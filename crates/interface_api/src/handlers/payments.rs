//! Payment collection handlers

use axum::{
    extract::{Path, State},
    Json,
};
use core_kernel::{EnrollmentId, InvoiceId, Money, StudentId};
use domain_tuition::CollectPaymentCommand;
use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use crate::dto::payments::{CollectPaymentRequest, CollectionData, PaymentEnvelope, ReversalData};
use crate::{error::ApiError, AppState};

/// Collects one payment and spreads it across billing months,
/// oldest outstanding month first
pub async fn collect_payment(
    State(state): State<AppState>,
    Json(request): Json<CollectPaymentRequest>,
) -> Result<Json<PaymentEnvelope<CollectionData>>, ApiError> {
    request.validate()?;

    let command = CollectPaymentCommand {
        student_id: StudentId::from_uuid(request.student_id),
        enrollment_id: EnrollmentId::from_uuid(request.enrollment_id),
        amount: Money::new(request.amount, state.currency),
        discount: Money::new(request.discount.unwrap_or(Decimal::ZERO), state.currency),
        method: request.method,
        transaction_ref: request.transaction_ref,
        notes: request.notes,
    };

    let collected = state.service.collect_payment(command).await?;
    let message = format!(
        "Payment of {} allocated across {} month(s)",
        collected.outcome.total_processed,
        collected.outcome.months.len()
    );
    let data = CollectionData::from_parts(&collected.invoice, &collected.outcome);
    Ok(Json(PaymentEnvelope::ok(data, message)))
}

/// Reverses an invoice together with every settlement row it created
pub async fn delete_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PaymentEnvelope<ReversalData>>, ApiError> {
    let invoice = state
        .service
        .delete_invoice(InvoiceId::from_uuid(id))
        .await?;
    let message = format!("Invoice {} reversed", invoice.id);
    let data = ReversalData::from(&invoice);
    Ok(Json(PaymentEnvelope::ok(data, message)))
}
