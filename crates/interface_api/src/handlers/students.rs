//! Student history and dues handlers

use axum::{
    extract::{Path, State},
    Json,
};
use core_kernel::{EnrollmentId, StudentId};
use uuid::Uuid;

use crate::dto::students::{DueResponse, HistoryResponse};
use crate::{error::ApiError, AppState};

/// Month-by-month settlement history of one enrollment
pub async fn payment_history(
    State(state): State<AppState>,
    Path((student_id, enrollment_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let history = state
        .service
        .payment_history(
            StudentId::from_uuid(student_id),
            EnrollmentId::from_uuid(enrollment_id),
        )
        .await?;
    Ok(Json(HistoryResponse::from(&history)))
}

/// Outstanding dues across a student's active enrollments
pub async fn outstanding_due(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
) -> Result<Json<DueResponse>, ApiError> {
    let report = state
        .service
        .outstanding_due(StudentId::from_uuid(student_id))
        .await?;
    Ok(Json(DueResponse::from(&report)))
}
