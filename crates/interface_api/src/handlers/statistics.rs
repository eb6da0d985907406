//! Statistics handlers

use axum::{
    extract::{Query, State},
    Json,
};
use core_kernel::BillingMonth;

use crate::dto::statistics::{StatisticsResponse, UnpaidRangeQuery, UnpaidStudentDto, UnpaidStudentsResponse};
use crate::{error::ApiError, AppState};

/// Dashboard overview: roster counts, collections, and the trailing
/// twelve-month series
pub async fn overview(
    State(state): State<AppState>,
) -> Result<Json<StatisticsResponse>, ApiError> {
    let as_of = state.clock.current_month();
    let overview = state.stats.overview(as_of).await?;
    Ok(Json(StatisticsResponse::from(&overview)))
}

/// Students with no settlement activity inside the given month range
pub async fn unpaid_students(
    State(state): State<AppState>,
    Query(query): Query<UnpaidRangeQuery>,
) -> Result<Json<UnpaidStudentsResponse>, ApiError> {
    let from = BillingMonth::new(query.from_year, query.from_month)
        .map_err(|err| ApiError::BadRequest(err.to_string()))?;
    let to = BillingMonth::new(query.to_year, query.to_month)
        .map_err(|err| ApiError::BadRequest(err.to_string()))?;
    if from.index() > to.index() {
        return Err(ApiError::BadRequest(
            "fromMonth/fromYear must not be after toMonth/toYear".to_string(),
        ));
    }

    let students = state.stats.unpaid_students_in_range(from, to).await?;
    Ok(Json(UnpaidStudentsResponse {
        from: from.label(),
        to: to.label(),
        count: students.len(),
        students: students.iter().map(UnpaidStudentDto::from).collect(),
    }))
}
