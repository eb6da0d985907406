//! Ledger handlers

use axum::{
    extract::{Query, State},
    Json,
};

use crate::dto::ledger::{LedgerQuery, LedgerResponse};
use crate::{error::ApiError, AppState};

/// One page of the income/expense journal with the running totals
pub async fn list_entries(
    State(state): State<AppState>,
    Query(query): Query<LedgerQuery>,
) -> Result<Json<LedgerResponse>, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let view = state
        .service
        .ledger(page, state.config.ledger_page_size)
        .await?;
    let profit = view
        .totals
        .profit()
        .map_err(|err| ApiError::Internal(err.to_string()))?;
    Ok(Json(LedgerResponse::from_view(&view, profit.amount())))
}
