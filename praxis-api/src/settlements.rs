use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use praxis_domain::Period;
use praxis_engine::SettlementOutcome;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSettlementRequest {
    pub month: u8,
    pub year: u16,
    pub created_by: String,
}

#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    pub month: u8,
    pub year: u16,
}

/// POST /v1/clinics/{clinic_id}/professionals/{professional_id}/settlements
///
/// Closes the professional's period. A repeated call for the same period
/// returns 409 so the caller can report "period already closed".
pub async fn create_settlement(
    State(state): State<AppState>,
    Path((clinic_id, professional_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<CreateSettlementRequest>,
) -> Result<(StatusCode, Json<SettlementOutcome>), AppError> {
    let period = Period::new(req.month, req.year)
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let outcome = state
        .ledger
        .settle(clinic_id, professional_id, period, req.created_by)
        .await?;

    Ok((StatusCode::CREATED, Json(outcome)))
}

/// GET /v1/clinics/{clinic_id}/professionals/{professional_id}/settlements/preview
///
/// The same computation as a settlement, with nothing committed.
pub async fn preview_settlement(
    State(state): State<AppState>,
    Path((clinic_id, professional_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<SettlementOutcome>, AppError> {
    let period = Period::new(query.month, query.year)
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let outcome = state.ledger.preview(clinic_id, professional_id, period).await?;

    Ok(Json(outcome))
}
