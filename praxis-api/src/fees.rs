use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use praxis_domain::{ClinicFinancialConfig, FeeKind, FeeRule};
use praxis_engine::resolve_fee;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpsertFeeRuleRequest {
    pub professional_id: Uuid,
    pub procedure_id: Uuid,
    pub kind: FeeKind,
    pub value: f64,
}

/// PUT /v1/clinics/{clinic_id}/fee-rules
///
/// Percentage values outside [0, 100] are rejected with 400, never clamped.
pub async fn upsert_fee_rule(
    State(state): State<AppState>,
    Path(_clinic_id): Path<Uuid>,
    Json(req): Json<UpsertFeeRuleRequest>,
) -> Result<StatusCode, AppError> {
    let rule = match req.kind {
        FeeKind::Percentage => FeeRule::percentage(req.professional_id, req.procedure_id, req.value),
        FeeKind::Fixed => FeeRule::fixed(req.professional_id, req.procedure_id, req.value),
    }
    .map_err(|e| AppError::ValidationError(e.to_string()))?;

    state
        .fee_rules
        .upsert_fee_rule(&rule)
        .await
        .map_err(praxis_core::EngineError::from)?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /v1/clinics/{clinic_id}/professionals/{professional_id}/procedures/{procedure_id}/fee
///
/// The rule that would apply today: the custom override, or the clinic
/// default when none exists.
pub async fn get_resolved_fee(
    State(state): State<AppState>,
    Path((_clinic_id, professional_id, procedure_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<Json<FeeRule>, AppError> {
    let custom = state
        .fee_rules
        .get_fee_rule(professional_id, procedure_id)
        .await
        .map_err(praxis_core::EngineError::from)?;

    Ok(Json(resolve_fee(custom)))
}

#[derive(Debug, Deserialize)]
pub struct UpsertConfigRequest {
    pub tax_rate: f64,
    pub avg_card_fee_rate: f64,
    pub target_profit_margin: f64,
}

/// PUT /v1/clinics/{clinic_id}/financial-config
///
/// Edits apply to future calculations only; committed settlements keep the
/// snapshot they were computed under.
pub async fn upsert_financial_config(
    State(state): State<AppState>,
    Path(clinic_id): Path<Uuid>,
    Json(req): Json<UpsertConfigRequest>,
) -> Result<StatusCode, AppError> {
    let config = ClinicFinancialConfig::new(
        clinic_id,
        req.tax_rate,
        req.avg_card_fee_rate,
        req.target_profit_margin,
    )
    .map_err(|e| AppError::ValidationError(e.to_string()))?;

    state
        .configs
        .upsert_config(&config)
        .await
        .map_err(praxis_core::EngineError::from)?;

    Ok(StatusCode::NO_CONTENT)
}
