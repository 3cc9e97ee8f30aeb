use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use praxis_domain::Procedure;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpsertProcedureRequest {
    /// Omit to create a new entry; pass an existing id to update it.
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    pub standard_price: f64,
    pub lab_cost_estimate: f64,
    pub duration_minutes: u32,
}

/// PUT /v1/clinics/{clinic_id}/procedures
pub async fn upsert_procedure(
    State(state): State<AppState>,
    Path(clinic_id): Path<Uuid>,
    Json(req): Json<UpsertProcedureRequest>,
) -> Result<(StatusCode, Json<Procedure>), AppError> {
    let mut procedure = Procedure::new(
        clinic_id,
        req.name,
        req.standard_price,
        req.lab_cost_estimate,
        req.duration_minutes,
    )
    .map_err(|e| AppError::ValidationError(e.to_string()))?;
    if let Some(id) = req.id {
        procedure.id = id;
    }

    state
        .procedures
        .upsert_procedure(&procedure)
        .await
        .map_err(praxis_core::EngineError::from)?;

    Ok((StatusCode::CREATED, Json(procedure)))
}

/// GET /v1/clinics/{clinic_id}/procedures/{procedure_id}
pub async fn get_procedure(
    State(state): State<AppState>,
    Path((clinic_id, procedure_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Procedure>, AppError> {
    state
        .procedures
        .get_procedure(clinic_id, procedure_id)
        .await
        .map_err(praxis_core::EngineError::from)?
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError(format!("procedure not found: {procedure_id}")))
}
