use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use praxis_domain::{CapacityModel, CapacitySnapshot, CostCategory, FixedCostItem};
use praxis_engine::CapacityCostEngine;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CostItemRequest {
    pub label: String,
    pub category: CostCategory,
    pub monthly_amount: f64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCapacityRequest {
    pub chairs: u32,
    pub weekly_hours: f64,
    pub efficiency: f64,
    pub cost_items: Vec<CostItemRequest>,
}

/// PUT /v1/clinics/{clinic_id}/capacity
///
/// Replaces the capacity inputs, recalculates the cost-per-minute baseline
/// and persists the snapshot that margin checks will read from now on.
pub async fn update_capacity(
    State(state): State<AppState>,
    Path(clinic_id): Path<Uuid>,
    Json(req): Json<UpdateCapacityRequest>,
) -> Result<Json<CapacitySnapshot>, AppError> {
    let model = CapacityModel::new(clinic_id, req.chairs, req.weekly_hours, req.efficiency)
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let mut items = Vec::with_capacity(req.cost_items.len());
    for item in req.cost_items {
        items.push(
            FixedCostItem::new(clinic_id, item.label, item.category, item.monthly_amount)
                .map_err(|e| AppError::ValidationError(e.to_string()))?,
        );
    }

    let snapshot = CapacityCostEngine::recalculate(&items, &model);

    state
        .capacity
        .upsert_capacity_model(&model)
        .await
        .map_err(praxis_core::EngineError::from)?;
    state
        .capacity
        .replace_cost_items(clinic_id, &items)
        .await
        .map_err(praxis_core::EngineError::from)?;
    state
        .capacity
        .save_snapshot(&snapshot)
        .await
        .map_err(praxis_core::EngineError::from)?;

    Ok(Json(snapshot))
}

/// GET /v1/clinics/{clinic_id}/capacity
pub async fn get_capacity(
    State(state): State<AppState>,
    Path(clinic_id): Path<Uuid>,
) -> Result<Json<CapacitySnapshot>, AppError> {
    state
        .capacity
        .latest_snapshot(clinic_id)
        .await
        .map_err(praxis_core::EngineError::from)?
        .map(Json)
        .ok_or_else(|| {
            AppError::NotFoundError(format!("capacity baseline not found: {clinic_id}"))
        })
}
