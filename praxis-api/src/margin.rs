use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use praxis_domain::FeeKind;
use praxis_engine::{actual_margin_percent, compute_deductions, suggested_fee};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MarginCheckRequest {
    pub procedure_id: Uuid,
    pub fee_kind: FeeKind,
    pub fee_value: f64,
    /// Candidate price to evaluate; defaults to the procedure's standard
    /// price when omitted.
    #[serde(default)]
    pub sale_price: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct MarginCheckResponse {
    pub sale_price: f64,
    pub net_base: f64,
    pub base_fee: f64,
    pub clinic_profit: f64,
    pub actual_margin_percent: f64,
    pub target_margin_percent: f64,
    pub suggested_fee: f64,
    pub at_risk: bool,
}

/// POST /v1/clinics/{clinic_id}/margin/check
///
/// Benchmarks a procedure's price and a candidate fee against the clinic's
/// target margin and the persisted cost-per-minute baseline. Lab cost and
/// chair time come from the stored procedure.
pub async fn margin_check(
    State(state): State<AppState>,
    Path(clinic_id): Path<Uuid>,
    Json(req): Json<MarginCheckRequest>,
) -> Result<Json<MarginCheckResponse>, AppError> {
    let config = state
        .configs
        .get_config(clinic_id)
        .await
        .map_err(praxis_core::EngineError::from)?
        .ok_or_else(|| {
            AppError::NotFoundError(format!("clinic financial config not found: {clinic_id}"))
        })?;

    let procedure = state
        .procedures
        .get_procedure(clinic_id, req.procedure_id)
        .await
        .map_err(praxis_core::EngineError::from)?
        .ok_or_else(|| {
            AppError::NotFoundError(format!("procedure not found: {}", req.procedure_id))
        })?;

    let sale_price = req.sale_price.unwrap_or(procedure.standard_price);

    // The baseline is read as persisted, never recomputed here.
    let minute_cost = state
        .capacity
        .latest_snapshot(clinic_id)
        .await
        .map_err(praxis_core::EngineError::from)?
        .map(|s| s.cost_per_minute * procedure.duration_minutes as f64)
        .unwrap_or(0.0);

    let deductions = compute_deductions(sale_price, procedure.lab_cost_estimate, &config)?;

    let base_fee = match req.fee_kind {
        FeeKind::Fixed => req.fee_value,
        FeeKind::Percentage => deductions.net_base * req.fee_value / 100.0,
    };
    let clinic_profit = sale_price - deductions.total_deductions - base_fee;

    let actual = actual_margin_percent(clinic_profit, sale_price);
    let target = config.target_margin_percent();

    Ok(Json(MarginCheckResponse {
        sale_price,
        net_base: deductions.net_base,
        base_fee,
        clinic_profit,
        actual_margin_percent: actual,
        target_margin_percent: target,
        suggested_fee: suggested_fee(
            sale_price,
            deductions.taxes,
            deductions.card_fees,
            deductions.lab_cost,
            minute_cost,
            config.target_profit_margin,
        ),
        at_risk: actual < target,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::{test_state, TestStore};
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use chrono::Utc;
    use praxis_core::repository::{CapacityRepository, ClinicConfigRepository, ProcedureRepository};
    use praxis_domain::{CapacitySnapshot, ClinicFinancialConfig, Procedure};
    use std::sync::Arc;

    async fn seeded_store() -> (Arc<TestStore>, Uuid, Procedure) {
        let store = Arc::new(TestStore::default());
        let clinic_id = Uuid::new_v4();
        store
            .upsert_config(&ClinicFinancialConfig::new(clinic_id, 0.11, 0.03, 0.3).unwrap())
            .await
            .unwrap();
        let procedure =
            Procedure::new(clinic_id, "Crown".to_string(), 1000.0, 50.0, 60).unwrap();
        store.upsert_procedure(&procedure).await.unwrap();
        (store, clinic_id, procedure)
    }

    #[tokio::test]
    async fn margin_check_reads_the_stored_procedure() {
        let (store, clinic_id, procedure) = seeded_store().await;
        let state = test_state(store);

        let response = margin_check(
            State(state),
            Path(clinic_id),
            Json(MarginCheckRequest {
                procedure_id: procedure.id,
                fee_kind: FeeKind::Fixed,
                fee_value: 0.0,
                sale_price: None,
            }),
        )
        .await
        .unwrap();

        // Price and lab cost come from the price table, not the request.
        assert_eq!(response.0.sale_price, 1000.0);
        // 1000 - (110 + 30 + 50 + 0 + 300) = 510 with no capacity baseline
        assert!((response.0.suggested_fee - 510.0).abs() < 1e-9);
        // Zero fee leaves the whole net base as profit, well above target.
        assert!(!response.0.at_risk);
    }

    #[tokio::test]
    async fn margin_check_prices_chair_time_from_the_baseline() {
        let (store, clinic_id, procedure) = seeded_store().await;
        store
            .save_snapshot(&CapacitySnapshot {
                clinic_id,
                available_minutes_month: 7680,
                fixed_costs_monthly: 5000.0,
                desired_prolabore: 3000.0,
                cost_per_minute: 1.0,
                computed_at: Utc::now(),
            })
            .await
            .unwrap();
        let state = test_state(store);

        let response = margin_check(
            State(state),
            Path(clinic_id),
            Json(MarginCheckRequest {
                procedure_id: procedure.id,
                fee_kind: FeeKind::Percentage,
                fee_value: 70.0,
                sale_price: None,
            }),
        )
        .await
        .unwrap();

        // 60 minutes at 1.0/minute lowers the suggestion to 450.
        assert!((response.0.suggested_fee - 450.0).abs() < 1e-9);
        // A 70% fee on the net base leaves 24.3% margin, under the 30% target.
        assert!(response.0.at_risk);
    }

    #[tokio::test]
    async fn unknown_procedure_is_not_found() {
        let (store, clinic_id, _) = seeded_store().await;
        let state = test_state(store);

        let result = margin_check(
            State(state),
            Path(clinic_id),
            Json(MarginCheckRequest {
                procedure_id: Uuid::new_v4(),
                fee_kind: FeeKind::Fixed,
                fee_value: 100.0,
                sale_price: None,
            }),
        )
        .await;

        let err = result.err().expect("expected a not-found error");
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
