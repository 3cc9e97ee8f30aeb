use axum::{
    http::Method,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod capacity;
pub mod error;
pub mod fees;
pub mod margin;
pub mod procedures;
pub mod settlements;
pub mod state;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    Router::new()
        .route(
            "/v1/clinics/{clinic_id}/professionals/{professional_id}/settlements",
            post(settlements::create_settlement),
        )
        .route(
            "/v1/clinics/{clinic_id}/professionals/{professional_id}/settlements/preview",
            get(settlements::preview_settlement),
        )
        .route(
            "/v1/clinics/{clinic_id}/fee-rules",
            put(fees::upsert_fee_rule),
        )
        .route(
            "/v1/clinics/{clinic_id}/professionals/{professional_id}/procedures/{procedure_id}/fee",
            get(fees::get_resolved_fee),
        )
        .route(
            "/v1/clinics/{clinic_id}/financial-config",
            put(fees::upsert_financial_config),
        )
        .route(
            "/v1/clinics/{clinic_id}/procedures",
            put(procedures::upsert_procedure),
        )
        .route(
            "/v1/clinics/{clinic_id}/procedures/{procedure_id}",
            get(procedures::get_procedure),
        )
        .route("/v1/clinics/{clinic_id}/margin/check", post(margin::margin_check))
        .route(
            "/v1/clinics/{clinic_id}/capacity",
            put(capacity::update_capacity).get(capacity::get_capacity),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
