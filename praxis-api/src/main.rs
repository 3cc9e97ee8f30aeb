use std::net::SocketAddr;
use std::sync::Arc;

use praxis_api::{app, AppState};
use praxis_engine::SettlementLedger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "praxis_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = praxis_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Praxis API on port {}", config.server.port);

    let db = praxis_store::DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let professionals = Arc::new(praxis_store::PgProfessionalRepository::new(db.pool.clone()));
    let fee_rules = Arc::new(praxis_store::PgFeeRuleRepository::new(db.pool.clone()));
    let configs = Arc::new(praxis_store::PgClinicConfigRepository::new(db.pool.clone()));
    let procedures = Arc::new(praxis_store::PgProcedureRepository::new(db.pool.clone()));
    let treatments = Arc::new(praxis_store::PgTreatmentRepository::new(db.pool.clone()));
    let settlements = Arc::new(praxis_store::PgSettlementRepository::new(db.pool.clone()));
    let capacity = Arc::new(praxis_store::PgCapacityRepository::new(db.pool.clone()));

    let ledger = Arc::new(SettlementLedger::new(
        professionals,
        fee_rules.clone(),
        configs.clone(),
        treatments,
        settlements,
    ));

    let app_state = AppState {
        ledger,
        fee_rules,
        configs,
        procedures,
        capacity,
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");
}
