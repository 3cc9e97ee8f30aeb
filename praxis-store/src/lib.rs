pub mod app_config;
pub mod capacity_repo;
pub mod clinic_repo;
pub mod database;
pub mod fee_repo;
pub mod procedure_repo;
pub mod professional_repo;
pub mod settlement_repo;
pub mod treatment_repo;

pub use capacity_repo::PgCapacityRepository;
pub use clinic_repo::PgClinicConfigRepository;
pub use database::DbClient;
pub use fee_repo::PgFeeRuleRepository;
pub use procedure_repo::PgProcedureRepository;
pub use professional_repo::PgProfessionalRepository;
pub use settlement_repo::PgSettlementRepository;
pub use treatment_repo::PgTreatmentRepository;

use praxis_core::StoreError;

/// Translate a sqlx failure into the engine's storage taxonomy. Unique
/// violations become `Conflict` so the ledger can tell "period already
/// closed" apart from a transient failure.
pub(crate) fn map_sqlx(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(db.message().to_string())
        }
        _ => StoreError::Backend(err.to_string()),
    }
}
