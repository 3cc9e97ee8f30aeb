pub mod repository;

use praxis_domain::{InvalidValue, Period};
use uuid::Uuid;

/// Failure talking to the persistence boundary.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("conflicting write: {0}")]
    Conflict(String),
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Error taxonomy of the compensation engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Malformed numeric input; rejected before calculation, never coerced.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A settlement record already exists for this exact period. Distinct
    /// from a generic storage failure so callers can say "period already
    /// closed" instead of "try again".
    #[error("professional {professional_id} already settled for {period}")]
    AlreadySettled { professional_id: Uuid, period: Period },

    #[error("storage error: {0}")]
    Storage(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl From<InvalidValue> for EngineError {
    fn from(err: InvalidValue) -> Self {
        EngineError::Validation(err.to_string())
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => EngineError::Storage(format!("conflict: {msg}")),
            StoreError::NotFound { entity, id } => EngineError::NotFound { entity, id },
            StoreError::Backend(msg) => EngineError::Storage(msg),
        }
    }
}
