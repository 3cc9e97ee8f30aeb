use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use praxis_domain::{
    CapacityModel, CapacitySnapshot, ClinicFinancialConfig, FeeRule, FixedCostItem, Installment,
    Procedure, Professional, SettlementRecord, TreatmentLine,
};

use crate::StoreError;

/// Repository trait for professional data access.
#[async_trait]
pub trait ProfessionalRepository: Send + Sync {
    async fn get_professional(
        &self,
        clinic_id: Uuid,
        professional_id: Uuid,
    ) -> Result<Option<Professional>, StoreError>;
}

/// Repository trait for the clinic's procedure price table.
#[async_trait]
pub trait ProcedureRepository: Send + Sync {
    async fn get_procedure(
        &self,
        clinic_id: Uuid,
        procedure_id: Uuid,
    ) -> Result<Option<Procedure>, StoreError>;

    async fn upsert_procedure(&self, procedure: &Procedure) -> Result<(), StoreError>;
}

/// Repository trait for fee rule access.
#[async_trait]
pub trait FeeRuleRepository: Send + Sync {
    /// The custom rule for a (professional, procedure) pair, if any.
    /// Absence is not an error; the clinic default applies.
    async fn get_fee_rule(
        &self,
        professional_id: Uuid,
        procedure_id: Uuid,
    ) -> Result<Option<FeeRule>, StoreError>;

    async fn upsert_fee_rule(&self, rule: &FeeRule) -> Result<(), StoreError>;
}

/// Repository trait for the clinic financial configuration.
#[async_trait]
pub trait ClinicConfigRepository: Send + Sync {
    async fn get_config(
        &self,
        clinic_id: Uuid,
    ) -> Result<Option<ClinicFinancialConfig>, StoreError>;

    async fn upsert_config(&self, config: &ClinicFinancialConfig) -> Result<(), StoreError>;
}

/// Repository trait for treatment lines and their payment schedules.
#[async_trait]
pub trait TreatmentRepository: Send + Sync {
    /// Completed (settleable) lines for a professional within a date range.
    async fn list_completed_lines(
        &self,
        clinic_id: Uuid,
        professional_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<TreatmentLine>, StoreError>;

    /// Live installment state for a sale, read at settlement time.
    async fn list_installments(&self, sale_id: Uuid) -> Result<Vec<Installment>, StoreError>;

    /// Flip lines to Settled once a settlement record commits.
    async fn mark_lines_settled(&self, line_ids: &[Uuid]) -> Result<(), StoreError>;
}

/// Repository trait for settlement records.
#[async_trait]
pub trait SettlementRepository: Send + Sync {
    /// Insert-only. The store enforces uniqueness on
    /// (clinic_id, professional_id, period_month, period_year) and must
    /// surface a violation as `StoreError::Conflict`.
    async fn insert_settlement(&self, record: &SettlementRecord) -> Result<(), StoreError>;

    async fn get_settlement(
        &self,
        clinic_id: Uuid,
        professional_id: Uuid,
        month: u8,
        year: u16,
    ) -> Result<Option<SettlementRecord>, StoreError>;
}

/// Repository trait for the capacity model and its derived snapshot.
#[async_trait]
pub trait CapacityRepository: Send + Sync {
    async fn upsert_capacity_model(&self, model: &CapacityModel) -> Result<(), StoreError>;

    async fn replace_cost_items(
        &self,
        clinic_id: Uuid,
        items: &[FixedCostItem],
    ) -> Result<(), StoreError>;

    async fn save_snapshot(&self, snapshot: &CapacitySnapshot) -> Result<(), StoreError>;

    /// The latest persisted baseline; margin checks read this rather than
    /// recomputing it.
    async fn latest_snapshot(
        &self,
        clinic_id: Uuid,
    ) -> Result<Option<CapacitySnapshot>, StoreError>;
}
