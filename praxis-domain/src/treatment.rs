use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Treatment line status in the lifecycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TreatmentStatus {
    Planned,
    InProgress,
    Completed,
    /// Closed into a settlement record; no longer eligible for payout.
    Settled,
}

/// A completed, billable service instance tied to a sale (budget).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreatmentLine {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub sale_id: Uuid,
    pub procedure_id: Uuid,
    pub professional_id: Uuid,
    pub performed_on: NaiveDate,
    pub sale_price: f64,
    pub lab_cost: f64,
    pub status: TreatmentStatus,
}

impl TreatmentLine {
    pub fn is_settleable(&self) -> bool {
        self.status == TreatmentStatus::Completed
    }
}

/// A single installment of a sale's payment schedule.
///
/// Used only in aggregate to derive the payment-progress ratio for a sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Installment {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub amount: f64,
    pub paid: bool,
}
