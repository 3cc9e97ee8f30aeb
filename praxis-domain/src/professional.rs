use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a professional's fee is released relative to patient payment.
///
/// Selected once per professional and applied identically to every line in a
/// settlement period. Changing it only affects future periods.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayoutRule {
    /// Full fee is owed when the service is completed; the clinic bears
    /// collection risk.
    FullOnCompletion,
    /// Fee is released in proportion to how much of the patient's bill has
    /// actually been collected.
    ProportionalToPayment,
}

/// A service provider working under a clinic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Professional {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub display_name: String,
    pub payout_rule: PayoutRule,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Professional {
    pub fn new(clinic_id: Uuid, display_name: String, payout_rule: PayoutRule) -> Self {
        Self {
            id: Uuid::new_v4(),
            clinic_id,
            display_name,
            payout_rule,
            active: true,
            created_at: Utc::now(),
        }
    }
}
