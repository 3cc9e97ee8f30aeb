use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{check_money, InvalidValue};

/// A billable clinical procedure from the clinic's price table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Procedure {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub name: String,
    /// Standard sale price charged to the patient.
    pub standard_price: f64,
    /// Estimated lab cost deducted before commission.
    pub lab_cost_estimate: f64,
    /// Estimated chair time, used by the capacity cost benchmark.
    pub duration_minutes: u32,
}

impl Procedure {
    pub fn new(
        clinic_id: Uuid,
        name: String,
        standard_price: f64,
        lab_cost_estimate: f64,
        duration_minutes: u32,
    ) -> Result<Self, InvalidValue> {
        Ok(Self {
            id: Uuid::new_v4(),
            clinic_id,
            name,
            standard_price: check_money("standard_price", standard_price)?,
            lab_cost_estimate: check_money("lab_cost_estimate", lab_cost_estimate)?,
            duration_minutes,
        })
    }
}
