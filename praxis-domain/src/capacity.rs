use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{check_money, check_rate, InvalidValue};

/// Category of a monthly fixed-cost item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CostCategory {
    Rent,
    Payroll,
    Supplies,
    Utilities,
    /// Owner's desired draw; tracked separately in the capacity report.
    Prolabore,
    Other,
}

/// A recurring monthly cost entering the cost-per-minute model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedCostItem {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub label: String,
    pub category: CostCategory,
    pub monthly_amount: f64,
}

impl FixedCostItem {
    pub fn new(
        clinic_id: Uuid,
        label: String,
        category: CostCategory,
        monthly_amount: f64,
    ) -> Result<Self, InvalidValue> {
        Ok(Self {
            id: Uuid::new_v4(),
            clinic_id,
            label,
            category,
            monthly_amount: check_money("monthly_amount", monthly_amount)?,
        })
    }
}

/// Productive-capacity inputs for a clinic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityModel {
    pub clinic_id: Uuid,
    pub chairs: u32,
    pub weekly_hours: f64,
    /// Fraction of nominal chair time actually productive, in [0, 1].
    pub efficiency: f64,
}

impl CapacityModel {
    pub fn new(
        clinic_id: Uuid,
        chairs: u32,
        weekly_hours: f64,
        efficiency: f64,
    ) -> Result<Self, InvalidValue> {
        Ok(Self {
            clinic_id,
            chairs,
            weekly_hours: check_money("weekly_hours", weekly_hours)?,
            efficiency: check_rate("efficiency", efficiency)?,
        })
    }
}

/// Derived capacity baseline, persisted after each recalculation and read
/// (not recomputed) by margin checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacitySnapshot {
    pub clinic_id: Uuid,
    pub available_minutes_month: u64,
    pub fixed_costs_monthly: f64,
    pub desired_prolabore: f64,
    pub cost_per_minute: f64,
    pub computed_at: DateTime<Utc>,
}
