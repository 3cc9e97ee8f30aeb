use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{check_rate, InvalidValue};

/// Clinic-wide financial constants, read by every calculation.
///
/// Mutated only by clinic admin action. Settled records carry the snapshot
/// that was in force at settlement time, so later edits never alter them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClinicFinancialConfig {
    pub clinic_id: Uuid,
    /// Taxes as a fraction of the sale price, in [0, 1].
    pub tax_rate: f64,
    /// Average card acquirer fee as a fraction of the sale price, in [0, 1].
    pub avg_card_fee_rate: f64,
    /// Profit the clinic aims to retain per sale, in [0, 1].
    pub target_profit_margin: f64,
}

impl ClinicFinancialConfig {
    pub fn new(
        clinic_id: Uuid,
        tax_rate: f64,
        avg_card_fee_rate: f64,
        target_profit_margin: f64,
    ) -> Result<Self, InvalidValue> {
        Ok(Self {
            clinic_id,
            tax_rate: check_rate("tax_rate", tax_rate)?,
            avg_card_fee_rate: check_rate("avg_card_fee_rate", avg_card_fee_rate)?,
            target_profit_margin: check_rate("target_profit_margin", target_profit_margin)?,
        })
    }

    /// The target margin expressed as a percentage, for risk comparisons.
    pub fn target_margin_percent(&self) -> f64 {
        self.target_profit_margin * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rates_are_validated() {
        let clinic = Uuid::new_v4();
        assert!(ClinicFinancialConfig::new(clinic, 1.5, 0.03, 0.3).is_err());
        assert!(ClinicFinancialConfig::new(clinic, 0.11, 0.03, 0.3).is_ok());
    }
}
