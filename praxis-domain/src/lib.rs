pub mod capacity;
pub mod config;
pub mod fee;
pub mod period;
pub mod professional;
pub mod procedure;
pub mod settlement;
pub mod treatment;

pub use capacity::{CapacityModel, CapacitySnapshot, CostCategory, FixedCostItem};
pub use config::ClinicFinancialConfig;
pub use fee::{FeeKind, FeeRule};
pub use period::Period;
pub use procedure::Procedure;
pub use professional::{PayoutRule, Professional};
pub use settlement::{CalculatedLine, SettlementRecord, SettlementTotals};
pub use treatment::{Installment, TreatmentLine, TreatmentStatus};

/// A domain value failed validation at construction time.
#[derive(Debug, thiserror::Error)]
#[error("invalid {field}: {reason}")]
pub struct InvalidValue {
    pub field: &'static str,
    pub reason: String,
}

impl InvalidValue {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self { field, reason: reason.into() }
    }
}

/// Reject non-finite or negative monetary amounts before they reach a calculation.
pub fn check_money(field: &'static str, value: f64) -> Result<f64, InvalidValue> {
    if !value.is_finite() {
        return Err(InvalidValue::new(field, format!("must be finite, got {value}")));
    }
    if value < 0.0 {
        return Err(InvalidValue::new(field, format!("must be non-negative, got {value}")));
    }
    Ok(value)
}

/// Reject a rate outside [0, 1].
pub fn check_rate(field: &'static str, value: f64) -> Result<f64, InvalidValue> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(InvalidValue::new(field, format!("must be within [0, 1], got {value}")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_rejects_negative_and_non_finite() {
        assert!(check_money("sale_price", -1.0).is_err());
        assert!(check_money("sale_price", f64::NAN).is_err());
        assert!(check_money("sale_price", f64::INFINITY).is_err());
        assert_eq!(check_money("sale_price", 120.5).unwrap(), 120.5);
    }

    #[test]
    fn rate_bounds() {
        assert!(check_rate("tax_rate", 1.01).is_err());
        assert!(check_rate("tax_rate", -0.01).is_err());
        assert_eq!(check_rate("tax_rate", 0.11).unwrap(), 0.11);
    }
}
