use serde::{Deserialize, Serialize};

use praxis_core::{EngineError, EngineResult};
use praxis_domain::{check_money, ClinicFinancialConfig};

/// Breakdown of everything removed from a sale price before commission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deductions {
    pub taxes: f64,
    pub card_fees: f64,
    pub lab_cost: f64,
    pub total_deductions: f64,
    /// Sale price minus all deductions. May be negative when costs exceed
    /// the price; that is surfaced, not clamped, so margin-risk detection
    /// can flag it.
    pub net_base: f64,
}

/// Compute taxes, card fees, lab cost and the resulting net base for one
/// sale price under the clinic's financial config.
pub fn compute_deductions(
    sale_price: f64,
    lab_cost: f64,
    config: &ClinicFinancialConfig,
) -> EngineResult<Deductions> {
    let sale_price = check_money("sale_price", sale_price).map_err(EngineError::from)?;
    let lab_cost = check_money("lab_cost", lab_cost).map_err(EngineError::from)?;

    let taxes = sale_price * config.tax_rate;
    let card_fees = sale_price * config.avg_card_fee_rate;
    let total_deductions = taxes + card_fees + lab_cost;

    Ok(Deductions {
        taxes,
        card_fees,
        lab_cost,
        total_deductions,
        net_base: sale_price - total_deductions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn config() -> ClinicFinancialConfig {
        ClinicFinancialConfig::new(Uuid::new_v4(), 0.11, 0.03, 0.3).unwrap()
    }

    #[test]
    fn deductions_partition_the_sale_price() {
        let d = compute_deductions(1000.0, 50.0, &config()).unwrap();
        assert!((d.taxes - 110.0).abs() < 1e-9);
        assert!((d.card_fees - 30.0).abs() < 1e-9);
        assert!((d.total_deductions - 190.0).abs() < 1e-9);
        // taxes + card fees + lab cost + net base == sale price
        assert!((d.taxes + d.card_fees + d.lab_cost + d.net_base - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn negative_net_base_is_surfaced_not_clamped() {
        let d = compute_deductions(100.0, 200.0, &config()).unwrap();
        assert!(d.net_base < 0.0);
    }

    #[test]
    fn malformed_input_is_rejected() {
        assert!(compute_deductions(-1.0, 0.0, &config()).is_err());
        assert!(compute_deductions(f64::NAN, 0.0, &config()).is_err());
        assert!(compute_deductions(100.0, -5.0, &config()).is_err());
    }
}
