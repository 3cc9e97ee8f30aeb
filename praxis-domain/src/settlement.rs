use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ClinicFinancialConfig, Period};

/// Per-line payout breakdown, derived at settlement time.
///
/// Not persisted on its own; it is frozen verbatim inside the settlement
/// record that commits it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculatedLine {
    pub treatment_id: Uuid,
    pub procedure_id: Uuid,
    pub sale_id: Uuid,
    pub performed_on: NaiveDate,
    pub sale_price: f64,
    pub taxes: f64,
    pub card_fees: f64,
    pub lab_cost: f64,
    pub total_deductions: f64,
    pub net_base: f64,
    pub base_fee: f64,
    /// Fraction of the sale actually collected, in [0, 1].
    pub payment_progress: f64,
    pub professional_fee: f64,
    pub future_receivable: f64,
    pub clinic_profit: f64,
    /// Warning flag: the line leaves less margin than the clinic targets.
    pub margin_at_risk: bool,
}

/// Aggregate totals over a settlement's lines.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettlementTotals {
    pub gross: f64,
    pub deductions: f64,
    pub net_payable: f64,
    pub clinic_profit: f64,
    pub future_receivable: f64,
}

impl SettlementTotals {
    pub fn accumulate(&mut self, line: &CalculatedLine) {
        self.gross += line.sale_price;
        self.deductions += line.total_deductions;
        self.net_payable += line.professional_fee;
        self.clinic_profit += line.clinic_profit;
        self.future_receivable += line.future_receivable;
    }
}

/// Immutable snapshot closing one professional's period.
///
/// At most one record may exist per (clinic, professional, period); a second
/// attempt is a conflict, never an update. Lines and the config snapshot are
/// stored verbatim for audit and must never be recalculated from current
/// configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementRecord {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub professional_id: Uuid,
    pub period: Period,
    pub lines: Vec<CalculatedLine>,
    pub totals: SettlementTotals,
    /// The financial config in force when this record was computed.
    pub config_snapshot: ClinicFinancialConfig,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl SettlementRecord {
    pub fn new(
        clinic_id: Uuid,
        professional_id: Uuid,
        period: Period,
        lines: Vec<CalculatedLine>,
        config_snapshot: ClinicFinancialConfig,
        created_by: String,
    ) -> Self {
        let mut totals = SettlementTotals::default();
        for line in &lines {
            totals.accumulate(line);
        }
        Self {
            id: Uuid::new_v4(),
            clinic_id,
            professional_id,
            period,
            lines,
            totals,
            config_snapshot,
            created_by,
            created_at: Utc::now(),
        }
    }
}
