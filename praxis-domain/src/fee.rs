use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{check_money, InvalidValue};

/// How a fee rule's value is interpreted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeeKind {
    /// A flat currency amount per completed line.
    Fixed,
    /// A percentage (0-100) of the line's net base.
    Percentage,
}

/// Commission rule scoped to a (professional, procedure) pair.
///
/// Absence of a custom rule means the clinic default applies; see
/// `FeeRule::clinic_default`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeeRule {
    pub professional_id: Option<Uuid>,
    pub procedure_id: Option<Uuid>,
    pub kind: FeeKind,
    pub value: f64,
}

/// Clinic-wide fallback commission when no override exists.
pub const DEFAULT_FEE_PERCENT: f64 = 30.0;

impl FeeRule {
    /// A percentage rule. Values outside [0, 100] are rejected at write
    /// time, never clamped.
    pub fn percentage(
        professional_id: Uuid,
        procedure_id: Uuid,
        percent: f64,
    ) -> Result<Self, InvalidValue> {
        if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
            return Err(InvalidValue::new(
                "fee_percent",
                format!("must be within [0, 100], got {percent}"),
            ));
        }
        Ok(Self {
            professional_id: Some(professional_id),
            procedure_id: Some(procedure_id),
            kind: FeeKind::Percentage,
            value: percent,
        })
    }

    /// A flat currency amount rule.
    pub fn fixed(
        professional_id: Uuid,
        procedure_id: Uuid,
        amount: f64,
    ) -> Result<Self, InvalidValue> {
        Ok(Self {
            professional_id: Some(professional_id),
            procedure_id: Some(procedure_id),
            kind: FeeKind::Fixed,
            value: check_money("fee_amount", amount)?,
        })
    }

    /// The clinic default: 30% of net base, not tied to any pair.
    pub fn clinic_default() -> Self {
        Self {
            professional_id: None,
            procedure_id: None,
            kind: FeeKind::Percentage,
            value: DEFAULT_FEE_PERCENT,
        }
    }

    /// Whether a fee has actually been configured (non-zero value).
    pub fn is_configured(&self) -> bool {
        self.value != 0.0
    }
}
