use chrono::Utc;

use praxis_domain::{CapacityModel, CapacitySnapshot, CostCategory, FixedCostItem};

/// Converts fixed costs and productive capacity into a cost-per-minute
/// baseline used to benchmark procedure pricing.
pub struct CapacityCostEngine;

impl CapacityCostEngine {
    /// Recompute the capacity baseline from scratch.
    ///
    /// Prolabore (owner draw) is partitioned out of the other fixed costs so
    /// the report can show it separately, but both enter the cost-per-minute
    /// figure. Available minutes assume four working weeks per month.
    pub fn recalculate(items: &[FixedCostItem], model: &CapacityModel) -> CapacitySnapshot {
        let (prolabore, other): (Vec<_>, Vec<_>) = items
            .iter()
            .partition(|item| item.category == CostCategory::Prolabore);

        let desired_prolabore: f64 = prolabore.iter().map(|i| i.monthly_amount).sum();
        let fixed_costs_monthly: f64 = other.iter().map(|i| i.monthly_amount).sum();

        let available_minutes_month = (model.weekly_hours
            * 4.0
            * model.chairs as f64
            * model.efficiency
            * 60.0)
            .floor() as u64;

        let cost_per_minute = if available_minutes_month > 0 {
            (fixed_costs_monthly + desired_prolabore) / available_minutes_month as f64
        } else {
            0.0
        };

        CapacitySnapshot {
            clinic_id: model.clinic_id,
            available_minutes_month,
            fixed_costs_monthly,
            desired_prolabore,
            cost_per_minute,
            computed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn item(clinic_id: Uuid, category: CostCategory, amount: f64) -> FixedCostItem {
        FixedCostItem::new(clinic_id, "item".to_string(), category, amount).unwrap()
    }

    #[test]
    fn one_chair_forty_hours() {
        let clinic = Uuid::new_v4();
        let model = CapacityModel::new(clinic, 1, 40.0, 0.8).unwrap();
        let items = vec![
            item(clinic, CostCategory::Rent, 5000.0),
            item(clinic, CostCategory::Prolabore, 3000.0),
        ];

        let snapshot = CapacityCostEngine::recalculate(&items, &model);
        // floor(40 * 4 * 1 * 0.8 * 60) = 7680
        assert_eq!(snapshot.available_minutes_month, 7680);
        assert_eq!(snapshot.fixed_costs_monthly, 5000.0);
        assert_eq!(snapshot.desired_prolabore, 3000.0);
        assert!((snapshot.cost_per_minute - 8000.0 / 7680.0).abs() < 1e-4);
        assert!((snapshot.cost_per_minute - 1.0417).abs() < 1e-4);
    }

    #[test]
    fn zero_capacity_yields_zero_cost_per_minute() {
        let clinic = Uuid::new_v4();
        let model = CapacityModel::new(clinic, 0, 40.0, 0.8).unwrap();
        let items = vec![item(clinic, CostCategory::Rent, 5000.0)];
        let snapshot = CapacityCostEngine::recalculate(&items, &model);
        assert_eq!(snapshot.available_minutes_month, 0);
        assert_eq!(snapshot.cost_per_minute, 0.0);
    }
}
