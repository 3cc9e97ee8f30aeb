use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use praxis_core::repository::CapacityRepository;
use praxis_core::StoreError;
use praxis_domain::{CapacityModel, CapacitySnapshot, CostCategory, FixedCostItem};

use crate::map_sqlx;

pub struct PgCapacityRepository {
    pool: PgPool,
}

impl PgCapacityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct SnapshotRow {
    clinic_id: Uuid,
    available_minutes_month: i64,
    fixed_costs_monthly: f64,
    desired_prolabore: f64,
    cost_per_minute: f64,
    computed_at: chrono::DateTime<chrono::Utc>,
}

fn category_str(category: CostCategory) -> &'static str {
    match category {
        CostCategory::Rent => "RENT",
        CostCategory::Payroll => "PAYROLL",
        CostCategory::Supplies => "SUPPLIES",
        CostCategory::Utilities => "UTILITIES",
        CostCategory::Prolabore => "PROLABORE",
        CostCategory::Other => "OTHER",
    }
}

#[async_trait]
impl CapacityRepository for PgCapacityRepository {
    async fn upsert_capacity_model(&self, model: &CapacityModel) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO capacity_models (clinic_id, chairs, weekly_hours, efficiency)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (clinic_id)
            DO UPDATE SET
                chairs = EXCLUDED.chairs,
                weekly_hours = EXCLUDED.weekly_hours,
                efficiency = EXCLUDED.efficiency
            "#,
        )
        .bind(model.clinic_id)
        .bind(model.chairs as i32)
        .bind(model.weekly_hours)
        .bind(model.efficiency)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(())
    }

    async fn replace_cost_items(
        &self,
        clinic_id: Uuid,
        items: &[FixedCostItem],
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;

        sqlx::query("DELETE FROM fixed_cost_items WHERE clinic_id = $1")
            .bind(clinic_id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx)?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO fixed_cost_items (id, clinic_id, label, category, monthly_amount)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(item.id)
            .bind(item.clinic_id)
            .bind(&item.label)
            .bind(category_str(item.category))
            .bind(item.monthly_amount)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx)?;
        }

        tx.commit().await.map_err(map_sqlx)?;
        Ok(())
    }

    async fn save_snapshot(&self, snapshot: &CapacitySnapshot) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO capacity_snapshots (
                clinic_id, available_minutes_month, fixed_costs_monthly,
                desired_prolabore, cost_per_minute, computed_at
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (clinic_id)
            DO UPDATE SET
                available_minutes_month = EXCLUDED.available_minutes_month,
                fixed_costs_monthly = EXCLUDED.fixed_costs_monthly,
                desired_prolabore = EXCLUDED.desired_prolabore,
                cost_per_minute = EXCLUDED.cost_per_minute,
                computed_at = EXCLUDED.computed_at
            "#,
        )
        .bind(snapshot.clinic_id)
        .bind(snapshot.available_minutes_month as i64)
        .bind(snapshot.fixed_costs_monthly)
        .bind(snapshot.desired_prolabore)
        .bind(snapshot.cost_per_minute)
        .bind(snapshot.computed_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(())
    }

    async fn latest_snapshot(
        &self,
        clinic_id: Uuid,
    ) -> Result<Option<CapacitySnapshot>, StoreError> {
        let row = sqlx::query_as::<_, SnapshotRow>(
            r#"
            SELECT clinic_id, available_minutes_month, fixed_costs_monthly,
                   desired_prolabore, cost_per_minute, computed_at
            FROM capacity_snapshots
            WHERE clinic_id = $1
            "#,
        )
        .bind(clinic_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(row.map(|r| CapacitySnapshot {
            clinic_id: r.clinic_id,
            available_minutes_month: r.available_minutes_month as u64,
            fixed_costs_monthly: r.fixed_costs_monthly,
            desired_prolabore: r.desired_prolabore,
            cost_per_minute: r.cost_per_minute,
            computed_at: r.computed_at,
        }))
    }
}
