use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use praxis_core::repository::ClinicConfigRepository;
use praxis_core::StoreError;
use praxis_domain::ClinicFinancialConfig;

use crate::map_sqlx;

pub struct PgClinicConfigRepository {
    pool: PgPool,
}

impl PgClinicConfigRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ConfigRow {
    clinic_id: Uuid,
    tax_rate: f64,
    avg_card_fee_rate: f64,
    target_profit_margin: f64,
}

#[async_trait]
impl ClinicConfigRepository for PgClinicConfigRepository {
    async fn get_config(
        &self,
        clinic_id: Uuid,
    ) -> Result<Option<ClinicFinancialConfig>, StoreError> {
        let row = sqlx::query_as::<_, ConfigRow>(
            r#"
            SELECT clinic_id, tax_rate, avg_card_fee_rate, target_profit_margin
            FROM clinic_financial_config
            WHERE clinic_id = $1
            "#,
        )
        .bind(clinic_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(row.map(|r| ClinicFinancialConfig {
            clinic_id: r.clinic_id,
            tax_rate: r.tax_rate,
            avg_card_fee_rate: r.avg_card_fee_rate,
            target_profit_margin: r.target_profit_margin,
        }))
    }

    async fn upsert_config(&self, config: &ClinicFinancialConfig) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO clinic_financial_config (clinic_id, tax_rate, avg_card_fee_rate, target_profit_margin, updated_at)
            VALUES ($1, $2, $3, $4, now())
            ON CONFLICT (clinic_id)
            DO UPDATE SET
                tax_rate = EXCLUDED.tax_rate,
                avg_card_fee_rate = EXCLUDED.avg_card_fee_rate,
                target_profit_margin = EXCLUDED.target_profit_margin,
                updated_at = now()
            "#,
        )
        .bind(config.clinic_id)
        .bind(config.tax_rate)
        .bind(config.avg_card_fee_rate)
        .bind(config.target_profit_margin)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(())
    }
}
