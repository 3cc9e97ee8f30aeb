use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use praxis_core::repository::SettlementRepository;
use praxis_core::StoreError;
use praxis_domain::{
    CalculatedLine, ClinicFinancialConfig, Period, SettlementRecord, SettlementTotals,
};

use crate::map_sqlx;

pub struct PgSettlementRepository {
    pool: PgPool,
}

impl PgSettlementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct SettlementRow {
    id: Uuid,
    clinic_id: Uuid,
    professional_id: Uuid,
    period_month: i16,
    period_year: i16,
    lines: serde_json::Value,
    total_gross: f64,
    total_deductions: f64,
    total_net_payable: f64,
    total_clinic_profit: f64,
    total_future_receivable: f64,
    config_snapshot: serde_json::Value,
    created_by: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl SettlementRow {
    fn into_record(self) -> Result<SettlementRecord, StoreError> {
        let lines: Vec<CalculatedLine> = serde_json::from_value(self.lines)
            .map_err(|e| StoreError::Backend(format!("corrupt settlement lines: {e}")))?;
        let config_snapshot: ClinicFinancialConfig = serde_json::from_value(self.config_snapshot)
            .map_err(|e| StoreError::Backend(format!("corrupt config snapshot: {e}")))?;

        Ok(SettlementRecord {
            id: self.id,
            clinic_id: self.clinic_id,
            professional_id: self.professional_id,
            period: Period { month: self.period_month as u8, year: self.period_year as u16 },
            lines,
            totals: SettlementTotals {
                gross: self.total_gross,
                deductions: self.total_deductions,
                net_payable: self.total_net_payable,
                clinic_profit: self.total_clinic_profit,
                future_receivable: self.total_future_receivable,
            },
            config_snapshot,
            created_by: self.created_by,
            created_at: self.created_at,
        })
    }
}

#[async_trait]
impl SettlementRepository for PgSettlementRepository {
    async fn insert_settlement(&self, record: &SettlementRecord) -> Result<(), StoreError> {
        let lines = serde_json::to_value(&record.lines)
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let config_snapshot = serde_json::to_value(&record.config_snapshot)
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        // Single atomic insert; the uq_settlement_period constraint decides
        // the winner when two attempts race.
        sqlx::query(
            r#"
            INSERT INTO settlements (
                id, clinic_id, professional_id, period_month, period_year,
                lines, total_gross, total_deductions, total_net_payable,
                total_clinic_profit, total_future_receivable,
                config_snapshot, created_by, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(record.id)
        .bind(record.clinic_id)
        .bind(record.professional_id)
        .bind(record.period.month as i16)
        .bind(record.period.year as i16)
        .bind(lines)
        .bind(record.totals.gross)
        .bind(record.totals.deductions)
        .bind(record.totals.net_payable)
        .bind(record.totals.clinic_profit)
        .bind(record.totals.future_receivable)
        .bind(config_snapshot)
        .bind(&record.created_by)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(())
    }

    async fn get_settlement(
        &self,
        clinic_id: Uuid,
        professional_id: Uuid,
        month: u8,
        year: u16,
    ) -> Result<Option<SettlementRecord>, StoreError> {
        let row = sqlx::query_as::<_, SettlementRow>(
            r#"
            SELECT id, clinic_id, professional_id, period_month, period_year,
                   lines, total_gross, total_deductions, total_net_payable,
                   total_clinic_profit, total_future_receivable,
                   config_snapshot, created_by, created_at
            FROM settlements
            WHERE clinic_id = $1 AND professional_id = $2
              AND period_month = $3 AND period_year = $4
            "#,
        )
        .bind(clinic_id)
        .bind(professional_id)
        .bind(month as i16)
        .bind(year as i16)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;

        row.map(SettlementRow::into_record).transpose()
    }
}
