use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use praxis_core::repository::TreatmentRepository;
use praxis_core::StoreError;
use praxis_domain::{Installment, TreatmentLine, TreatmentStatus};

use crate::map_sqlx;

pub struct PgTreatmentRepository {
    pool: PgPool,
}

impl PgTreatmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TreatmentLineRow {
    id: Uuid,
    clinic_id: Uuid,
    sale_id: Uuid,
    procedure_id: Uuid,
    professional_id: Uuid,
    performed_on: NaiveDate,
    sale_price: f64,
    lab_cost: f64,
    status: String,
}

#[derive(sqlx::FromRow)]
struct InstallmentRow {
    id: Uuid,
    sale_id: Uuid,
    amount: f64,
    paid: bool,
}

fn parse_status(raw: &str) -> Result<TreatmentStatus, StoreError> {
    match raw {
        "PLANNED" => Ok(TreatmentStatus::Planned),
        "IN_PROGRESS" => Ok(TreatmentStatus::InProgress),
        "COMPLETED" => Ok(TreatmentStatus::Completed),
        "SETTLED" => Ok(TreatmentStatus::Settled),
        other => Err(StoreError::Backend(format!("unknown treatment status in store: {other}"))),
    }
}

#[async_trait]
impl TreatmentRepository for PgTreatmentRepository {
    async fn list_completed_lines(
        &self,
        clinic_id: Uuid,
        professional_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<TreatmentLine>, StoreError> {
        let rows = sqlx::query_as::<_, TreatmentLineRow>(
            r#"
            SELECT id, clinic_id, sale_id, procedure_id, professional_id,
                   performed_on, sale_price, lab_cost, status
            FROM treatment_lines
            WHERE clinic_id = $1
              AND professional_id = $2
              AND status = 'COMPLETED'
              AND performed_on BETWEEN $3 AND $4
            ORDER BY performed_on
            "#,
        )
        .bind(clinic_id)
        .bind(professional_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;

        rows.into_iter()
            .map(|r| {
                Ok(TreatmentLine {
                    id: r.id,
                    clinic_id: r.clinic_id,
                    sale_id: r.sale_id,
                    procedure_id: r.procedure_id,
                    professional_id: r.professional_id,
                    performed_on: r.performed_on,
                    sale_price: r.sale_price,
                    lab_cost: r.lab_cost,
                    status: parse_status(&r.status)?,
                })
            })
            .collect()
    }

    async fn list_installments(&self, sale_id: Uuid) -> Result<Vec<Installment>, StoreError> {
        let rows = sqlx::query_as::<_, InstallmentRow>(
            r#"
            SELECT id, sale_id, amount, paid
            FROM installments
            WHERE sale_id = $1
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(rows
            .into_iter()
            .map(|r| Installment { id: r.id, sale_id: r.sale_id, amount: r.amount, paid: r.paid })
            .collect())
    }

    async fn mark_lines_settled(&self, line_ids: &[Uuid]) -> Result<(), StoreError> {
        if line_ids.is_empty() {
            return Ok(());
        }

        sqlx::query(
            r#"
            UPDATE treatment_lines
            SET status = 'SETTLED'
            WHERE id = ANY($1)
            "#,
        )
        .bind(line_ids)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(())
    }
}
