use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use praxis_core::repository::ProcedureRepository;
use praxis_core::StoreError;
use praxis_domain::Procedure;

use crate::map_sqlx;

pub struct PgProcedureRepository {
    pool: PgPool,
}

impl PgProcedureRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProcedureRow {
    id: Uuid,
    clinic_id: Uuid,
    name: String,
    standard_price: f64,
    lab_cost_estimate: f64,
    duration_minutes: i32,
}

#[async_trait]
impl ProcedureRepository for PgProcedureRepository {
    async fn get_procedure(
        &self,
        clinic_id: Uuid,
        procedure_id: Uuid,
    ) -> Result<Option<Procedure>, StoreError> {
        let row = sqlx::query_as::<_, ProcedureRow>(
            r#"
            SELECT id, clinic_id, name, standard_price, lab_cost_estimate, duration_minutes
            FROM procedures
            WHERE id = $1 AND clinic_id = $2
            "#,
        )
        .bind(procedure_id)
        .bind(clinic_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(row.map(|r| Procedure {
            id: r.id,
            clinic_id: r.clinic_id,
            name: r.name,
            standard_price: r.standard_price,
            lab_cost_estimate: r.lab_cost_estimate,
            duration_minutes: r.duration_minutes.max(0) as u32,
        }))
    }

    async fn upsert_procedure(&self, procedure: &Procedure) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO procedures (id, clinic_id, name, standard_price, lab_cost_estimate, duration_minutes)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id)
            DO UPDATE SET
                name = EXCLUDED.name,
                standard_price = EXCLUDED.standard_price,
                lab_cost_estimate = EXCLUDED.lab_cost_estimate,
                duration_minutes = EXCLUDED.duration_minutes
            "#,
        )
        .bind(procedure.id)
        .bind(procedure.clinic_id)
        .bind(&procedure.name)
        .bind(procedure.standard_price)
        .bind(procedure.lab_cost_estimate)
        .bind(procedure.duration_minutes as i32)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(())
    }
}
