use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use praxis_core::repository::ProfessionalRepository;
use praxis_core::StoreError;
use praxis_domain::{PayoutRule, Professional};

use crate::map_sqlx;

pub struct PgProfessionalRepository {
    pool: PgPool,
}

impl PgProfessionalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProfessionalRow {
    id: Uuid,
    clinic_id: Uuid,
    display_name: String,
    payout_rule: String,
    active: bool,
    created_at: chrono::DateTime<chrono::Utc>,
}

fn parse_payout_rule(raw: &str) -> Result<PayoutRule, StoreError> {
    match raw {
        "FULL_ON_COMPLETION" => Ok(PayoutRule::FullOnCompletion),
        "PROPORTIONAL_TO_PAYMENT" => Ok(PayoutRule::ProportionalToPayment),
        other => Err(StoreError::Backend(format!("unknown payout rule in store: {other}"))),
    }
}

#[async_trait]
impl ProfessionalRepository for PgProfessionalRepository {
    async fn get_professional(
        &self,
        clinic_id: Uuid,
        professional_id: Uuid,
    ) -> Result<Option<Professional>, StoreError> {
        let row = sqlx::query_as::<_, ProfessionalRow>(
            r#"
            SELECT id, clinic_id, display_name, payout_rule, active, created_at
            FROM professionals
            WHERE id = $1 AND clinic_id = $2
            "#,
        )
        .bind(professional_id)
        .bind(clinic_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;

        row.map(|r| {
            Ok(Professional {
                id: r.id,
                clinic_id: r.clinic_id,
                display_name: r.display_name,
                payout_rule: parse_payout_rule(&r.payout_rule)?,
                active: r.active,
                created_at: r.created_at,
            })
        })
        .transpose()
    }
}
