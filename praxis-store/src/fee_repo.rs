use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use praxis_core::repository::FeeRuleRepository;
use praxis_core::StoreError;
use praxis_domain::{FeeKind, FeeRule};

use crate::map_sqlx;

pub struct PgFeeRuleRepository {
    pool: PgPool,
}

impl PgFeeRuleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct FeeRuleRow {
    professional_id: Uuid,
    procedure_id: Uuid,
    kind: String,
    value: f64,
}

fn parse_kind(raw: &str) -> Result<FeeKind, StoreError> {
    match raw {
        "FIXED" => Ok(FeeKind::Fixed),
        "PERCENTAGE" => Ok(FeeKind::Percentage),
        other => Err(StoreError::Backend(format!("unknown fee kind in store: {other}"))),
    }
}

fn kind_str(kind: FeeKind) -> &'static str {
    match kind {
        FeeKind::Fixed => "FIXED",
        FeeKind::Percentage => "PERCENTAGE",
    }
}

#[async_trait]
impl FeeRuleRepository for PgFeeRuleRepository {
    async fn get_fee_rule(
        &self,
        professional_id: Uuid,
        procedure_id: Uuid,
    ) -> Result<Option<FeeRule>, StoreError> {
        let row = sqlx::query_as::<_, FeeRuleRow>(
            r#"
            SELECT professional_id, procedure_id, kind, value
            FROM fee_rules
            WHERE professional_id = $1 AND procedure_id = $2
            "#,
        )
        .bind(professional_id)
        .bind(procedure_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;

        row.map(|r| {
            Ok(FeeRule {
                professional_id: Some(r.professional_id),
                procedure_id: Some(r.procedure_id),
                kind: parse_kind(&r.kind)?,
                value: r.value,
            })
        })
        .transpose()
    }

    async fn upsert_fee_rule(&self, rule: &FeeRule) -> Result<(), StoreError> {
        let (professional_id, procedure_id) = match (rule.professional_id, rule.procedure_id) {
            (Some(prof), Some(proc_)) => (prof, proc_),
            _ => {
                return Err(StoreError::Backend(
                    "only pair-scoped fee rules are persisted".to_string(),
                ))
            }
        };

        sqlx::query(
            r#"
            INSERT INTO fee_rules (professional_id, procedure_id, kind, value)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (professional_id, procedure_id)
            DO UPDATE SET kind = EXCLUDED.kind, value = EXCLUDED.value
            "#,
        )
        .bind(professional_id)
        .bind(procedure_id)
        .bind(kind_str(rule.kind))
        .bind(rule.value)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(())
    }
}
