use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use praxis_core::repository::{
    ClinicConfigRepository, FeeRuleRepository, ProfessionalRepository, SettlementRepository,
    TreatmentRepository,
};
use praxis_core::{EngineError, EngineResult, StoreError};
use praxis_domain::{CalculatedLine, Period, Professional, SettlementRecord};

use crate::fees::resolve_fee;
use crate::payout::calculate_line;

/// A line excluded from a settlement batch because its calculation failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedLine {
    pub treatment_id: Uuid,
    pub reason: String,
}

/// Result of a settlement run: the record plus any lines that were excluded
/// and reported rather than silently zeroed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementOutcome {
    pub record: SettlementRecord,
    pub skipped: Vec<SkippedLine>,
}

/// Aggregates one professional's completed production over a period into a
/// single immutable settlement record.
///
/// Idempotency rests on the store's uniqueness constraint over
/// (clinic, professional, period): two concurrent attempts resolve to one
/// success and one `AlreadySettled`, with no application-level lock.
pub struct SettlementLedger {
    professionals: Arc<dyn ProfessionalRepository>,
    fee_rules: Arc<dyn FeeRuleRepository>,
    configs: Arc<dyn ClinicConfigRepository>,
    treatments: Arc<dyn TreatmentRepository>,
    settlements: Arc<dyn SettlementRepository>,
}

impl SettlementLedger {
    pub fn new(
        professionals: Arc<dyn ProfessionalRepository>,
        fee_rules: Arc<dyn FeeRuleRepository>,
        configs: Arc<dyn ClinicConfigRepository>,
        treatments: Arc<dyn TreatmentRepository>,
        settlements: Arc<dyn SettlementRepository>,
    ) -> Self {
        Self { professionals, fee_rules, configs, treatments, settlements }
    }

    /// Compute and commit the settlement for (clinic, professional, period).
    ///
    /// Fee rules and installment state are read as of now; the computed
    /// snapshot is authoritative even if a payment lands seconds later.
    pub async fn settle(
        &self,
        clinic_id: Uuid,
        professional_id: Uuid,
        period: Period,
        created_by: String,
    ) -> EngineResult<SettlementOutcome> {
        let (record, skipped) = self
            .compute(clinic_id, professional_id, period, created_by)
            .await?;

        match self.settlements.insert_settlement(&record).await {
            Ok(()) => {}
            Err(StoreError::Conflict(_)) => {
                // An earlier attempt won the race. If it failed between its
                // insert and its mark step, its lines are still open; close
                // them from the committed record before reporting the
                // conflict, so a retry fully converges.
                self.close_lines_of_existing(clinic_id, professional_id, period).await?;
                return Err(EngineError::AlreadySettled { professional_id, period });
            }
            Err(other) => return Err(other.into()),
        }

        let line_ids: Vec<Uuid> = record.lines.iter().map(|l| l.treatment_id).collect();
        self.treatments.mark_lines_settled(&line_ids).await?;

        info!(
            %professional_id,
            %period,
            lines = record.lines.len(),
            net_payable = record.totals.net_payable,
            "settlement committed"
        );

        Ok(SettlementOutcome { record, skipped })
    }

    /// Same computation as `settle`, but nothing is written and no line is
    /// closed. Used for the pre-settlement review screen.
    pub async fn preview(
        &self,
        clinic_id: Uuid,
        professional_id: Uuid,
        period: Period,
    ) -> EngineResult<SettlementOutcome> {
        let (record, skipped) = self
            .compute(clinic_id, professional_id, period, String::new())
            .await?;
        Ok(SettlementOutcome { record, skipped })
    }

    async fn compute(
        &self,
        clinic_id: Uuid,
        professional_id: Uuid,
        period: Period,
        created_by: String,
    ) -> EngineResult<(SettlementRecord, Vec<SkippedLine>)> {
        let professional = self.load_professional(clinic_id, professional_id).await?;

        let config = self
            .configs
            .get_config(clinic_id)
            .await?
            .ok_or(EngineError::NotFound {
                entity: "clinic financial config",
                id: clinic_id.to_string(),
            })?;

        let lines = self
            .treatments
            .list_completed_lines(
                clinic_id,
                professional_id,
                period.first_day(),
                period.last_day(),
            )
            .await?;

        let mut calculated: Vec<CalculatedLine> = Vec::with_capacity(lines.len());
        let mut skipped = Vec::new();

        for line in &lines {
            let custom = self
                .fee_rules
                .get_fee_rule(professional_id, line.procedure_id)
                .await?;
            let fee_rule = resolve_fee(custom);

            let installments = self.treatments.list_installments(line.sale_id).await?;

            match calculate_line(line, professional.payout_rule, &fee_rule, &config, &installments)
            {
                Ok(calc) => calculated.push(calc),
                Err(err) => {
                    // A bad line aborts that line only, never the batch.
                    warn!(treatment_id = %line.id, %err, "excluding line from settlement");
                    skipped.push(SkippedLine { treatment_id: line.id, reason: err.to_string() });
                }
            }
        }

        let record = SettlementRecord::new(
            clinic_id,
            professional_id,
            period,
            calculated,
            config,
            created_by,
        );

        Ok((record, skipped))
    }

    async fn close_lines_of_existing(
        &self,
        clinic_id: Uuid,
        professional_id: Uuid,
        period: Period,
    ) -> EngineResult<()> {
        let existing = self
            .settlements
            .get_settlement(clinic_id, professional_id, period.month, period.year)
            .await?;

        if let Some(record) = existing {
            let line_ids: Vec<Uuid> = record.lines.iter().map(|l| l.treatment_id).collect();
            // Idempotent: lines already settled stay settled.
            self.treatments.mark_lines_settled(&line_ids).await?;
        }
        Ok(())
    }

    async fn load_professional(
        &self,
        clinic_id: Uuid,
        professional_id: Uuid,
    ) -> EngineResult<Professional> {
        self.professionals
            .get_professional(clinic_id, professional_id)
            .await?
            .ok_or(EngineError::NotFound {
                entity: "professional",
                id: professional_id.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use praxis_domain::{
        ClinicFinancialConfig, FeeRule, Installment, PayoutRule, TreatmentLine, TreatmentStatus,
    };
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct InMemoryStore {
        professionals: Mutex<HashMap<Uuid, Professional>>,
        configs: Mutex<HashMap<Uuid, ClinicFinancialConfig>>,
        fee_rules: Mutex<HashMap<(Uuid, Uuid), FeeRule>>,
        lines: Mutex<Vec<TreatmentLine>>,
        installments: Mutex<HashMap<Uuid, Vec<Installment>>>,
        settlements: Mutex<HashMap<(Uuid, Uuid, u8, u16), SettlementRecord>>,
    }

    #[async_trait]
    impl ProfessionalRepository for InMemoryStore {
        async fn get_professional(
            &self,
            _clinic_id: Uuid,
            professional_id: Uuid,
        ) -> Result<Option<Professional>, StoreError> {
            Ok(self.professionals.lock().unwrap().get(&professional_id).cloned())
        }
    }

    #[async_trait]
    impl FeeRuleRepository for InMemoryStore {
        async fn get_fee_rule(
            &self,
            professional_id: Uuid,
            procedure_id: Uuid,
        ) -> Result<Option<FeeRule>, StoreError> {
            Ok(self
                .fee_rules
                .lock()
                .unwrap()
                .get(&(professional_id, procedure_id))
                .cloned())
        }

        async fn upsert_fee_rule(&self, rule: &FeeRule) -> Result<(), StoreError> {
            if let (Some(prof), Some(proc_)) = (rule.professional_id, rule.procedure_id) {
                self.fee_rules.lock().unwrap().insert((prof, proc_), rule.clone());
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ClinicConfigRepository for InMemoryStore {
        async fn get_config(
            &self,
            clinic_id: Uuid,
        ) -> Result<Option<ClinicFinancialConfig>, StoreError> {
            Ok(self.configs.lock().unwrap().get(&clinic_id).cloned())
        }

        async fn upsert_config(&self, config: &ClinicFinancialConfig) -> Result<(), StoreError> {
            self.configs.lock().unwrap().insert(config.clinic_id, config.clone());
            Ok(())
        }
    }

    #[async_trait]
    impl TreatmentRepository for InMemoryStore {
        async fn list_completed_lines(
            &self,
            clinic_id: Uuid,
            professional_id: Uuid,
            from: NaiveDate,
            to: NaiveDate,
        ) -> Result<Vec<TreatmentLine>, StoreError> {
            Ok(self
                .lines
                .lock()
                .unwrap()
                .iter()
                .filter(|l| {
                    l.clinic_id == clinic_id
                        && l.professional_id == professional_id
                        && l.status == TreatmentStatus::Completed
                        && l.performed_on >= from
                        && l.performed_on <= to
                })
                .cloned()
                .collect())
        }

        async fn list_installments(&self, sale_id: Uuid) -> Result<Vec<Installment>, StoreError> {
            Ok(self
                .installments
                .lock()
                .unwrap()
                .get(&sale_id)
                .cloned()
                .unwrap_or_default())
        }

        async fn mark_lines_settled(&self, line_ids: &[Uuid]) -> Result<(), StoreError> {
            for line in self.lines.lock().unwrap().iter_mut() {
                if line_ids.contains(&line.id) {
                    line.status = TreatmentStatus::Settled;
                }
            }
            Ok(())
        }
    }

    #[async_trait]
    impl SettlementRepository for InMemoryStore {
        async fn insert_settlement(&self, record: &SettlementRecord) -> Result<(), StoreError> {
            let key = (
                record.clinic_id,
                record.professional_id,
                record.period.month,
                record.period.year,
            );
            let mut settlements = self.settlements.lock().unwrap();
            if settlements.contains_key(&key) {
                return Err(StoreError::Conflict("settlement period unique key".to_string()));
            }
            settlements.insert(key, record.clone());
            Ok(())
        }

        async fn get_settlement(
            &self,
            clinic_id: Uuid,
            professional_id: Uuid,
            month: u8,
            year: u16,
        ) -> Result<Option<SettlementRecord>, StoreError> {
            Ok(self
                .settlements
                .lock()
                .unwrap()
                .get(&(clinic_id, professional_id, month, year))
                .cloned())
        }
    }

    struct Fixture {
        store: Arc<InMemoryStore>,
        ledger: SettlementLedger,
        clinic_id: Uuid,
        professional_id: Uuid,
    }

    fn fixture(payout_rule: PayoutRule) -> Fixture {
        let store = Arc::new(InMemoryStore::default());
        let clinic_id = Uuid::new_v4();
        let professional = Professional::new(clinic_id, "Dr. Reis".to_string(), payout_rule);
        let professional_id = professional.id;

        store.professionals.lock().unwrap().insert(professional_id, professional);
        store.configs.lock().unwrap().insert(
            clinic_id,
            ClinicFinancialConfig::new(clinic_id, 0.11, 0.03, 0.3).unwrap(),
        );

        let ledger = SettlementLedger::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
        );

        Fixture { store, ledger, clinic_id, professional_id }
    }

    fn add_line(fx: &Fixture, day: u32, sale_price: f64, lab_cost: f64) -> TreatmentLine {
        let line = TreatmentLine {
            id: Uuid::new_v4(),
            clinic_id: fx.clinic_id,
            sale_id: Uuid::new_v4(),
            procedure_id: Uuid::new_v4(),
            professional_id: fx.professional_id,
            performed_on: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            sale_price,
            lab_cost,
            status: TreatmentStatus::Completed,
        };
        fx.store.lines.lock().unwrap().push(line.clone());
        line
    }

    #[tokio::test]
    async fn settles_a_period_and_closes_its_lines() {
        let fx = fixture(PayoutRule::FullOnCompletion);
        add_line(&fx, 5, 1000.0, 50.0);
        add_line(&fx, 20, 500.0, 0.0);

        let period = Period::new(3, 2024).unwrap();
        let outcome = fx
            .ledger
            .settle(fx.clinic_id, fx.professional_id, period, "admin".to_string())
            .await
            .unwrap();

        assert_eq!(outcome.record.lines.len(), 2);
        assert!(outcome.skipped.is_empty());
        assert!((outcome.record.totals.gross - 1500.0).abs() < 1e-9);

        // Lines are closed for the period.
        let remaining = fx
            .store
            .list_completed_lines(fx.clinic_id, fx.professional_id, period.first_day(), period.last_day())
            .await
            .unwrap();
        assert!(remaining.is_empty());
    }

    #[tokio::test]
    async fn second_settlement_for_same_period_is_a_conflict() {
        let fx = fixture(PayoutRule::FullOnCompletion);
        add_line(&fx, 10, 800.0, 0.0);

        let period = Period::new(3, 2024).unwrap();
        let first = fx
            .ledger
            .settle(fx.clinic_id, fx.professional_id, period, "admin".to_string())
            .await
            .unwrap();

        // Simulate a racing attempt that observed the same completed lines.
        fx.store.lines.lock().unwrap().iter_mut().for_each(|l| {
            l.status = TreatmentStatus::Completed;
        });

        let second = fx
            .ledger
            .settle(fx.clinic_id, fx.professional_id, period, "admin".to_string())
            .await;
        assert!(matches!(second, Err(EngineError::AlreadySettled { .. })));

        // The first record is untouched.
        let stored = fx
            .store
            .get_settlement(fx.clinic_id, fx.professional_id, 3, 2024)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.id, first.record.id);
    }

    #[tokio::test]
    async fn conflict_retry_closes_lines_a_failed_mark_left_open() {
        let fx = fixture(PayoutRule::FullOnCompletion);
        add_line(&fx, 10, 800.0, 0.0);

        let period = Period::new(3, 2024).unwrap();
        fx.ledger
            .settle(fx.clinic_id, fx.professional_id, period, "admin".to_string())
            .await
            .unwrap();

        // Simulate an attempt that crashed after its insert but before its
        // mark step: the record exists while the lines sit open again.
        fx.store.lines.lock().unwrap().iter_mut().for_each(|l| {
            l.status = TreatmentStatus::Completed;
        });

        let retry = fx
            .ledger
            .settle(fx.clinic_id, fx.professional_id, period, "admin".to_string())
            .await;
        assert!(matches!(retry, Err(EngineError::AlreadySettled { .. })));

        // The retry converged: the closed period's lines no longer show up
        // as settleable (or in a preview of the period).
        let reopened = fx
            .store
            .list_completed_lines(fx.clinic_id, fx.professional_id, period.first_day(), period.last_day())
            .await
            .unwrap();
        assert!(reopened.is_empty());
    }

    #[tokio::test]
    async fn lines_outside_the_period_are_not_settled() {
        let fx = fixture(PayoutRule::FullOnCompletion);
        add_line(&fx, 15, 1000.0, 0.0);
        // April line must not enter a March settlement.
        let line = TreatmentLine {
            performed_on: NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
            ..add_line(&fx, 1, 999.0, 0.0)
        };
        fx.store.lines.lock().unwrap().pop();
        fx.store.lines.lock().unwrap().push(line);

        let outcome = fx
            .ledger
            .settle(fx.clinic_id, fx.professional_id, Period::new(3, 2024).unwrap(), "admin".to_string())
            .await
            .unwrap();
        assert_eq!(outcome.record.lines.len(), 1);
    }

    #[tokio::test]
    async fn proportional_rule_aggregates_future_receivable() {
        let fx = fixture(PayoutRule::ProportionalToPayment);
        let line = add_line(&fx, 8, 1000.0, 50.0);
        fx.store.installments.lock().unwrap().insert(
            line.sale_id,
            vec![
                Installment { id: Uuid::new_v4(), sale_id: line.sale_id, amount: 500.0, paid: true },
                Installment { id: Uuid::new_v4(), sale_id: line.sale_id, amount: 500.0, paid: false },
            ],
        );

        let outcome = fx
            .ledger
            .settle(fx.clinic_id, fx.professional_id, Period::new(3, 2024).unwrap(), "admin".to_string())
            .await
            .unwrap();

        let calc = &outcome.record.lines[0];
        assert!((calc.professional_fee + calc.future_receivable - calc.base_fee).abs() < 1e-9);
        assert!(outcome.record.totals.future_receivable > 0.0);
    }

    #[tokio::test]
    async fn custom_fee_rule_overrides_the_default() {
        let fx = fixture(PayoutRule::FullOnCompletion);
        let line = add_line(&fx, 12, 1000.0, 0.0);
        fx.store
            .upsert_fee_rule(&FeeRule::fixed(fx.professional_id, line.procedure_id, 200.0).unwrap())
            .await
            .unwrap();

        let outcome = fx
            .ledger
            .preview(fx.clinic_id, fx.professional_id, Period::new(3, 2024).unwrap())
            .await
            .unwrap();
        assert!((outcome.record.lines[0].base_fee - 200.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn preview_writes_nothing() {
        let fx = fixture(PayoutRule::FullOnCompletion);
        add_line(&fx, 3, 400.0, 0.0);

        let period = Period::new(3, 2024).unwrap();
        fx.ledger
            .preview(fx.clinic_id, fx.professional_id, period)
            .await
            .unwrap();

        assert!(fx
            .store
            .get_settlement(fx.clinic_id, fx.professional_id, 3, 2024)
            .await
            .unwrap()
            .is_none());
        let still_open = fx
            .store
            .list_completed_lines(fx.clinic_id, fx.professional_id, period.first_day(), period.last_day())
            .await
            .unwrap();
        assert_eq!(still_open.len(), 1);
    }

    #[tokio::test]
    async fn malformed_line_is_excluded_and_reported() {
        let fx = fixture(PayoutRule::FullOnCompletion);
        add_line(&fx, 6, 1000.0, 0.0);
        // Corrupt data: negative price must exclude the line, not zero it.
        let mut bad = add_line(&fx, 7, 0.0, 0.0);
        bad.sale_price = -10.0;
        fx.store.lines.lock().unwrap().pop();
        fx.store.lines.lock().unwrap().push(bad.clone());

        let outcome = fx
            .ledger
            .settle(fx.clinic_id, fx.professional_id, Period::new(3, 2024).unwrap(), "admin".to_string())
            .await
            .unwrap();

        assert_eq!(outcome.record.lines.len(), 1);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].treatment_id, bad.id);
    }

    #[tokio::test]
    async fn unknown_professional_is_not_found() {
        let fx = fixture(PayoutRule::FullOnCompletion);
        let result = fx
            .ledger
            .settle(fx.clinic_id, Uuid::new_v4(), Period::new(3, 2024).unwrap(), "admin".to_string())
            .await;
        assert!(matches!(result, Err(EngineError::NotFound { .. })));
    }
}
