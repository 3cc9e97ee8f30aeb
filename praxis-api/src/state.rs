use std::sync::Arc;

use praxis_core::repository::{
    CapacityRepository, ClinicConfigRepository, FeeRuleRepository, ProcedureRepository,
};
use praxis_engine::SettlementLedger;

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<SettlementLedger>,
    pub fee_rules: Arc<dyn FeeRuleRepository>,
    pub configs: Arc<dyn ClinicConfigRepository>,
    pub procedures: Arc<dyn ProcedureRepository>,
    pub capacity: Arc<dyn CapacityRepository>,
}
