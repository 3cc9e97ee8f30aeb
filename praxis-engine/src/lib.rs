pub mod capacity;
pub mod deductions;
pub mod fees;
pub mod ledger;
pub mod margin;
pub mod payout;
pub mod progress;

pub use capacity::CapacityCostEngine;
pub use deductions::{compute_deductions, Deductions};
pub use fees::resolve_fee;
pub use ledger::{SettlementLedger, SettlementOutcome, SkippedLine};
pub use margin::{actual_margin_percent, suggested_fee};
pub use payout::calculate_line;
pub use progress::payment_progress;
