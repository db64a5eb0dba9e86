//! Simulation driver - the settlement facade and the daily tick

pub mod settlement;
pub mod tick;

pub use settlement::{HarvestReport, Settlement, SettlementState};
pub use tick::{ActionOutcome, ActionReport, ExecutionResult, SkipReason, SkippedAction, TickExecutor};
