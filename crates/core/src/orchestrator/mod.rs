//! Request-granular conversion orchestration.
//!
//! A request moves through
//! `Received -> Classified -> StrategySelected -> Executing -> {Succeeded, Failed}`;
//! both terminal states schedule input cleanup before the outcome is
//! returned. The orchestrator is the only component with side effects at the
//! request granularity.

mod runner;

pub use runner::{ConversionOutcome, Orchestrator};
