use serde::{Deserialize, Serialize};

pub mod aggregator;
pub mod executor;
pub mod scheduler;

pub use aggregator::{percentile, summarize};
pub use executor::RequestExecutor;
pub use scheduler::LoadScheduler;

/// Lifecycle of a load-test run.
///
/// A run only moves forward: `Idle -> Running -> Completed`. There is no
/// cancelled state; once started, a run finishes its current round and stops
/// at the next deadline check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineStatus {
    /// No run has started yet.
    #[default]
    Idle,
    /// Rounds are being launched.
    Running,
    /// The deadline passed and the last round has settled.
    Completed,
}

impl std::fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EngineStatus::Idle => "idle",
            EngineStatus::Running => "running",
            EngineStatus::Completed => "completed",
        };
        write!(f, "{s}")
    }
}
