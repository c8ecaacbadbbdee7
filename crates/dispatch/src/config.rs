//! Scheduler configuration.

use std::path::PathBuf;
use std::time::Duration;

use meshgen_core::limits;

/// Tunables for one [`Scheduler`](crate::Scheduler) instance.
///
/// Defaults implement the external contract in
/// [`meshgen_core::limits`].
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Maximum concurrently active worker loops per credential.
    pub max_workers_per_key: u32,

    /// Interval between remote status checks while a task is in flight.
    pub poll_interval: Duration,

    /// Wall-clock deadline for one remote task.
    pub processing_deadline: Duration,

    /// Period of the self-healing admission tick.
    pub tick_interval: Duration,

    /// Directory artifacts are downloaded into (`models/`, `images/`
    /// subdirectories, keyed by remote task id).
    pub assets_dir: PathBuf,

    /// Base URL under which downloaded artifacts are publicly served.
    pub public_base_url: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_workers_per_key: limits::MAX_WORKERS_PER_KEY,
            poll_interval: limits::POLL_INTERVAL,
            processing_deadline: limits::PROCESSING_DEADLINE,
            tick_interval: limits::SCHEDULER_TICK,
            assets_dir: PathBuf::from("assets"),
            public_base_url: "http://localhost:3000".to_string(),
        }
    }
}
