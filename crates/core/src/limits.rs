//! Dispatch limit constants.
//!
//! These values form the external contract of the worker pool and are
//! shared by the dispatcher and the daemon binary; the dispatcher's
//! `SchedulerConfig` defaults are wired to them.

use std::time::Duration;

/// Maximum number of concurrently active worker loops per credential.
///
/// There is no global cap: total concurrency is
/// `MAX_WORKERS_PER_KEY x credential count`.
pub const MAX_WORKERS_PER_KEY: u32 = 3;

/// Interval between status checks while a remote task is in flight.
pub const POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Wall-clock deadline for a single remote task. A task that has not
/// reached a terminal provider status by then is timed out.
pub const PROCESSING_DEADLINE: Duration = Duration::from_secs(15 * 60);

/// Period of the self-healing scheduler tick that drains queued jobs
/// even when no new submission arrives.
pub const SCHEDULER_TICK: Duration = Duration::from_millis(1000);
