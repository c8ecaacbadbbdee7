//! Asynchronous job dispatch and worker pool.
//!
//! This crate is the scheduling core of the meshgen backend. It binds
//! each submitted job to the least-loaded provider credential, queues
//! it, and bounds in-flight work to at most
//! [`meshgen_core::limits::MAX_WORKERS_PER_KEY`] concurrent worker
//! loops per credential. Each worker loop serially drives one job at a
//! time through the task-processor state machine (submit to the
//! provider, poll to a terminal status or the processing deadline,
//! download artifacts, finalize), then pops the next queued job for
//! its credential and exits when none remain. A 1-second scheduler
//! tick re-admits workers for queued work even when no new submission
//! arrives.
//!
//! Persistence and notification are collaborators behind narrow
//! seams: `meshgen_core::store::JobStore` and
//! `meshgen_events::Notifier`. The scheduler itself owns only the
//! in-memory queue and slot accounting.

mod artifacts;
pub mod config;
pub mod error;
mod pool;
mod processor;
pub mod scheduler;

pub use config::SchedulerConfig;
pub use error::DispatchError;
pub use scheduler::Scheduler;
