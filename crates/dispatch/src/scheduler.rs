//! The scheduler: submission, admission, worker loops, and the
//! self-healing tick.

use std::sync::{Arc, Weak};

use meshgen_core::job::{Job, JobState};
use meshgen_core::store::JobStore;
use meshgen_core::types::{CredentialId, JobId, UserId};
use meshgen_core::validation::validate_prompt;
use meshgen_events::{NotificationStatus, Notifier};
use meshgen_provider::GenerationProvider;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::config::SchedulerConfig;
use crate::error::DispatchError;
use crate::pool::PoolState;
use crate::processor::process_job;

/// Owns the credential pool view, the job queue, and the worker-slot
/// accounting for one deployment.
///
/// Created once via [`Scheduler::new`]; the returned `Arc` is cheap to
/// clone into whatever surface accepts submissions. Multiple
/// independent instances can coexist (nothing is global), which is how
/// the test suite runs schedulers in parallel.
pub struct Scheduler {
    pub(crate) store: Arc<dyn JobStore>,
    pub(crate) provider: Arc<dyn GenerationProvider>,
    pub(crate) notifier: Arc<Notifier>,
    pub(crate) config: SchedulerConfig,
    /// The only state shared across worker loops. Never held across
    /// an await point.
    state: Mutex<PoolState>,
    /// Cancelled during shutdown; worker loops exit after their
    /// current job.
    cancel: CancellationToken,
    /// Handle back to the owning `Arc`, used to move a clone of the
    /// scheduler into spawned worker loops.
    self_ref: Weak<Scheduler>,
}

impl Scheduler {
    /// Create a scheduler over its three collaborators.
    pub fn new(
        store: Arc<dyn JobStore>,
        provider: Arc<dyn GenerationProvider>,
        notifier: Arc<Notifier>,
        config: SchedulerConfig,
    ) -> Arc<Self> {
        let state = Mutex::new(PoolState::new(config.max_workers_per_key));
        Arc::new_cyclic(|self_ref| Self {
            store,
            provider,
            notifier,
            config,
            state,
            cancel: CancellationToken::new(),
            self_ref: self_ref.clone(),
        })
    }

    /// Accept a generation request into the pipeline.
    ///
    /// Validates the prompt, binds the least-loaded credential, creates
    /// the job as `pending`, enqueues it, and admits a worker if the
    /// credential has a free slot. The returned job only tells the
    /// caller the request was accepted; every later outcome arrives
    /// through the notifier.
    ///
    /// With no credential configured the job is not created and the
    /// error is surfaced synchronously.
    pub async fn submit(&self, prompt: &str, user_id: UserId) -> Result<Job, DispatchError> {
        validate_prompt(prompt).map_err(|e| DispatchError::Validation(e.to_string()))?;

        let credential = self
            .store
            .find_credential_least_loaded()
            .await?
            .ok_or(DispatchError::NoCredentialAvailable)?;

        let job = self.store.create_job(prompt, user_id, credential.id).await?;
        tracing::info!(
            job_id = %job.id,
            credential_id = %credential.id,
            "Job accepted",
        );

        self.enqueue_and_admit(job.id, credential.id).await;
        Ok(job)
    }

    /// Re-admit an existing `pending` job into the worker pool.
    ///
    /// Used when a result is requested before the job has been picked
    /// up (e.g. after a submission failure left it `pending`). A
    /// missing or non-pending job emits an `error` notification and
    /// changes no state — the caller may simply retry.
    pub async fn requeue(&self, job_id: JobId) -> Result<(), DispatchError> {
        let job = self.store.find_job(job_id).await?;
        let Some(job) = job.filter(|j| j.state == JobState::Pending) else {
            self.notifier.publish(
                job_id,
                NotificationStatus::Error,
                "Job is not valid for processing.",
            );
            return Ok(());
        };

        self.enqueue_and_admit(job.id, job.credential_id).await;
        Ok(())
    }

    /// One scheduler pass: admit a worker for the least-loaded
    /// credential if it has queued work and a free slot.
    ///
    /// Calling this with no credentials or no queued jobs is a no-op.
    /// This is what bounds queue staleness to one tick interval when a
    /// worker exits on a transient race.
    pub async fn tick(&self) -> Result<(), DispatchError> {
        let Some(credential) = self.store.find_credential_least_loaded().await? else {
            return Ok(());
        };

        let admitted = {
            let mut state = self.state.lock().await;
            state.has_queued(credential.id) && state.try_acquire_slot(credential.id)
        };
        if admitted {
            self.spawn_worker(credential.id);
        }
        Ok(())
    }

    /// Run the tick loop until [`shutdown`](Scheduler::shutdown) is
    /// called.
    pub async fn run(self: Arc<Self>) {
        let mut ticker = tokio::time::interval(self.config.tick_interval);
        tracing::info!(
            tick_interval_ms = self.config.tick_interval.as_millis() as u64,
            "Scheduler started",
        );

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!("Scheduler shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.tick().await {
                        tracing::error!(error = %e, "Scheduler tick failed");
                    }
                }
            }
        }
    }

    /// Stop the tick loop and let worker loops drain after their
    /// current job.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Live worker-loop count for a credential (observability).
    pub async fn active_workers(&self, credential_id: CredentialId) -> u32 {
        self.state.lock().await.slot_count(credential_id)
    }

    /// Jobs currently queued across all credentials (observability).
    pub async fn queued_jobs(&self) -> usize {
        self.state.lock().await.queued_len()
    }

    // ---- private helpers ----

    /// Enqueue the job and start a worker if a slot is free. A job that
    /// is already queued or in flight is left alone.
    async fn enqueue_and_admit(&self, job_id: JobId, credential_id: CredentialId) {
        let admitted = {
            let mut state = self.state.lock().await;
            if !state.enqueue(job_id, credential_id) {
                tracing::debug!(job_id = %job_id, "Job already queued or in flight");
                return;
            }
            state.try_acquire_slot(credential_id)
        };
        if admitted {
            self.spawn_worker(credential_id);
        }
    }

    fn spawn_worker(&self, credential_id: CredentialId) {
        // Only fails while the last Arc is being dropped; nothing to
        // spawn for in that case.
        let Some(scheduler) = self.self_ref.upgrade() else {
            return;
        };
        tokio::spawn(async move {
            scheduler.worker_loop(credential_id).await;
        });
    }

    /// One worker slot: serially process queued jobs bound to this
    /// credential until none remain, then release the slot and exit.
    ///
    /// A job that fails to process does not abort the loop — the next
    /// queued item is still served, and the slot release on drain is
    /// unconditional.
    async fn worker_loop(self: Arc<Self>, credential_id: CredentialId) {
        tracing::debug!(credential_id = %credential_id, "Worker loop started");

        loop {
            if self.cancel.is_cancelled() {
                self.state.lock().await.release_slot(credential_id);
                tracing::debug!(credential_id = %credential_id, "Worker loop cancelled");
                return;
            }

            let next = self.state.lock().await.pop_for(credential_id);
            let Some(job_id) = next else {
                self.state.lock().await.release_slot(credential_id);
                tracing::debug!(credential_id = %credential_id, "Queue drained, worker loop exiting");
                return;
            };

            if let Err(e) = process_job(&self, job_id, credential_id).await {
                tracing::error!(job_id = %job_id, error = %e, "Task processing failed");
            }
            self.state.lock().await.finish(job_id);
        }
    }
}
