//! The Job Store collaborator seam.
//!
//! The dispatcher never talks to a database directly; it consumes this
//! narrow trait. `meshgen-db` provides the PostgreSQL implementation,
//! and tests run against an in-memory fake.

use async_trait::async_trait;

use crate::credential::Credential;
use crate::job::{Job, JobState};
use crate::types::{CredentialId, JobId, UserId};

/// Error surfaced by a [`JobStore`] implementation.
///
/// Backends map their native error (e.g. `sqlx::Error`) to a string so
/// this crate stays dependency-free.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),

    /// A persisted row could not be mapped back to a domain value
    /// (e.g. an unknown job state string).
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Partial update applied to a job record. `None` fields are left
/// untouched.
#[derive(Debug, Clone, Default)]
pub struct JobUpdate {
    pub state: Option<JobState>,
    pub remote_task_id: Option<String>,
    pub model_glb: Option<String>,
    pub model_fbx: Option<String>,
    pub model_usdz: Option<String>,
    pub preview_image: Option<String>,
}

impl JobUpdate {
    /// Update recording a successful provider submission.
    pub fn submitted(remote_task_id: impl Into<String>) -> Self {
        Self {
            state: Some(JobState::Processing),
            remote_task_id: Some(remote_task_id.into()),
            ..Self::default()
        }
    }

    /// Update moving the job to a terminal state with no artifacts.
    pub fn state(state: JobState) -> Self {
        Self {
            state: Some(state),
            ..Self::default()
        }
    }
}

/// Persistence operations consumed by the dispatcher.
///
/// Counter mutations (`increment_credential_load` /
/// `decrement_credential_load`) are explicit and separate from
/// selection so [`find_credential_least_loaded`] stays read-only and
/// idempotent, safe to call from both the submission path and the
/// periodic scheduler tick.
///
/// [`find_credential_least_loaded`]: JobStore::find_credential_least_loaded
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn find_job(&self, id: JobId) -> Result<Option<Job>, StoreError>;

    /// Create a new `pending` job bound to the given credential.
    async fn create_job(
        &self,
        prompt: &str,
        user_id: UserId,
        credential_id: CredentialId,
    ) -> Result<Job, StoreError>;

    /// Apply a partial update to a job record.
    async fn update_job(&self, id: JobId, update: JobUpdate) -> Result<(), StoreError>;

    async fn find_credential(&self, id: CredentialId) -> Result<Option<Credential>, StoreError>;

    /// The credential with the minimum `active_tasks`, ties broken by
    /// insertion order. `None` when no credentials exist. Read-only.
    async fn find_credential_least_loaded(&self) -> Result<Option<Credential>, StoreError>;

    async fn increment_credential_load(&self, id: CredentialId) -> Result<(), StoreError>;

    /// Decrement, saturating at zero: `active_tasks` is never negative.
    async fn decrement_credential_load(&self, id: CredentialId) -> Result<(), StoreError>;
}
