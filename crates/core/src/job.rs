//! Job entity model and its lifecycle state machine.

use serde::{Deserialize, Serialize};

use crate::types::{CredentialId, JobId, Timestamp, UserId};

/// Lifecycle state of a generation job.
///
/// Transitions: `Pending -> Processing -> {Succeeded, Failed, TimedOut}`.
/// No transition ever leaves a terminal state. A job whose remote
/// submission failed stays `Pending` and may be requeued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Pending,
    Processing,
    Succeeded,
    Failed,
    TimedOut,
}

impl JobState {
    /// Database/wire representation (`TEXT` column value).
    pub fn as_str(self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Processing => "processing",
            JobState::Succeeded => "succeeded",
            JobState::Failed => "failed",
            JobState::TimedOut => "timed_out",
        }
    }

    /// Parse the database/wire representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(JobState::Pending),
            "processing" => Some(JobState::Processing),
            "succeeded" => Some(JobState::Succeeded),
            "failed" => Some(JobState::Failed),
            "timed_out" => Some(JobState::TimedOut),
            _ => None,
        }
    }

    /// Whether no further transition can occur from this state.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobState::Succeeded | JobState::Failed | JobState::TimedOut
        )
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One generation request and its lifecycle state.
///
/// Created by the submission path, mutated only by the task processor,
/// never deleted by this subsystem.
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub id: JobId,
    /// The text prompt forwarded verbatim to the remote provider.
    pub prompt: String,
    pub user_id: UserId,
    /// The credential this job is bound to for its whole lifetime.
    pub credential_id: CredentialId,
    /// Provider-assigned task id. `None` until submission succeeds.
    pub remote_task_id: Option<String>,
    pub state: JobState,
    /// Public artifact locations, populated only on `Succeeded` and
    /// only for outputs the provider actually produced.
    pub model_glb: Option<String>,
    pub model_fbx: Option<String>,
    pub model_usdz: Option<String>,
    pub preview_image: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
