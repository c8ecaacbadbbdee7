//! Typed status payloads returned by the provider's polling endpoint.

use serde::Deserialize;

/// Remote task state as reported by `GET /v2/status/{id}`.
///
/// The provider's status vocabulary is open-ended; anything that is
/// not `complete` or `failed` means the task is still in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteTaskState {
    Complete,
    Failed,
    #[serde(other)]
    InProgress,
}

/// Artifact download URLs present once a task completes.
///
/// Every field is optional: the provider only produces the output
/// kinds the generation actually yielded.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskOutputs {
    #[serde(default)]
    pub glb: Option<String>,
    #[serde(default)]
    pub fbx: Option<String>,
    #[serde(default)]
    pub usdz: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

/// Full response body of one status poll.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskStatus {
    pub status: RemoteTaskState,
    /// Completion percentage. Absent while the task is queued.
    #[serde(default)]
    pub progress: Option<f64>,
    /// Present only when `status` is `complete`.
    #[serde(default)]
    pub outputs: Option<TaskOutputs>,
}

impl TaskStatus {
    /// Best-effort integer progress percentage: floored, 0 if absent.
    pub fn progress_percent(&self) -> i32 {
        self.progress.map(|p| p.floor() as i32).unwrap_or(0)
    }
}
