//! Row model for the `jobs` table.

use meshgen_core::job::{Job, JobState};
use meshgen_core::store::StoreError;
use meshgen_core::types::{CredentialId, JobId, Timestamp, UserId};
use sqlx::FromRow;

/// A row from the `jobs` table. The `state` column is free text at the
/// SQL layer (constrained by a CHECK) and parsed on the way out.
#[derive(Debug, Clone, FromRow)]
pub struct JobRow {
    pub id: JobId,
    pub prompt: String,
    pub user_id: UserId,
    pub credential_id: CredentialId,
    pub remote_task_id: Option<String>,
    pub state: String,
    pub model_glb: Option<String>,
    pub model_fbx: Option<String>,
    pub model_usdz: Option<String>,
    pub preview_image: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<JobRow> for Job {
    type Error = StoreError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        let state = JobState::parse(&row.state)
            .ok_or_else(|| StoreError::Corrupt(format!("unknown job state: {}", row.state)))?;
        Ok(Job {
            id: row.id,
            prompt: row.prompt,
            user_id: row.user_id,
            credential_id: row.credential_id,
            remote_task_id: row.remote_task_id,
            state,
            model_glb: row.model_glb,
            model_fbx: row.model_fbx,
            model_usdz: row.model_usdz,
            preview_image: row.preview_image,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
