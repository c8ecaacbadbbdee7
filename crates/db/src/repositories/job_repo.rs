//! Repository for the `jobs` table.

use meshgen_core::job::JobState;
use meshgen_core::store::JobUpdate;
use meshgen_core::types::{CredentialId, JobId, UserId};
use sqlx::PgPool;

use crate::models::job::JobRow;

/// Column list for `jobs` queries.
const COLUMNS: &str = "\
    id, prompt, user_id, credential_id, remote_task_id, state, \
    model_glb, model_fbx, model_usdz, preview_image, \
    created_at, updated_at";

/// Persistence operations for generation jobs.
pub struct JobRepo;

impl JobRepo {
    /// Insert a new `pending` job bound to a credential.
    pub async fn create(
        pool: &PgPool,
        prompt: &str,
        user_id: UserId,
        credential_id: CredentialId,
    ) -> Result<JobRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO jobs (prompt, user_id, credential_id, state) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, JobRow>(&query)
            .bind(prompt)
            .bind(user_id)
            .bind(credential_id)
            .bind(JobState::Pending.as_str())
            .fetch_one(pool)
            .await
    }

    /// Fetch a job by id.
    pub async fn find_by_id(pool: &PgPool, id: JobId) -> Result<Option<JobRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE id = $1");
        sqlx::query_as::<_, JobRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Apply a partial update. `None` fields keep their current value.
    pub async fn update(pool: &PgPool, id: JobId, update: &JobUpdate) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE jobs SET \
                 state = COALESCE($2, state), \
                 remote_task_id = COALESCE($3, remote_task_id), \
                 model_glb = COALESCE($4, model_glb), \
                 model_fbx = COALESCE($5, model_fbx), \
                 model_usdz = COALESCE($6, model_usdz), \
                 preview_image = COALESCE($7, preview_image), \
                 updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(update.state.map(JobState::as_str))
        .bind(update.remote_task_id.as_deref())
        .bind(update.model_glb.as_deref())
        .bind(update.model_fbx.as_deref())
        .bind(update.model_usdz.as_deref())
        .bind(update.preview_image.as_deref())
        .execute(pool)
        .await?;
        Ok(())
    }
}
