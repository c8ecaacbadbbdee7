//! Repository for the `credentials` table.

use meshgen_core::types::CredentialId;
use sqlx::PgPool;

use crate::models::credential::CredentialRow;

/// Column list for `credentials` queries.
const COLUMNS: &str = "id, secret, active_tasks, created_at, updated_at";

/// Persistence operations for provider credentials.
pub struct CredentialRepo;

impl CredentialRepo {
    /// Fetch a credential by id.
    pub async fn find_by_id(
        pool: &PgPool,
        id: CredentialId,
    ) -> Result<Option<CredentialRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM credentials WHERE id = $1");
        sqlx::query_as::<_, CredentialRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The credential with the fewest active tasks, ties broken by
    /// insertion order. Read-only: callers mutate the counter
    /// explicitly via [`increment_active_tasks`] /
    /// [`decrement_active_tasks`].
    ///
    /// [`increment_active_tasks`]: CredentialRepo::increment_active_tasks
    /// [`decrement_active_tasks`]: CredentialRepo::decrement_active_tasks
    pub async fn find_least_loaded(pool: &PgPool) -> Result<Option<CredentialRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM credentials \
             ORDER BY active_tasks ASC, created_at ASC \
             LIMIT 1"
        );
        sqlx::query_as::<_, CredentialRow>(&query)
            .fetch_optional(pool)
            .await
    }

    /// Increment the active task counter.
    pub async fn increment_active_tasks(
        pool: &PgPool,
        id: CredentialId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE credentials \
             SET active_tasks = active_tasks + 1, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Decrement the active task counter, saturating at zero.
    pub async fn decrement_active_tasks(
        pool: &PgPool,
        id: CredentialId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE credentials \
             SET active_tasks = GREATEST(active_tasks - 1, 0), updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }
}
