//! [`JobStore`] implementation backed by PostgreSQL.

use async_trait::async_trait;
use meshgen_core::credential::Credential;
use meshgen_core::job::Job;
use meshgen_core::store::{JobStore, JobUpdate, StoreError};
use meshgen_core::types::{CredentialId, JobId, UserId};
use sqlx::PgPool;

use crate::repositories::{CredentialRepo, JobRepo};

/// Adapts the repository layer to the narrow store trait the
/// dispatcher consumes. Cheap to clone; wraps the shared pool.
#[derive(Clone)]
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map a database error to the backend-agnostic store error.
fn db_err(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn find_job(&self, id: JobId) -> Result<Option<Job>, StoreError> {
        JobRepo::find_by_id(&self.pool, id)
            .await
            .map_err(db_err)?
            .map(Job::try_from)
            .transpose()
    }

    async fn create_job(
        &self,
        prompt: &str,
        user_id: UserId,
        credential_id: CredentialId,
    ) -> Result<Job, StoreError> {
        let row = JobRepo::create(&self.pool, prompt, user_id, credential_id)
            .await
            .map_err(db_err)?;
        Job::try_from(row)
    }

    async fn update_job(&self, id: JobId, update: JobUpdate) -> Result<(), StoreError> {
        JobRepo::update(&self.pool, id, &update)
            .await
            .map_err(db_err)
    }

    async fn find_credential(&self, id: CredentialId) -> Result<Option<Credential>, StoreError> {
        Ok(CredentialRepo::find_by_id(&self.pool, id)
            .await
            .map_err(db_err)?
            .map(Credential::from))
    }

    async fn find_credential_least_loaded(&self) -> Result<Option<Credential>, StoreError> {
        Ok(CredentialRepo::find_least_loaded(&self.pool)
            .await
            .map_err(db_err)?
            .map(Credential::from))
    }

    async fn increment_credential_load(&self, id: CredentialId) -> Result<(), StoreError> {
        CredentialRepo::increment_active_tasks(&self.pool, id)
            .await
            .map_err(db_err)
    }

    async fn decrement_credential_load(&self, id: CredentialId) -> Result<(), StoreError> {
        CredentialRepo::decrement_active_tasks(&self.pool, id)
            .await
            .map_err(db_err)
    }
}
