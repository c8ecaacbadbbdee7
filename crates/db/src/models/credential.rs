//! Row model for the `credentials` table.

use meshgen_core::credential::Credential;
use meshgen_core::types::{CredentialId, Timestamp};
use sqlx::FromRow;

/// A row from the `credentials` table.
#[derive(Debug, Clone, FromRow)]
pub struct CredentialRow {
    pub id: CredentialId,
    pub secret: String,
    pub active_tasks: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<CredentialRow> for Credential {
    fn from(row: CredentialRow) -> Self {
        Credential {
            id: row.id,
            secret: row.secret,
            active_tasks: row.active_tasks,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
