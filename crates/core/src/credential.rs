//! Credential entity model.

use serde::Serialize;

use crate::types::{CredentialId, Timestamp};

/// An API credential for the remote generation provider, with a live
/// count of tasks currently running against it.
///
/// `active_tasks` is incremented when a worker successfully submits a
/// job to the provider and decremented on every terminal transition
/// (`succeeded`, `failed`, `timed_out`). It is never negative.
#[derive(Debug, Clone, Serialize)]
pub struct Credential {
    pub id: CredentialId,
    /// Opaque bearer secret. Never logged.
    #[serde(skip_serializing)]
    pub secret: String,
    pub active_tasks: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
