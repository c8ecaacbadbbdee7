/// All entity primary keys are UUIDv4.
pub type JobId = uuid::Uuid;

/// Credential identifiers share the UUID keyspace with jobs.
pub type CredentialId = uuid::Uuid;

/// Owning-user references. User records themselves live outside this
/// subsystem; jobs only carry the reference.
pub type UserId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
