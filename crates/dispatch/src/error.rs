use meshgen_core::store::StoreError;

/// Errors surfaced by the dispatcher's synchronous surface.
///
/// Remote-provider failures never appear here: they are communicated
/// asynchronously through notifications, and the worker loop carries
/// on to the next queued job.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// No credential exists to bind the job to. The job is not created.
    #[error("no credential available")]
    NoCredentialAvailable,

    /// The submission payload is malformed (e.g. empty prompt).
    #[error("validation failed: {0}")]
    Validation(String),

    /// The job store collaborator failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
