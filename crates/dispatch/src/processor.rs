//! The task processor: drives one job from `pending` to a terminal
//! state.
//!
//! `pending -> processing -> {succeeded, failed, timed_out}`; no
//! transition leaves a terminal state. The credential's active-task
//! counter is incremented on the successful provider submission and
//! decremented on every terminal path, so it always equals the number
//! of jobs in `processing` bound to the credential.

use meshgen_core::credential::Credential;
use meshgen_core::job::{Job, JobState};
use meshgen_core::store::JobUpdate;
use meshgen_core::types::{CredentialId, JobId};
use meshgen_events::NotificationStatus;
use meshgen_provider::{RemoteTaskState, TaskOutputs};
use tokio::time::Instant;

use crate::artifacts::download_outputs;
use crate::error::DispatchError;
use crate::scheduler::Scheduler;

/// Process one queued job to completion or failure.
///
/// Validation problems (missing job or credential) and provider
/// failures are reported through the notifier and return `Ok`: the
/// worker loop moves on either way. Only store failures propagate.
pub(crate) async fn process_job(
    s: &Scheduler,
    job_id: JobId,
    credential_id: CredentialId,
) -> Result<(), DispatchError> {
    s.notifier.publish(
        job_id,
        NotificationStatus::Waiting,
        "Task started processing.",
    );

    let Some(credential) = s.store.find_credential(credential_id).await? else {
        s.notifier
            .publish(job_id, NotificationStatus::Error, "Credential not found.");
        return Ok(());
    };
    let Some(job) = s.store.find_job(job_id).await? else {
        s.notifier
            .publish(job_id, NotificationStatus::Error, "Job not found.");
        return Ok(());
    };

    // Submission. On failure the job stays `pending` (and the
    // credential counter untouched) so a later requeue can retry it.
    let remote_task_id = match s
        .provider
        .create_task(&job.prompt, &credential.secret)
        .await
    {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(job_id = %job_id, error = %e, "Remote task creation failed");
            s.notifier.publish(
                job_id,
                NotificationStatus::Error,
                format!("Error generating model: {e}"),
            );
            return Ok(());
        }
    };

    s.store
        .update_job(job_id, JobUpdate::submitted(remote_task_id.clone()))
        .await?;
    s.store.increment_credential_load(credential_id).await?;
    s.notifier.publish(
        job_id,
        NotificationStatus::TaskCreated,
        format!("Task ID: {remote_task_id}"),
    );

    poll_until_terminal(s, &job, &credential, &remote_task_id).await
}

/// Poll the provider at the configured interval until it reports a
/// terminal status or the processing deadline elapses.
async fn poll_until_terminal(
    s: &Scheduler,
    job: &Job,
    credential: &Credential,
    remote_task_id: &str,
) -> Result<(), DispatchError> {
    let deadline = Instant::now() + s.config.processing_deadline;

    while Instant::now() < deadline {
        match s
            .provider
            .task_status(remote_task_id, &credential.secret)
            .await
        {
            Ok(status) => match status.status {
                RemoteTaskState::Complete => {
                    let outputs = status.outputs.unwrap_or_default();
                    return finalize(s, job, credential.id, remote_task_id, outputs).await;
                }
                RemoteTaskState::Failed => {
                    s.store
                        .update_job(job.id, JobUpdate::state(JobState::Failed))
                        .await?;
                    s.store.decrement_credential_load(credential.id).await?;
                    s.notifier.publish(
                        job.id,
                        NotificationStatus::Error,
                        "Task failed. Please retry.",
                    );
                    return Ok(());
                }
                RemoteTaskState::InProgress => {
                    let progress = status.progress_percent();
                    s.notifier.publish(
                        job.id,
                        NotificationStatus::Processing,
                        format!(
                            "Hold tight! Your model is still processing... {progress}% completed."
                        ),
                    );
                }
            },
            // A transient error on a single poll never aborts the loop.
            Err(e) => {
                s.notifier.publish(
                    job.id,
                    NotificationStatus::Error,
                    format!("Error checking status: {e}"),
                );
            }
        }

        tokio::time::sleep(s.config.poll_interval).await;
    }

    // Deadline elapsed without a terminal provider status. The job is
    // moved to the explicit terminal `timed_out` state and the
    // credential load released.
    s.store
        .update_job(job.id, JobUpdate::state(JobState::TimedOut))
        .await?;
    s.store.decrement_credential_load(credential.id).await?;
    s.notifier.publish(
        job.id,
        NotificationStatus::Timeout,
        format!(
            "Processing time exceeded {} minutes.",
            s.config.processing_deadline.as_secs() / 60
        ),
    );
    Ok(())
}

/// Download whatever outputs the provider produced and mark the job
/// `succeeded`; a download failure marks it `failed` instead. Either
/// way the credential load is released and exactly one terminal
/// notification is emitted.
async fn finalize(
    s: &Scheduler,
    job: &Job,
    credential_id: CredentialId,
    remote_task_id: &str,
    outputs: TaskOutputs,
) -> Result<(), DispatchError> {
    match download_outputs(s.provider.as_ref(), &outputs, remote_task_id, &s.config).await {
        Ok(locations) => {
            s.store.update_job(job.id, locations.into_update()).await?;
            s.store.decrement_credential_load(credential_id).await?;
            s.notifier
                .publish(job.id, NotificationStatus::Done, "Task completed.");
        }
        Err(e) => {
            tracing::warn!(job_id = %job.id, error = %e, "Artifact download failed");
            s.store
                .update_job(job.id, JobUpdate::state(JobState::Failed))
                .await?;
            s.store.decrement_credential_load(credential_id).await?;
            s.notifier.publish(
                job.id,
                NotificationStatus::Error,
                format!("Error saving artifacts: {e}"),
            );
        }
    }
    Ok(())
}
