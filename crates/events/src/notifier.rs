//! In-process notifier backed by a `tokio::sync::broadcast` channel.
//!
//! [`Notifier`] is the publish/subscribe hub for [`JobNotification`]s.
//! Delivery is best-effort and fire-and-forget: there is no
//! acknowledgment, no retry, and no persistence of missed events — a
//! subscriber not connected at emission time never receives the event.
//! It is designed to be shared via `Arc<Notifier>` across the
//! application.

use chrono::{DateTime, Utc};
use meshgen_core::types::JobId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// JobNotification
// ---------------------------------------------------------------------------

/// Lifecycle status carried by a notification.
///
/// These are the statuses subscribers key on; the job's persisted
/// state is a separate concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    /// A worker picked the job up and is about to submit it.
    Waiting,
    /// The remote provider accepted the job and assigned a task id.
    TaskCreated,
    /// Still generating; the message carries a progress percentage.
    Processing,
    /// Terminal success — artifacts are downloaded and published.
    Done,
    /// A failure, transient or terminal; the message says which.
    Error,
    /// The processing deadline elapsed without a terminal status.
    Timeout,
}

impl NotificationStatus {
    /// Wire representation, matching the serde rename.
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationStatus::Waiting => "waiting",
            NotificationStatus::TaskCreated => "task_created",
            NotificationStatus::Processing => "processing",
            NotificationStatus::Done => "done",
            NotificationStatus::Error => "error",
            NotificationStatus::Timeout => "timeout",
        }
    }
}

/// A status event for a single job, pushed to subscribers by job id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobNotification {
    pub job_id: JobId,
    pub status: NotificationStatus,
    /// Human-readable detail for display to the end user.
    pub message: String,
    /// When the notification was emitted (UTC).
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out notifier.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`JobNotification`].
pub struct Notifier {
    sender: broadcast::Sender<JobNotification>,
}

impl Notifier {
    /// Create a notifier with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are
    /// dropped and slow receivers observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a status event for a job to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently
    /// dropped — that is the contract, not an error.
    pub fn publish(&self, job_id: JobId, status: NotificationStatus, message: impl Into<String>) {
        let notification = JobNotification {
            job_id,
            status,
            message: message.into(),
            timestamp: Utc::now(),
        };
        tracing::debug!(
            job_id = %notification.job_id,
            status = notification.status.as_str(),
            message = %notification.message,
            "Job notification",
        );
        // Ignore the SendError — it only means there are zero receivers.
        let _ = self.sender.send(notification);
    }

    /// Subscribe to all notifications published on this notifier.
    pub fn subscribe(&self) -> broadcast::Receiver<JobNotification> {
        self.sender.subscribe()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
