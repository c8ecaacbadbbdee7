//! Shared fakes and helpers for dispatcher integration tests.
//!
//! [`MemoryJobStore`] implements the store seam over hash maps, and
//! [`MockProvider`] scripts the remote provider's behavior (create
//! failures, N in-progress polls before a terminal status, transient
//! status errors, fetch failures) while recording call order and the
//! maximum number of concurrently in-flight tasks.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use meshgen_core::credential::Credential;
use meshgen_core::job::{Job, JobState};
use meshgen_core::store::{JobStore, JobUpdate, StoreError};
use meshgen_core::types::{CredentialId, JobId, UserId};
use meshgen_dispatch::{Scheduler, SchedulerConfig};
use meshgen_events::{JobNotification, NotificationStatus, Notifier};
use meshgen_provider::{
    GenerationProvider, ProviderError, RemoteTaskState, TaskOutputs, TaskStatus,
};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// MemoryJobStore
// ---------------------------------------------------------------------------

/// In-memory [`JobStore`] with the same counter semantics as the
/// PostgreSQL implementation (stable least-loaded order, saturating
/// decrement).
#[derive(Default)]
pub struct MemoryJobStore {
    jobs: Mutex<HashMap<JobId, Job>>,
    /// Insertion order doubles as the least-loaded tie-break order.
    credentials: Mutex<Vec<Credential>>,
}

impl MemoryJobStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Insert a credential with `active_tasks = 0`.
    pub fn add_credential(&self) -> CredentialId {
        let id = uuid::Uuid::new_v4();
        self.credentials.lock().unwrap().push(Credential {
            id,
            secret: format!("secret-{id}"),
            active_tasks: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        id
    }

    pub fn set_active_tasks(&self, id: CredentialId, active_tasks: i32) {
        let mut credentials = self.credentials.lock().unwrap();
        let credential = credentials
            .iter_mut()
            .find(|c| c.id == id)
            .expect("unknown credential");
        credential.active_tasks = active_tasks;
    }

    pub fn credential(&self, id: CredentialId) -> Credential {
        self.credentials
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .expect("unknown credential")
    }

    pub fn job(&self, id: JobId) -> Job {
        self.jobs.lock().unwrap().get(&id).cloned().expect("unknown job")
    }

    pub fn job_count(&self) -> usize {
        self.jobs.lock().unwrap().len()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn find_job(&self, id: JobId) -> Result<Option<Job>, StoreError> {
        Ok(self.jobs.lock().unwrap().get(&id).cloned())
    }

    async fn create_job(
        &self,
        prompt: &str,
        user_id: UserId,
        credential_id: CredentialId,
    ) -> Result<Job, StoreError> {
        let job = Job {
            id: uuid::Uuid::new_v4(),
            prompt: prompt.to_string(),
            user_id,
            credential_id,
            remote_task_id: None,
            state: JobState::Pending,
            model_glb: None,
            model_fbx: None,
            model_usdz: None,
            preview_image: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.jobs.lock().unwrap().insert(job.id, job.clone());
        Ok(job)
    }

    async fn update_job(&self, id: JobId, update: JobUpdate) -> Result<(), StoreError> {
        let mut jobs = self.jobs.lock().unwrap();
        if let Some(job) = jobs.get_mut(&id) {
            if let Some(state) = update.state {
                job.state = state;
            }
            if update.remote_task_id.is_some() {
                job.remote_task_id = update.remote_task_id;
            }
            if update.model_glb.is_some() {
                job.model_glb = update.model_glb;
            }
            if update.model_fbx.is_some() {
                job.model_fbx = update.model_fbx;
            }
            if update.model_usdz.is_some() {
                job.model_usdz = update.model_usdz;
            }
            if update.preview_image.is_some() {
                job.preview_image = update.preview_image;
            }
            job.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn find_credential(&self, id: CredentialId) -> Result<Option<Credential>, StoreError> {
        Ok(self
            .credentials
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn find_credential_least_loaded(&self) -> Result<Option<Credential>, StoreError> {
        // min_by_key returns the first of equally minimal elements, so
        // ties break by insertion order.
        Ok(self
            .credentials
            .lock()
            .unwrap()
            .iter()
            .min_by_key(|c| c.active_tasks)
            .cloned())
    }

    async fn increment_credential_load(&self, id: CredentialId) -> Result<(), StoreError> {
        let mut credentials = self.credentials.lock().unwrap();
        if let Some(credential) = credentials.iter_mut().find(|c| c.id == id) {
            credential.active_tasks += 1;
        }
        Ok(())
    }

    async fn decrement_credential_load(&self, id: CredentialId) -> Result<(), StoreError> {
        let mut credentials = self.credentials.lock().unwrap();
        if let Some(credential) = credentials.iter_mut().find(|c| c.id == id) {
            credential.active_tasks = (credential.active_tasks - 1).max(0);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MockProvider
// ---------------------------------------------------------------------------

/// Scripted remote behavior for one test.
#[derive(Debug, Clone, Default)]
pub struct MockBehavior {
    /// Every `create_task` call fails. Can be flipped at runtime via
    /// [`MockProvider::set_fail_create`].
    pub fail_create: bool,
    /// Number of transient errors served before status polls succeed.
    pub status_errors: usize,
    /// Number of in-progress polls before reporting `complete`.
    /// `None` means the task never completes.
    pub complete_after: Option<usize>,
    /// Number of in-progress polls before reporting `failed`.
    /// Takes precedence over `complete_after`.
    pub fail_after: Option<usize>,
    /// Progress value reported while in progress.
    pub progress: Option<f64>,
    /// Outputs attached to the `complete` status.
    pub outputs: TaskOutputs,
    /// Every `fetch` call fails.
    pub fail_fetch: bool,
}

#[derive(Default)]
struct MockState {
    next_id: usize,
    /// Preset task ids handed out before falling back to `task-{n}`.
    task_ids: VecDeque<String>,
    /// Prompts in `create_task` call order.
    created_prompts: Vec<String>,
    polls: HashMap<String, usize>,
    finished: HashSet<String>,
    /// Tasks created and not yet reported terminal.
    active: usize,
    max_active: usize,
    fetched: Vec<String>,
}

pub struct MockProvider {
    behavior: MockBehavior,
    fail_create: AtomicBool,
    state: Mutex<MockState>,
}

impl MockProvider {
    pub fn new(behavior: MockBehavior) -> Arc<Self> {
        let fail_create = AtomicBool::new(behavior.fail_create);
        Arc::new(Self {
            behavior,
            fail_create,
            state: Mutex::new(MockState::default()),
        })
    }

    /// Preset the task ids returned by successive `create_task` calls.
    pub fn with_task_ids(behavior: MockBehavior, ids: &[&str]) -> Arc<Self> {
        let provider = Self::new(behavior);
        provider.state.lock().unwrap().task_ids = ids.iter().map(|s| s.to_string()).collect();
        provider
    }

    pub fn set_fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    pub fn created_prompts(&self) -> Vec<String> {
        self.state.lock().unwrap().created_prompts.clone()
    }

    /// Highest number of concurrently in-flight remote tasks observed.
    pub fn max_active(&self) -> usize {
        self.state.lock().unwrap().max_active
    }

    pub fn fetched_urls(&self) -> Vec<String> {
        self.state.lock().unwrap().fetched.clone()
    }
}

#[async_trait]
impl GenerationProvider for MockProvider {
    async fn create_task(&self, prompt: &str, _secret: &str) -> Result<String, ProviderError> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(ProviderError::Api {
                status: 500,
                body: "create failed".to_string(),
            });
        }
        let mut state = self.state.lock().unwrap();
        let id = match state.task_ids.pop_front() {
            Some(id) => id,
            None => {
                state.next_id += 1;
                format!("task-{}", state.next_id)
            }
        };
        state.created_prompts.push(prompt.to_string());
        state.active += 1;
        state.max_active = state.max_active.max(state.active);
        Ok(id)
    }

    async fn task_status(
        &self,
        remote_task_id: &str,
        _secret: &str,
    ) -> Result<TaskStatus, ProviderError> {
        let mut state = self.state.lock().unwrap();
        let polls = state.polls.entry(remote_task_id.to_string()).or_insert(0);
        *polls += 1;
        let polls = *polls;

        if polls <= self.behavior.status_errors {
            return Err(ProviderError::Api {
                status: 503,
                body: "status check failed".to_string(),
            });
        }
        let effective = polls - self.behavior.status_errors;

        let remote_state = if let Some(n) = self.behavior.fail_after {
            if effective > n {
                RemoteTaskState::Failed
            } else {
                RemoteTaskState::InProgress
            }
        } else if let Some(n) = self.behavior.complete_after {
            if effective > n {
                RemoteTaskState::Complete
            } else {
                RemoteTaskState::InProgress
            }
        } else {
            RemoteTaskState::InProgress
        };

        if remote_state != RemoteTaskState::InProgress
            && state.finished.insert(remote_task_id.to_string())
        {
            state.active -= 1;
        }

        Ok(TaskStatus {
            status: remote_state,
            progress: self.behavior.progress,
            outputs: if remote_state == RemoteTaskState::Complete {
                Some(self.behavior.outputs.clone())
            } else {
                None
            },
        })
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        if self.behavior.fail_fetch {
            return Err(ProviderError::Api {
                status: 404,
                body: "artifact missing".to_string(),
            });
        }
        self.state.lock().unwrap().fetched.push(url.to_string());
        Ok(b"artifact-bytes".to_vec())
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// One scheduler with in-memory collaborators and a throwaway assets
/// directory.
pub struct TestHarness {
    pub store: Arc<MemoryJobStore>,
    pub provider: Arc<MockProvider>,
    pub notifier: Arc<Notifier>,
    pub scheduler: Arc<Scheduler>,
    /// Kept alive so the assets directory survives the test.
    pub assets: tempfile::TempDir,
}

impl TestHarness {
    pub fn subscribe(&self) -> broadcast::Receiver<JobNotification> {
        self.notifier.subscribe()
    }

    pub fn assets_path(&self) -> &std::path::Path {
        self.assets.path()
    }
}

pub fn harness(provider: Arc<MockProvider>) -> TestHarness {
    harness_with(provider, |_| {})
}

/// Build a harness, letting the test tweak the config (which defaults
/// to the production contract constants).
pub fn harness_with(
    provider: Arc<MockProvider>,
    configure: impl FnOnce(&mut SchedulerConfig),
) -> TestHarness {
    let assets = tempfile::tempdir().expect("tempdir");
    let mut config = SchedulerConfig {
        assets_dir: assets.path().to_path_buf(),
        public_base_url: "http://localhost:3000".to_string(),
        ..SchedulerConfig::default()
    };
    configure(&mut config);

    let store = MemoryJobStore::new();
    let notifier = Arc::new(Notifier::default());
    let scheduler = Scheduler::new(
        store.clone() as Arc<dyn JobStore>,
        provider.clone() as Arc<dyn GenerationProvider>,
        notifier.clone(),
        config,
    );

    TestHarness {
        store,
        provider,
        notifier,
        scheduler,
        assets,
    }
}

pub fn user() -> UserId {
    uuid::Uuid::new_v4()
}

// ---------------------------------------------------------------------------
// Notification helpers
// ---------------------------------------------------------------------------

/// Generous bound for paused-clock tests; only fires on a real hang.
const WAIT_LIMIT: Duration = Duration::from_secs(4 * 3600);

/// Receive until a notification for `job_id` with `status` arrives,
/// skipping everything else.
pub async fn wait_for(
    rx: &mut broadcast::Receiver<JobNotification>,
    job_id: JobId,
    status: NotificationStatus,
) -> JobNotification {
    loop {
        let notification = tokio::time::timeout(WAIT_LIMIT, rx.recv())
            .await
            .expect("timed out waiting for notification")
            .expect("notifier channel closed");
        if notification.job_id == job_id && notification.status == status {
            return notification;
        }
    }
}

/// Receive until a `done` notification has arrived for every given job.
pub async fn wait_all_done(
    rx: &mut broadcast::Receiver<JobNotification>,
    job_ids: &HashSet<JobId>,
) {
    let mut seen = HashSet::new();
    while seen.len() < job_ids.len() {
        let notification = tokio::time::timeout(WAIT_LIMIT, rx.recv())
            .await
            .expect("timed out waiting for done notifications")
            .expect("notifier channel closed");
        if notification.status == NotificationStatus::Done && job_ids.contains(&notification.job_id)
        {
            seen.insert(notification.job_id);
        }
    }
}

/// Let spawned workers run to quiescence under the paused clock.
pub async fn settle() {
    for _ in 0..100 {
        tokio::task::yield_now().await;
    }
}

/// Drain everything currently buffered on the receiver.
pub fn drain(rx: &mut broadcast::Receiver<JobNotification>) -> Vec<JobNotification> {
    let mut drained = Vec::new();
    while let Ok(notification) = rx.try_recv() {
        drained.push(notification);
    }
    drained
}
