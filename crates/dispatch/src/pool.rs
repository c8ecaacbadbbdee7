//! Queue and worker-slot bookkeeping shared across worker loops.
//!
//! [`PoolState`] is the only mutable state shared by concurrent
//! workers. It lives behind a single mutex on the scheduler so that
//! enqueue/dequeue and slot acquire/release are atomic with respect to
//! each other; no caller ever holds the lock across an await point.

use std::collections::{HashMap, HashSet, VecDeque};

use meshgen_core::types::{CredentialId, JobId};

/// A pending job awaiting a free worker slot on its bound credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct QueueEntry {
    pub job_id: JobId,
    pub credential_id: CredentialId,
}

/// Slot counters and the job backlog.
///
/// Invariants:
/// - a job id appears at most once across the queue and the in-flight
///   set combined;
/// - `0 <= slot count <= max_workers_per_key` for every credential.
#[derive(Debug)]
pub(crate) struct PoolState {
    max_workers_per_key: u32,
    /// Live worker-loop count per credential. Entries at zero are
    /// removed.
    slots: HashMap<CredentialId, u32>,
    /// Backlog in arrival order. Workers take the first entry bound to
    /// their credential, so per-credential FIFO order is preserved.
    queue: VecDeque<QueueEntry>,
    /// Jobs popped by a worker and not yet finished; guards against a
    /// requeue racing a worker that has dequeued but not yet submitted.
    in_flight: HashSet<JobId>,
}

impl PoolState {
    pub fn new(max_workers_per_key: u32) -> Self {
        Self {
            max_workers_per_key,
            slots: HashMap::new(),
            queue: VecDeque::new(),
            in_flight: HashSet::new(),
        }
    }

    /// Append a queue entry. Returns `false` (and changes nothing) if
    /// the job is already queued or currently being processed.
    pub fn enqueue(&mut self, job_id: JobId, credential_id: CredentialId) -> bool {
        if self.in_flight.contains(&job_id) || self.queue.iter().any(|e| e.job_id == job_id) {
            return false;
        }
        self.queue.push_back(QueueEntry {
            job_id,
            credential_id,
        });
        true
    }

    /// Take the oldest queued job bound to `credential_id`, marking it
    /// in flight.
    pub fn pop_for(&mut self, credential_id: CredentialId) -> Option<JobId> {
        let index = self
            .queue
            .iter()
            .position(|e| e.credential_id == credential_id)?;
        let entry = self.queue.remove(index)?;
        self.in_flight.insert(entry.job_id);
        Some(entry.job_id)
    }

    /// Release the in-flight marker once processing reached a terminal
    /// outcome (or was abandoned).
    pub fn finish(&mut self, job_id: JobId) {
        self.in_flight.remove(&job_id);
    }

    /// Reserve a worker slot for the credential. Returns `false` when
    /// the per-credential cap is already reached.
    pub fn try_acquire_slot(&mut self, credential_id: CredentialId) -> bool {
        let count = self.slots.entry(credential_id).or_insert(0);
        if *count >= self.max_workers_per_key {
            return false;
        }
        *count += 1;
        true
    }

    /// Return a worker slot. Saturates at zero.
    pub fn release_slot(&mut self, credential_id: CredentialId) {
        if let Some(count) = self.slots.get_mut(&credential_id) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.slots.remove(&credential_id);
            }
        }
    }

    /// Live worker-loop count for a credential.
    pub fn slot_count(&self, credential_id: CredentialId) -> u32 {
        self.slots.get(&credential_id).copied().unwrap_or(0)
    }

    /// Whether any queued entry is bound to the credential.
    pub fn has_queued(&self, credential_id: CredentialId) -> bool {
        self.queue.iter().any(|e| e.credential_id == credential_id)
    }

    /// Total backlog length across all credentials.
    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }
}
