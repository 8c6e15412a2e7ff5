// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory queue state and the request/response views derived from it.

use boltzq_core::{JobId, JobRecord, QueueStateSnapshot, Status};
use boltzq_supervisor::SupervisedProcess;
use std::collections::{BTreeMap, HashMap, VecDeque};

/// A job currently occupying a device and an OS process.
pub(crate) struct RunningJob {
    pub(crate) device_id: String,
    pub(crate) process: SupervisedProcess,
}

/// The mutex-guarded heart of the queue: FIFO pending order, the running
/// set, and an in-memory mirror of active records. Terminal records fall
/// back to the on-disk store once evicted (or if never loaded).
pub(crate) struct QueueCore {
    pub(crate) pending: VecDeque<JobId>,
    pub(crate) running: BTreeMap<JobId, RunningJob>,
    pub(crate) records: HashMap<JobId, JobRecord>,
}

impl QueueCore {
    pub(crate) fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            running: BTreeMap::new(),
            records: HashMap::new(),
        }
    }

    /// 0 if running, 1-indexed rank if queued, `None` if terminal or unknown.
    pub(crate) fn position_of(&self, job_id: &JobId) -> Option<usize> {
        if self.running.contains_key(job_id) {
            return Some(0);
        }
        self.pending.iter().position(|id| id == job_id).map(|idx| idx + 1)
    }

    pub(crate) fn snapshot(&self, max_workers: u32, gpu_ids: Vec<String>) -> QueueStateSnapshot {
        let mut snapshot = QueueStateSnapshot::new(max_workers, gpu_ids);
        snapshot.pending_jobs = self.pending.iter().map(|id| id.as_str().to_string()).collect();
        snapshot.running_jobs = self
            .running
            .iter()
            .map(|(id, job)| (id.as_str().to_string(), job.device_id.clone()))
            .collect();
        snapshot
    }
}

/// Response shape for [`crate::QueueHandle::submit`].
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub job_id: JobId,
    pub status: Status,
    pub position: usize,
    pub queue_length: usize,
}

/// Response shape for [`crate::QueueHandle::job_status`].
#[derive(Debug, Clone)]
pub struct JobStatusView {
    pub record: JobRecord,
    pub position: Option<usize>,
}

/// One entry of the running-jobs list in [`QueueStatusView`].
#[derive(Debug, Clone)]
pub struct RunningEntry {
    pub job_id: String,
    pub device_id: String,
}

/// Response shape for [`crate::QueueHandle::queue_status`].
#[derive(Debug, Clone)]
pub struct QueueStatusView {
    pub queue_length: usize,
    pub running_count: usize,
    pub max_workers: u32,
    pub running_jobs: Vec<RunningEntry>,
    /// First 10 pending job ids.
    pub queued_jobs: Vec<String>,
    pub available_devices: Vec<String>,
    pub total_devices: usize,
    /// device_id -> job_id.
    pub device_assignments: BTreeMap<String, String>,
}

/// Response shape for [`crate::QueueHandle::resource_status`].
#[derive(Debug, Clone)]
pub struct ResourceStatusView {
    pub is_idle: bool,
    pub all_devices_free: bool,
    pub jobs_in_memory: usize,
    pub queued_jobs: usize,
    pub running_jobs: usize,
    pub devices_in_use: usize,
    pub devices_available: usize,
    pub total_devices: usize,
}

/// Response shape for [`crate::QueueHandle::reconfigure`].
#[derive(Debug, Clone)]
pub struct ReconfigureOutcome {
    pub max_workers: u32,
    pub device_ids: Vec<String>,
}
