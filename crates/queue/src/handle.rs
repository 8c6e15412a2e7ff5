// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The public queue handle: request-surface operations plus lifecycle
//! management of the background worker thread.

use crate::state::{
    JobStatusView, QueueCore, QueueStatusView, ReconfigureOutcome, ResourceStatusView,
    RunningEntry, SubmitOutcome,
};
use crate::worker;
use crate::QueueError;
use boltzq_core::{generate_short_id, Clock, JobConfig, JobId, JobRecord, QueueStateSnapshot, Status, SystemClock};
use boltzq_device::DevicePool;
use boltzq_store::JobStore;
use parking_lot::{Condvar, Mutex};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{info, warn};

const DEFAULT_EVICTION_AGE_MS: i64 = 24 * 60 * 60 * 1000;

/// Start-up configuration for a [`QueueHandle`]. On recovery, the values
/// persisted in `queue_state.json` take precedence over these — see
/// `QueueHandle::new`.
pub struct QueueConfig {
    pub max_workers: u32,
    pub device_ids: Vec<String>,
    pub jobs_root: PathBuf,
    pub scripts_dir: PathBuf,
    pub eviction_age_ms: i64,
}

impl QueueConfig {
    pub fn new(max_workers: u32, device_ids: Vec<String>, jobs_root: PathBuf, scripts_dir: PathBuf) -> Self {
        Self {
            max_workers,
            device_ids,
            jobs_root,
            scripts_dir,
            eviction_age_ms: DEFAULT_EVICTION_AGE_MS,
        }
    }
}

pub(crate) struct Inner {
    pub(crate) core: Mutex<QueueCore>,
    pub(crate) devices: Mutex<DevicePool>,
    pub(crate) store: JobStore,
    pub(crate) clock: Box<dyn Clock>,
    pub(crate) max_workers: AtomicU32,
    pub(crate) scripts_dir: PathBuf,
    pub(crate) eviction_age_ms: i64,
    /// `true` once shutdown has been requested. Paired with `shutdown_cv` so
    /// the worker loop's adaptive sleep can be woken immediately instead of
    /// waiting out its current tier.
    pub(crate) shutdown: Mutex<bool>,
    pub(crate) shutdown_cv: Condvar,
}

impl Inner {
    /// Wake the worker loop immediately, whatever tier of its sleep it is
    /// currently in. Used by `shutdown` and `reconfigure`.
    pub(crate) fn wake_worker(&self) {
        self.shutdown_cv.notify_all();
    }
}

impl Inner {
    pub(crate) fn all_device_ids(&self) -> Vec<String> {
        self.devices.lock().all_device_ids()
    }
}

/// A constructed, explicitly-owned queue instance. There is no hidden
/// process-wide singleton: the server entry point builds exactly one of
/// these and threads it through.
pub struct QueueHandle {
    inner: Arc<Inner>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl QueueHandle {
    /// Build a queue, recovering from `queue_state.json` if present.
    pub fn new(config: QueueConfig) -> Result<Self, QueueError> {
        Self::with_clock(config, Box::new(SystemClock))
    }

    pub fn with_clock(config: QueueConfig, clock: Box<dyn Clock>) -> Result<Self, QueueError> {
        let store = JobStore::new(config.jobs_root.clone());
        let mut core = QueueCore::new();
        let now = clock.epoch_ms();

        let (max_workers, device_ids) = match store.load_queue_state()? {
            Some(saved) => {
                for job_id in &saved.pending_jobs {
                    if let Some(record) = store.load_record(job_id)? {
                        if record.status == Status::Queued {
                            let id = JobId::new(job_id.clone());
                            core.pending.push_back(id.clone());
                            core.records.insert(id, record);
                        }
                    }
                }
                for job_id in saved.running_jobs.keys() {
                    if let Some(mut record) = store.load_record(job_id)? {
                        if !record.status.is_terminal() {
                            let _ = record.finish(
                                Status::Failed,
                                now,
                                Some("Server restarted while job was running".to_string()),
                            );
                            store.save_record(&record)?;
                        }
                    }
                }
                (saved.max_workers, saved.gpu_ids)
            }
            None => (config.max_workers, config.device_ids),
        };
        let clamped_max_workers = max_workers.min(device_ids.len() as u32);
        if clamped_max_workers != max_workers {
            warn!(
                requested = max_workers,
                devices = device_ids.len(),
                clamped = clamped_max_workers,
                "max_workers clamped to device count on construction"
            );
        }
        let max_workers = clamped_max_workers;

        let devices = DevicePool::new(device_ids.clone());
        let snapshot = core.snapshot(max_workers, device_ids);
        store.save_queue_state(&snapshot)?;

        let inner = Arc::new(Inner {
            core: Mutex::new(core),
            devices: Mutex::new(devices),
            store,
            clock,
            max_workers: AtomicU32::new(max_workers),
            scripts_dir: config.scripts_dir,
            eviction_age_ms: config.eviction_age_ms,
            shutdown: Mutex::new(false),
            shutdown_cv: Condvar::new(),
        });

        let worker_inner = Arc::clone(&inner);
        let handle = std::thread::Builder::new()
            .name("boltzq-worker".to_string())
            .spawn(move || worker::run_loop(&worker_inner))
            .map_err(|e| QueueError::Validation(format!("failed to start worker thread: {e}")))?;

        Ok(Self {
            inner,
            worker: Mutex::new(Some(handle)),
        })
    }

    fn persist(&self, record: &JobRecord, snapshot: &QueueStateSnapshot) -> Result<(), QueueError> {
        self.inner.store.save_record(record)?;
        self.inner.store.save_queue_state(snapshot)?;
        Ok(())
    }

    /// Append a new job to the pending FIFO. `position` is 1-indexed and a
    /// snapshot at return time, not a live handle (see spec's ordering
    /// guarantees).
    pub fn submit(&self, config: JobConfig) -> Result<SubmitOutcome, QueueError> {
        let now = self.inner.clock.epoch_ms();
        let job_id = JobId::new(generate_short_id());
        let record = JobRecord::new(job_id.clone(), config, now);
        // Fetched before the queue lock is taken: device pool and queue
        // mutexes are never held at the same time.
        let device_ids = self.inner.all_device_ids();

        let (position, snapshot) = {
            let mut core = self.inner.core.lock();
            core.records.insert(job_id.clone(), record.clone());
            core.pending.push_back(job_id.clone());
            let position = core.pending.len();
            let snapshot = core.snapshot(self.inner.max_workers.load(Ordering::SeqCst), device_ids);
            (position, snapshot)
        };

        if let Err(err) = self.persist(&record, &snapshot) {
            let mut core = self.inner.core.lock();
            core.records.remove(&job_id);
            core.pending.retain(|id| id != &job_id);
            return Err(err);
        }

        Ok(SubmitOutcome {
            job_id,
            status: Status::Queued,
            position,
            queue_length: position,
        })
    }

    /// Look up a job's record and derived position. Falls back to the
    /// on-disk record if the job is no longer tracked in memory (terminal
    /// and evicted, or pre-existing from a prior process).
    pub fn job_status(&self, job_id: &JobId) -> Result<Option<JobStatusView>, QueueError> {
        let in_memory = {
            let core = self.inner.core.lock();
            core.records
                .get(job_id)
                .map(|record| (record.clone(), core.position_of(job_id)))
        };
        if let Some((record, position)) = in_memory {
            return Ok(Some(JobStatusView { record, position }));
        }
        match self.inner.store.load_record(job_id.as_str())? {
            Some(record) => Ok(Some(JobStatusView { record, position: None })),
            None => Ok(None),
        }
    }

    pub fn queue_status(&self) -> QueueStatusView {
        let (queue_length, running_count, queued_jobs, running_jobs) = {
            let core = self.inner.core.lock();
            let queued_jobs = core.pending.iter().take(10).map(|id| id.as_str().to_string()).collect();
            let running_jobs: Vec<RunningEntry> = core
                .running
                .iter()
                .map(|(id, job)| RunningEntry {
                    job_id: id.as_str().to_string(),
                    device_id: job.device_id.clone(),
                })
                .collect();
            (core.pending.len(), core.running.len(), queued_jobs, running_jobs)
        };

        let devices = self.inner.devices.lock();
        let device_assignments: BTreeMap<String, String> = devices
            .held_map()
            .into_iter()
            .map(|(device_id, job_id)| (device_id, job_id.as_str().to_string()))
            .collect();

        QueueStatusView {
            queue_length,
            running_count,
            max_workers: self.inner.max_workers.load(Ordering::SeqCst),
            running_jobs,
            queued_jobs,
            available_devices: devices.available_list(),
            total_devices: devices.total(),
            device_assignments,
        }
    }

    /// Cancel a job. Synchronous against queue state (flips to
    /// `cancelled` immediately); asynchronous against the OS process, which
    /// the worker loop reaps (and whose device it releases) on its next
    /// tick.
    pub fn cancel(&self, job_id: &JobId) -> Result<(), QueueError> {
        let now = self.inner.clock.epoch_ms();
        let device_ids = self.inner.all_device_ids();
        let mut core = self.inner.core.lock();

        let Some(record) = core.records.get_mut(job_id) else {
            drop(core);
            return Err(match self.inner.store.load_record(job_id.as_str())? {
                Some(record) if record.status.is_terminal() => QueueError::AlreadyTerminal {
                    job_id: job_id.as_str().to_string(),
                    status: record.status,
                },
                _ => QueueError::NotFound(job_id.as_str().to_string()),
            });
        };

        if record.status.is_terminal() {
            let status = record.status;
            return Err(QueueError::AlreadyTerminal {
                job_id: job_id.as_str().to_string(),
                status,
            });
        }

        record
            .finish(Status::Cancelled, now, None)
            .map_err(|_| QueueError::AlreadyTerminal {
                job_id: job_id.as_str().to_string(),
                status: Status::Cancelled,
            })?;
        let record_snapshot = record.clone();
        core.pending.retain(|id| id != job_id);

        // Termination is a signal to the child, not a device-pool
        // operation, so it is safe to issue while the queue lock is held.
        if let Some(running) = core.running.get(job_id) {
            if let Err(err) = running.process.terminate() {
                warn!(job_id = %job_id, error = %err, "failed to signal cancelled process");
            }
        }
        let snapshot = core.snapshot(self.inner.max_workers.load(Ordering::SeqCst), device_ids);
        drop(core);

        self.persist(&record_snapshot, &snapshot)
    }

    pub fn resource_status(&self) -> ResourceStatusView {
        let (jobs_in_memory, queued_jobs, running_jobs, is_idle) = {
            let core = self.inner.core.lock();
            (
                core.records.len(),
                core.pending.len(),
                core.running.len(),
                core.pending.is_empty() && core.running.is_empty(),
            )
        };
        let devices = self.inner.devices.lock();
        ResourceStatusView {
            is_idle,
            all_devices_free: devices.all_free(),
            jobs_in_memory,
            queued_jobs,
            running_jobs,
            devices_in_use: devices.total() - devices.available_count(),
            devices_available: devices.available_count(),
            total_devices: devices.total(),
        }
    }

    /// Replace the device pool and/or worker cap. Running jobs are not
    /// interrupted: the worker loop reads `max_workers` and the device
    /// pool fresh on every tick, so there is nothing to stop and restart.
    /// New cap is clamped to the new device count.
    pub fn reconfigure(&self, max_workers: Option<u32>, device_ids: Option<Vec<String>>) -> ReconfigureOutcome {
        if let Some(ids) = device_ids {
            *self.inner.devices.lock() = DevicePool::new(ids);
        }
        let total = self.inner.devices.lock().total() as u32;
        let requested = max_workers.unwrap_or_else(|| self.inner.max_workers.load(Ordering::SeqCst));
        let clamped = requested.min(total);
        self.inner.max_workers.store(clamped, Ordering::SeqCst);

        let outcome = ReconfigureOutcome {
            max_workers: clamped,
            device_ids: self.inner.all_device_ids(),
        };
        // Wake the worker immediately so it picks up the new cap/pool rather
        // than waiting out whatever sleep tier it is currently in.
        self.inner.wake_worker();
        info!(max_workers = clamped, "queue reconfigured");
        outcome
    }

    /// Stop the worker thread and join it. Idempotent.
    pub fn shutdown(&self) {
        *self.inner.shutdown.lock() = true;
        self.inner.wake_worker();
        if let Some(handle) = self.worker.lock().take() {
            let _ = handle.join();
        }
    }
}

impl Drop for QueueHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
#[path = "handle_tests.rs"]
mod tests;
