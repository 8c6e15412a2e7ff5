// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! boltzq-store: durable job-record and queue-state persistence.
//!
//! Layout (bit-exact, matching the on-disk contract of the legacy deployment
//! this supervisor replaces):
//!
//! - `<jobs_root>/<job_id>/metadata.json` — the job record.
//! - `<jobs_root>/<job_id>/job.log` — captured stdout+stderr (generic entry point).
//! - `<output_dir>/boltzgen_run.log` — captured stdout+stderr (design-run entry point, tailed by the advisory inspector).
//! - `<jobs_root>/queue_state.json` — the queue-state snapshot.
//! - `<output_dir>/job_info.json` — a compatibility projection of the record.

mod atomic;
mod job_info;

pub use job_info::JobInfo;

use boltzq_core::{JobRecord, QueueStateSnapshot};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Durable store rooted at a single `jobs_root` directory.
#[derive(Debug, Clone)]
pub struct JobStore {
    jobs_root: PathBuf,
}

impl JobStore {
    pub fn new(jobs_root: impl Into<PathBuf>) -> Self {
        Self {
            jobs_root: jobs_root.into(),
        }
    }

    pub fn jobs_root(&self) -> &Path {
        &self.jobs_root
    }

    fn job_dir(&self, job_id: &str) -> PathBuf {
        self.jobs_root.join(job_id)
    }

    fn metadata_path(&self, job_id: &str) -> PathBuf {
        self.job_dir(job_id).join("metadata.json")
    }

    fn queue_state_path(&self) -> PathBuf {
        self.jobs_root.join("queue_state.json")
    }

    /// Path to the generic per-job log file, for entry points that don't
    /// write into a caller-owned `output_dir` (e.g. the legacy `list_jobs`/
    /// `job_log` surface).
    pub fn job_log_path(&self, job_id: &str) -> PathBuf {
        self.job_dir(job_id).join("job.log")
    }

    /// Path to the design-run log file inside a job's own output directory,
    /// tailed by the advisory log inspector.
    pub fn run_log_path(output_dir: &Path) -> PathBuf {
        output_dir.join("boltzgen_run.log")
    }

    pub fn job_info_path(output_dir: &Path) -> PathBuf {
        output_dir.join("job_info.json")
    }

    /// Rewrite `metadata.json` wholesale for this record.
    pub fn save_record(&self, record: &JobRecord) -> Result<(), StoreError> {
        atomic::write_json_atomic(&self.metadata_path(&record.job_id), record)
    }

    /// Returns `Ok(None)` if no record exists for `job_id` — missing files
    /// are "not found", not an error.
    pub fn load_record(&self, job_id: &str) -> Result<Option<JobRecord>, StoreError> {
        atomic::read_json_opt(&self.metadata_path(job_id))
    }

    /// Rewrite the queue-state snapshot wholesale.
    pub fn save_queue_state(&self, state: &QueueStateSnapshot) -> Result<(), StoreError> {
        atomic::write_json_atomic(&self.queue_state_path(), state)
    }

    pub fn load_queue_state(&self) -> Result<Option<QueueStateSnapshot>, StoreError> {
        atomic::read_json_opt(&self.queue_state_path())
    }

    /// Write the `job_info.json` compatibility projection into the job's
    /// own output directory. Called once a job transitions to `Running`.
    pub fn save_job_info(&self, info: &JobInfo) -> Result<(), StoreError> {
        atomic::write_json_atomic(&Self::job_info_path(&info.output_dir), info)
    }

    pub fn load_job_info(output_dir: &Path) -> Result<Option<JobInfo>, StoreError> {
        atomic::read_json_opt(&Self::job_info_path(output_dir))
    }

    /// List every job that has a persisted record, most recently submitted
    /// first — a pure read over the filesystem, no queue-state mutation. A
    /// single unreadable or corrupt `metadata.json` is logged and skipped
    /// rather than failing the whole listing.
    pub fn list_records(&self) -> Result<Vec<JobRecord>, StoreError> {
        let mut records = Vec::new();
        let entries = match std::fs::read_dir(&self.jobs_root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(records),
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let job_id = entry.file_name().to_string_lossy().to_string();
            match self.load_record(&job_id) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e) => warn!(job_id, error = %e, "skipping unreadable job record"),
            }
        }
        records.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(records)
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
