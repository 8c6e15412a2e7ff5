// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job record and its state machine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

crate::define_id! {
    /// Unique identifier for a job instance.
    #[derive(Default)]
    pub struct JobId;
}

/// Status of a job. A closed, tag-only enum so the monotone-transition
/// invariants in the data model can be enforced at compile time rather than
/// by convention over a free-form string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Queued,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Completed | Status::Failed | Status::Cancelled)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Status::Queued => "queued",
            Status::Running => "running",
            Status::Completed => "completed",
            Status::Failed => "failed",
            Status::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

/// A single argument value. Mirrors the JSON types a caller may pass:
/// strings, numbers, and booleans (booleans become CLI flags, see
/// `boltzq-supervisor::build_command`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    String(String),
    Number(serde_json::Number),
    Bool(bool),
}

impl ArgValue {
    pub fn as_display_string(&self) -> String {
        match self {
            ArgValue::String(s) => s.clone(),
            ArgValue::Number(n) => n.to_string(),
            ArgValue::Bool(b) => b.to_string(),
        }
    }
}

/// Errors raised by invalid state transitions on a [`JobRecord`].
#[derive(Debug, Error)]
pub enum JobError {
    #[error("job {job_id} cannot transition from {from} to {to}")]
    InvalidTransition {
        job_id: String,
        from: Status,
        to: Status,
    },
}

/// Configuration supplied by a caller when submitting a new job.
#[derive(Debug, Clone)]
pub struct JobConfig {
    pub script_path: String,
    /// Argument names in the order the caller supplied them, so argv
    /// construction can honor insertion order even though `args` is a
    /// `BTreeMap` for deterministic, byte-stable persistence.
    pub arg_order: Vec<String>,
    pub args: BTreeMap<String, ArgValue>,
    pub output_dir: PathBuf,
    pub job_name: Option<String>,
}

/// A job instance, persisted verbatim as `metadata.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: String,
    pub submitted_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
    pub status: Status,
    pub script_path: String,
    pub arg_order: Vec<String>,
    pub args: BTreeMap<String, ArgValue>,
    pub output_dir: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_name: Option<String>,
}

impl JobRecord {
    /// Create a new record in `Queued` state.
    pub fn new(job_id: JobId, config: JobConfig, submitted_at_ms: i64) -> Self {
        Self {
            job_id: job_id.0,
            submitted_at: submitted_at_ms,
            started_at: None,
            completed_at: None,
            status: Status::Queued,
            script_path: config.script_path,
            arg_order: config.arg_order,
            args: config.args,
            output_dir: config.output_dir,
            device_id: None,
            pid: None,
            error: None,
            job_name: config.job_name,
        }
    }

    /// Transition `Queued -> Running`. The only legal entry into `Running`.
    pub fn start(&mut self, device_id: String, started_at_ms: i64) -> Result<(), JobError> {
        if self.status != Status::Queued {
            return Err(JobError::InvalidTransition {
                job_id: self.job_id.clone(),
                from: self.status,
                to: Status::Running,
            });
        }
        self.status = Status::Running;
        self.device_id = Some(device_id);
        self.started_at = Some(started_at_ms);
        Ok(())
    }

    /// Record the child's PID once the process has been spawned.
    pub fn set_pid(&mut self, pid: u32) {
        self.pid = Some(pid);
    }

    /// Transition to a terminal state. Legal from `Queued` (cancel-while-queued)
    /// or `Running` (everything else). Idempotent calls are rejected by the
    /// caller (see `boltzq-queue::cancel`), not by this method, since the
    /// error message differs by context ("already cancelled" vs "already failed").
    pub fn finish(&mut self, to: Status, completed_at_ms: i64, error: Option<String>) -> Result<(), JobError> {
        if self.status.is_terminal() {
            return Err(JobError::InvalidTransition {
                job_id: self.job_id.clone(),
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.completed_at = Some(completed_at_ms);
        self.error = error;
        self.device_id = None;
        Ok(())
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
