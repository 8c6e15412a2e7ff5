// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The queue-state snapshot persisted to `queue_state.json`.
//!
//! Field names are kept verbatim for on-disk compatibility with the legacy
//! Python deployment this supervisor replaces: `gpu_ids` maps to the device
//! pool's `device_ids`, `pending_jobs`/`running_jobs` map to the queue
//! core's `pending`/`running` sets.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueueStateSnapshot {
    pub max_workers: u32,
    pub gpu_ids: Vec<String>,
    pub pending_jobs: Vec<String>,
    /// job_id -> device_id
    pub running_jobs: BTreeMap<String, String>,
}

impl QueueStateSnapshot {
    pub fn new(max_workers: u32, gpu_ids: Vec<String>) -> Self {
        Self {
            max_workers,
            gpu_ids,
            pending_jobs: Vec::new(),
            running_jobs: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
#[path = "queue_state_tests.rs"]
mod tests;
