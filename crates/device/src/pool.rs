// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exclusive device allocation.

use boltzq_core::JobId;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

struct State {
    all: Vec<String>,
    free: BTreeSet<String>,
    held: BTreeMap<String, JobId>,
}

/// Tracks which accelerator indices are free vs held by a job.
///
/// Selection policy for `acquire` is "lowest index first" (a `BTreeSet`
/// gives this for free); callers must not depend on any particular policy
/// beyond determinism.
pub struct DevicePool {
    state: Mutex<State>,
}

impl DevicePool {
    /// Build a pool over the given device ids. Duplicates are collapsed.
    pub fn new(device_ids: Vec<String>) -> Self {
        let free: BTreeSet<String> = device_ids.iter().cloned().collect();
        Self {
            state: Mutex::new(State {
                all: device_ids,
                free,
                held: BTreeMap::new(),
            }),
        }
    }

    /// Acquire a free device for `job_id`. Returns `None` if the pool is
    /// exhausted — not an error, the caller retries on the next tick.
    pub fn acquire(&self, job_id: JobId) -> Option<String> {
        let mut state = self.state.lock();
        let device_id = state.free.iter().next().cloned()?;
        state.free.remove(&device_id);
        state.held.insert(device_id.clone(), job_id);
        Some(device_id)
    }

    /// Return a device to the pool. Idempotent on unknown or already-free
    /// device ids: logs a warning and returns rather than erroring, since a
    /// duplicate release (e.g. a racing reap) must never be fatal to the
    /// worker loop.
    pub fn release(&self, device_id: &str) {
        let mut state = self.state.lock();
        match state.held.remove(device_id) {
            Some(_) => {
                state.free.insert(device_id.to_string());
            }
            None => {
                warn!(device_id, "release of a device that was not held");
            }
        }
    }

    pub fn available_count(&self) -> usize {
        self.state.lock().free.len()
    }

    pub fn available_list(&self) -> Vec<String> {
        self.state.lock().free.iter().cloned().collect()
    }

    /// device_id -> job_id for every currently held device.
    pub fn held_map(&self) -> BTreeMap<String, JobId> {
        self.state.lock().held.clone()
    }

    pub fn total(&self) -> usize {
        self.state.lock().all.len()
    }

    pub fn all_device_ids(&self) -> Vec<String> {
        self.state.lock().all.clone()
    }

    pub fn all_free(&self) -> bool {
        let state = self.state.lock();
        state.held.is_empty()
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
