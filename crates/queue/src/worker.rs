// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The background worker loop: reap, dispatch, periodic eviction, adaptive
//! sleep. Runs on its own dedicated OS thread, spawned once by
//! `QueueHandle::new`.

use crate::handle::Inner;
use crate::state::RunningJob;
use boltzq_core::{ArgValue, JobId, JobRecord, Status};
use boltzq_store::{JobInfo, JobStore};
use boltzq_supervisor::{build_command, spawn, ExitOutcome};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::time::Duration;
use tracing::warn;

/// Evict terminal, aged-out records roughly once a minute (at the default
/// sleep tiers), not every tick.
const EVICTION_TICK_INTERVAL: u64 = 60;

pub(crate) fn run_loop(inner: &Inner) {
    let mut tick: u64 = 0;
    loop {
        if *inner.shutdown.lock() {
            return;
        }

        let sleep_for = match panic::catch_unwind(AssertUnwindSafe(|| tick_once(inner, tick))) {
            Ok(duration) => duration,
            Err(_) => {
                warn!("worker loop iteration panicked; continuing");
                Duration::from_secs(5)
            }
        };
        tick = tick.wrapping_add(1);

        // Sleep on the condvar rather than a bare `thread::sleep` so
        // `shutdown`/`reconfigure` can wake this early instead of waiting
        // out the current tier.
        let mut shutdown = inner.shutdown.lock();
        if !*shutdown {
            inner.shutdown_cv.wait_for(&mut shutdown, sleep_for);
        }
    }
}

fn tick_once(inner: &Inner, tick: u64) -> Duration {
    reap(inner);
    dispatch(inner);
    if tick % EVICTION_TICK_INTERVAL == 0 {
        evict(inner);
    }
    sleep_tier(inner)
}

/// Observe exited children, release their devices, and persist terminal
/// records. The queue lock and the device-pool lock are never held
/// together: each critical section is entered and released in
/// turn.
fn reap(inner: &Inner) {
    let now = inner.clock.epoch_ms();

    let finished: Vec<(JobId, String, ExitOutcome)> = {
        let core = inner.core.lock();
        let mut finished = Vec::new();
        for (job_id, running) in core.running.iter() {
            match running.process.poll() {
                Ok(Some(outcome)) => finished.push((job_id.clone(), running.device_id.clone(), outcome)),
                Ok(None) => {}
                Err(err) => warn!(job_id = %job_id, error = %err, "failed to poll child process"),
            }
        }
        finished
    };

    for (job_id, device_id, outcome) in finished {
        let persisted = {
            let mut core = inner.core.lock();
            match core.running.remove(&job_id) {
                Some(_) => {
                    let (status, error) = match outcome {
                        ExitOutcome::Success => (Status::Completed, None),
                        ExitOutcome::Failure(code) => {
                            (Status::Failed, Some(format!("Process exited with code {code}")))
                        }
                    };
                    core.records.get_mut(&job_id).map(|record| {
                        let _ = record.finish(status, now, error);
                        record.clone()
                    })
                }
                None => None,
            }
        };

        inner.devices.lock().release(&device_id);

        let device_ids = inner.all_device_ids();
        let snapshot = {
            let core = inner.core.lock();
            core.snapshot(inner.max_workers.load(Ordering::SeqCst), device_ids)
        };

        if let Some(record) = persisted {
            if let Err(err) = inner.store.save_record(&record) {
                warn!(job_id = %job_id, error = %err, "failed to persist reaped record");
            }
        }
        if let Err(err) = inner.store.save_queue_state(&snapshot) {
            warn!(error = %err, "failed to persist queue state after reap");
        }
    }
}

/// Promote pending jobs to running while a device and a worker slot are
/// both available. Stops as soon as either is exhausted; never blocks
/// waiting for a device to free (device starvation is not an error).
fn dispatch(inner: &Inner) {
    loop {
        let at_capacity = {
            let core = inner.core.lock();
            core.running.len() >= inner.max_workers.load(Ordering::SeqCst) as usize || core.pending.is_empty()
        };
        if at_capacity {
            return;
        }

        let job_id = {
            let core = inner.core.lock();
            match core.pending.front() {
                Some(id) => id.clone(),
                None => return,
            }
        };

        let has_record = {
            let core = inner.core.lock();
            core.records.contains_key(&job_id)
        };
        if !has_record {
            // Record deleted or cancelled out from under us; drop the
            // stale head and try the next one.
            let mut core = inner.core.lock();
            if core.pending.front() == Some(&job_id) {
                core.pending.pop_front();
            }
            continue;
        }

        let Some(device_id) = inner.devices.lock().acquire(job_id.clone()) else {
            return; // pool exhausted; retry next tick
        };

        let now = inner.clock.epoch_ms();
        let started = {
            let mut core = inner.core.lock();
            let still_head = core.pending.front() == Some(&job_id);
            let still_queued = core
                .records
                .get(&job_id)
                .map(|record| record.status == Status::Queued)
                .unwrap_or(false);
            if still_head && still_queued {
                core.pending.pop_front();
                core.records.get_mut(&job_id).and_then(|record| {
                    record.start(device_id.clone(), now).ok()?;
                    Some(record.clone())
                })
            } else {
                None
            }
        };

        let Some(mut record) = started else {
            // Raced with a cancel of the same job; give the device back.
            inner.devices.lock().release(&device_id);
            continue;
        };

        let built = build_command(&record, &device_id, inner.scripts_dir.clone());
        let log_path = JobStore::run_log_path(&record.output_dir);

        match spawn(&built, &log_path) {
            Ok(process) => {
                record.set_pid(process.pid);
                let device_ids = inner.all_device_ids();
                let snapshot = {
                    let mut core = inner.core.lock();
                    if let Some(slot) = core.records.get_mut(&job_id) {
                        *slot = record.clone();
                    }
                    core.running.insert(
                        job_id.clone(),
                        RunningJob {
                            device_id: device_id.clone(),
                            process,
                        },
                    );
                    core.snapshot(inner.max_workers.load(Ordering::SeqCst), device_ids)
                };
                if let Err(err) = inner.store.save_record(&record) {
                    warn!(job_id = %job_id, error = %err, "failed to persist dispatched record");
                }
                if let Err(err) = inner.store.save_queue_state(&snapshot) {
                    warn!(error = %err, "failed to persist queue state after dispatch");
                }
                // Compatibility projection for callers that only hold the
                // output path, not the job-id (see boltzq_store::JobInfo).
                if let Err(err) = inner.store.save_job_info(&job_info_from_record(&record, &device_id)) {
                    warn!(job_id = %job_id, error = %err, "failed to persist job_info.json");
                }
            }
            Err(err) => {
                warn!(job_id = %job_id, error = %err, "failed to spawn child process");
                let _ = record.finish(Status::Failed, inner.clock.epoch_ms(), Some(err.to_string()));
                inner.devices.lock().release(&device_id);
                let device_ids = inner.all_device_ids();
                let snapshot = {
                    let mut core = inner.core.lock();
                    if let Some(slot) = core.records.get_mut(&job_id) {
                        *slot = record.clone();
                    }
                    core.snapshot(inner.max_workers.load(Ordering::SeqCst), device_ids)
                };
                if let Err(err) = inner.store.save_record(&record) {
                    warn!(job_id = %job_id, error = %err, "failed to persist failed-dispatch record");
                }
                if let Err(err) = inner.store.save_queue_state(&snapshot) {
                    warn!(error = %err, "failed to persist queue state after failed dispatch");
                }
            }
        }
    }
}

/// Drop terminal records older than `eviction_age_ms` from the in-memory
/// mirror. History survives on disk; this only bounds steady-state memory.
fn evict(inner: &Inner) {
    let now = inner.clock.epoch_ms();
    let cutoff = now - inner.eviction_age_ms;
    let mut core = inner.core.lock();
    core.records
        .retain(|_, record| !(record.status.is_terminal() && record.completed_at.is_some_and(|t| t < cutoff)));
}

/// Derive the `job_info.json` compatibility projection from a dispatched
/// record. `config`/`protocol`/`num_designs`/`budget` are read back out of
/// the generic `args` map the caller supplied at submit time — the queue
/// core has no protocol-specific fields of its own.
fn job_info_from_record(record: &JobRecord, device_id: &str) -> JobInfo {
    JobInfo {
        job_id: record.job_id.clone(),
        config: record.args.get("config").map(ArgValue::as_display_string),
        output_dir: record.output_dir.clone(),
        protocol: record
            .args
            .get("protocol")
            .map(ArgValue::as_display_string)
            .unwrap_or_default(),
        num_designs: arg_as_u32(record, "num_designs"),
        budget: arg_as_u32(record, "budget"),
        cuda_device: Some(device_id.to_string()),
        submitted_at: record.submitted_at,
        started_at: record.started_at,
        pid: record.pid,
    }
}

fn arg_as_u32(record: &JobRecord, name: &str) -> u32 {
    match record.args.get(name) {
        Some(ArgValue::Number(n)) => n.as_u64().unwrap_or(0) as u32,
        Some(ArgValue::String(s)) => s.parse().unwrap_or(0),
        _ => 0,
    }
}

fn sleep_tier(inner: &Inner) -> Duration {
    let core = inner.core.lock();
    if !core.pending.is_empty() {
        Duration::from_millis(500)
    } else if !core.running.is_empty() {
        Duration::from_secs(2)
    } else {
        Duration::from_secs(5)
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
