// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::handle::Inner;
use crate::state::{QueueCore, RunningJob};
use boltzq_core::{ArgValue, Clock, FakeClock, JobConfig, JobRecord, SystemClock};
use boltzq_device::DevicePool;
use boltzq_store::JobStore;
use boltzq_supervisor::BuiltCommand;
use parking_lot::{Condvar, Mutex};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::AtomicU32;
use std::time::Duration;
use tempfile::tempdir;

fn make_inner(
    jobs_root: PathBuf,
    scripts_dir: PathBuf,
    device_ids: Vec<String>,
    max_workers: u32,
    clock: Box<dyn Clock>,
) -> Inner {
    Inner {
        core: Mutex::new(QueueCore::new()),
        devices: Mutex::new(DevicePool::new(device_ids)),
        store: JobStore::new(jobs_root),
        clock,
        max_workers: AtomicU32::new(max_workers),
        scripts_dir,
        eviction_age_ms: 24 * 60 * 60 * 1000,
        shutdown: Mutex::new(false),
        shutdown_cv: Condvar::new(),
    }
}

fn bare_config(script_path: &str, output_dir: PathBuf) -> JobConfig {
    JobConfig {
        script_path: script_path.to_string(),
        arg_order: vec![],
        args: BTreeMap::new(),
        output_dir,
        job_name: None,
    }
}

#[test]
fn dispatch_promotes_pending_job_and_spawns_process() {
    let dir = tempdir().unwrap();
    let out_dir = dir.path().join("out");
    let inner = make_inner(
        dir.path().join("jobs"),
        dir.path().to_path_buf(),
        vec!["0".to_string()],
        1,
        Box::new(SystemClock),
    );

    let job_id = JobId::new("j1");
    let record = JobRecord::new(job_id.clone(), bare_config("/bin/true", out_dir), 0);
    {
        let mut core = inner.core.lock();
        core.records.insert(job_id.clone(), record);
        core.pending.push_back(job_id.clone());
    }

    dispatch(&inner);

    let core = inner.core.lock();
    assert!(core.pending.is_empty());
    assert!(core.running.contains_key(&job_id));
    assert_eq!(core.records.get(&job_id).unwrap().status, Status::Running);
}

#[test]
fn dispatch_writes_job_info_json_from_args_for_compatibility() {
    let dir = tempdir().unwrap();
    let out_dir = dir.path().join("out");
    let inner = make_inner(
        dir.path().join("jobs"),
        dir.path().to_path_buf(),
        vec!["0".to_string()],
        1,
        Box::new(SystemClock),
    );

    let job_id = JobId::new("j1");
    let mut config = bare_config("/bin/true", out_dir.clone());
    config.arg_order = vec!["config".to_string(), "protocol".to_string(), "num_designs".to_string(), "budget".to_string()];
    config.args.insert("config".to_string(), ArgValue::String("run.yaml".to_string()));
    config.args.insert("protocol".to_string(), ArgValue::String("protein-anything".to_string()));
    config.args.insert("num_designs".to_string(), ArgValue::Number(10.into()));
    config.args.insert("budget".to_string(), ArgValue::Number(2.into()));
    let record = JobRecord::new(job_id.clone(), config, 0);
    {
        let mut core = inner.core.lock();
        core.records.insert(job_id.clone(), record);
        core.pending.push_back(job_id.clone());
    }

    dispatch(&inner);

    let info = boltzq_store::JobStore::load_job_info(&out_dir).unwrap().unwrap();
    assert_eq!(info.job_id, job_id.as_str());
    assert_eq!(info.config.as_deref(), Some("run.yaml"));
    assert_eq!(info.protocol, "protein-anything");
    assert_eq!(info.num_designs, 10);
    assert_eq!(info.budget, 2);
    assert_eq!(info.cuda_device.as_deref(), Some("0"));
}

#[test]
fn dispatch_stops_when_no_device_available() {
    let dir = tempdir().unwrap();
    let out_dir = dir.path().join("out");
    let inner = make_inner(dir.path().join("jobs"), dir.path().to_path_buf(), vec![], 1, Box::new(SystemClock));

    let job_id = JobId::new("j1");
    let record = JobRecord::new(job_id.clone(), bare_config("/bin/true", out_dir), 0);
    {
        let mut core = inner.core.lock();
        core.records.insert(job_id.clone(), record);
        core.pending.push_back(job_id.clone());
    }

    dispatch(&inner);

    let core = inner.core.lock();
    assert_eq!(core.pending.len(), 1);
    assert!(core.running.is_empty());
}

#[test]
fn dispatch_respects_max_workers_cap() {
    let dir = tempdir().unwrap();
    let out_dir = dir.path().join("out");
    let inner = make_inner(
        dir.path().join("jobs"),
        dir.path().to_path_buf(),
        vec!["0".to_string(), "1".to_string()],
        1,
        Box::new(SystemClock),
    );

    let job_a = JobId::new("a");
    let job_b = JobId::new("b");
    {
        let mut core = inner.core.lock();
        core.records.insert(job_a.clone(), JobRecord::new(job_a.clone(), bare_config("/bin/true", out_dir.clone()), 0));
        core.records.insert(job_b.clone(), JobRecord::new(job_b.clone(), bare_config("/bin/true", out_dir), 0));
        core.pending.push_back(job_a.clone());
        core.pending.push_back(job_b.clone());
    }

    dispatch(&inner);

    let core = inner.core.lock();
    assert_eq!(core.running.len(), 1);
    assert_eq!(core.pending.len(), 1);
}

#[test]
fn reap_releases_device_and_marks_completed() {
    let dir = tempdir().unwrap();
    let out_dir = dir.path().join("out");
    let log_path = out_dir.join("boltzgen_run.log");
    let inner = make_inner(
        dir.path().join("jobs"),
        dir.path().to_path_buf(),
        vec!["0".to_string()],
        1,
        Box::new(SystemClock),
    );

    let job_id = JobId::new("j1");
    let mut record = JobRecord::new(job_id.clone(), bare_config("/bin/true", out_dir), 0);
    let device_id = inner.devices.lock().acquire(job_id.clone()).unwrap();
    record.start(device_id.clone(), 0).unwrap();
    let built = BuiltCommand {
        program: "/bin/true".to_string(),
        args: vec![],
        env_overrides: BTreeMap::new(),
        cwd: dir.path().to_path_buf(),
    };
    let process = boltzq_supervisor::spawn(&built, &log_path).unwrap();
    {
        let mut core = inner.core.lock();
        core.records.insert(job_id.clone(), record);
        core.running.insert(job_id.clone(), RunningJob { device_id, process });
    }

    for _ in 0..50 {
        reap(&inner);
        if inner.core.lock().running.is_empty() {
            break;
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    let core = inner.core.lock();
    assert!(core.running.is_empty());
    assert_eq!(core.records.get(&job_id).unwrap().status, Status::Completed);
    assert_eq!(inner.devices.lock().available_count(), 1);
}

#[test]
fn reap_marks_nonzero_exit_as_failed() {
    let dir = tempdir().unwrap();
    let out_dir = dir.path().join("out");
    let log_path = out_dir.join("boltzgen_run.log");
    let inner = make_inner(
        dir.path().join("jobs"),
        dir.path().to_path_buf(),
        vec!["0".to_string()],
        1,
        Box::new(SystemClock),
    );

    let job_id = JobId::new("j1");
    let mut record = JobRecord::new(job_id.clone(), bare_config("/bin/false", out_dir), 0);
    let device_id = inner.devices.lock().acquire(job_id.clone()).unwrap();
    record.start(device_id.clone(), 0).unwrap();
    let built = BuiltCommand {
        program: "/bin/false".to_string(),
        args: vec![],
        env_overrides: BTreeMap::new(),
        cwd: dir.path().to_path_buf(),
    };
    let process = boltzq_supervisor::spawn(&built, &log_path).unwrap();
    {
        let mut core = inner.core.lock();
        core.records.insert(job_id.clone(), record);
        core.running.insert(job_id.clone(), RunningJob { device_id, process });
    }

    for _ in 0..50 {
        reap(&inner);
        if inner.core.lock().running.is_empty() {
            break;
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    let core = inner.core.lock();
    let record = core.records.get(&job_id).unwrap();
    assert_eq!(record.status, Status::Failed);
    assert!(record.error.as_deref().unwrap().contains("Process exited with code"));
}

#[test]
fn evict_drops_old_terminal_records_but_keeps_recent_ones() {
    let dir = tempdir().unwrap();
    let now = 200_000_000i64;
    let inner = make_inner(dir.path().join("jobs"), dir.path().to_path_buf(), vec![], 1, Box::new(FakeClock::new(now)));
    let eviction_age = inner.eviction_age_ms;
    let out_dir = dir.path().join("out");

    let old_id = JobId::new("old");
    let mut old_record = JobRecord::new(old_id.clone(), bare_config("/bin/true", out_dir.clone()), 0);
    old_record.start("0".to_string(), 0).unwrap();
    old_record.finish(Status::Completed, now - eviction_age - 1_000, None).unwrap();

    let fresh_id = JobId::new("fresh");
    let mut fresh_record = JobRecord::new(fresh_id.clone(), bare_config("/bin/true", out_dir), 0);
    fresh_record.start("0".to_string(), 0).unwrap();
    fresh_record.finish(Status::Completed, now - 1_000, None).unwrap();

    {
        let mut core = inner.core.lock();
        core.records.insert(old_id.clone(), old_record);
        core.records.insert(fresh_id.clone(), fresh_record);
    }

    evict(&inner);

    let core = inner.core.lock();
    assert!(!core.records.contains_key(&old_id));
    assert!(core.records.contains_key(&fresh_id));
}

#[test]
fn sleep_tier_is_fastest_when_pending_and_slowest_when_idle() {
    let dir = tempdir().unwrap();
    let inner = make_inner(dir.path().join("jobs"), dir.path().to_path_buf(), vec![], 1, Box::new(SystemClock));
    assert_eq!(sleep_tier(&inner), Duration::from_secs(5));

    inner.core.lock().pending.push_back(JobId::new("j1"));
    assert_eq!(sleep_tier(&inner), Duration::from_millis(500));
}
