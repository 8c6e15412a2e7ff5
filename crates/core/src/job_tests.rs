// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::path::PathBuf;

fn config() -> JobConfig {
    JobConfig {
        script_path: "run.py".to_string(),
        arg_order: vec!["config".to_string(), "verbose".to_string()],
        args: BTreeMap::from([
            ("config".to_string(), ArgValue::String("cfg.yaml".to_string())),
            ("verbose".to_string(), ArgValue::Bool(true)),
        ]),
        output_dir: PathBuf::from("/tmp/out"),
        job_name: None,
    }
}

#[test]
fn new_record_starts_queued() {
    let record = JobRecord::new(JobId::new("j1"), config(), 1000);
    assert_eq!(record.status, Status::Queued);
    assert!(record.started_at.is_none());
    assert!(record.device_id.is_none());
}

#[test]
fn start_transitions_to_running_and_pins_device() {
    let mut record = JobRecord::new(JobId::new("j1"), config(), 1000);
    record.start("0".to_string(), 1100).unwrap();
    assert_eq!(record.status, Status::Running);
    assert_eq!(record.device_id.as_deref(), Some("0"));
    assert_eq!(record.started_at, Some(1100));
}

#[test]
fn start_twice_is_rejected() {
    let mut record = JobRecord::new(JobId::new("j1"), config(), 1000);
    record.start("0".to_string(), 1100).unwrap();
    let err = record.start("1".to_string(), 1200).unwrap_err();
    assert!(matches!(err, JobError::InvalidTransition { .. }));
}

#[test]
fn finish_clears_device_and_sets_terminal_fields() {
    let mut record = JobRecord::new(JobId::new("j1"), config(), 1000);
    record.start("0".to_string(), 1100).unwrap();
    record.finish(Status::Completed, 1300, None).unwrap();
    assert_eq!(record.status, Status::Completed);
    assert!(record.device_id.is_none());
    assert_eq!(record.completed_at, Some(1300));
}

#[test]
fn finish_from_terminal_is_rejected() {
    let mut record = JobRecord::new(JobId::new("j1"), config(), 1000);
    record.finish(Status::Cancelled, 1200, None).unwrap();
    let err = record.finish(Status::Cancelled, 1300, None).unwrap_err();
    assert!(matches!(err, JobError::InvalidTransition { .. }));
}

#[test]
fn cancel_while_queued_goes_straight_to_terminal() {
    let mut record = JobRecord::new(JobId::new("j1"), config(), 1000);
    record.finish(Status::Cancelled, 1050, None).unwrap();
    assert_eq!(record.status, Status::Cancelled);
    assert_eq!(record.completed_at, Some(1050));
}

#[test]
fn record_round_trips_through_json() {
    let mut record = JobRecord::new(JobId::new("j1"), config(), 1000);
    record.start("0".to_string(), 1100).unwrap();
    record.set_pid(4242);
    let json = serde_json::to_string(&record).unwrap();
    let back: JobRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(back.job_id, record.job_id);
    assert_eq!(back.status, record.status);
    assert_eq!(back.device_id, record.device_id);
    assert_eq!(back.pid, record.pid);
    assert_eq!(back.args, record.args);
}

#[test]
fn arg_value_display_matches_kind() {
    assert_eq!(ArgValue::Bool(true).as_display_string(), "true");
    assert_eq!(
        ArgValue::String("x".to_string()).as_display_string(),
        "x"
    );
}
