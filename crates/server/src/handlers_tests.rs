// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use boltzq_queue::{QueueConfig, QueueHandle};
use tempfile::tempdir;

fn context(dir: &std::path::Path, device_ids: Vec<String>) -> ServerContext {
    let cfg = QueueConfig::new(1, device_ids, dir.join("jobs"), dir.join("scripts"));
    let queue = QueueHandle::new(cfg).unwrap();
    ServerContext::new(queue, dir.join("jobs"), dir.join("scripts"))
}

#[test]
fn submit_rejects_unknown_protocol_without_touching_the_queue() {
    let dir = tempdir().unwrap();
    let ctx = context(dir.path(), vec!["0".to_string()]);

    let response = submit(
        &ctx,
        SubmitRequest {
            config: "run.yaml".to_string(),
            output: dir.path().join("out").to_string_lossy().into_owned(),
            protocol: "not-a-real-protocol".to_string(),
            num_designs: 10,
            budget: 2,
        },
    );

    assert_eq!(response.status, "error");
    assert!(response.error_message.unwrap().contains("Invalid protocol"));
    assert_eq!(queue_status(&ctx).queue_length, 0);
}

#[test]
fn submit_rejects_a_missing_config_file() {
    let dir = tempdir().unwrap();
    let ctx = context(dir.path(), vec!["0".to_string()]);

    let response = submit(
        &ctx,
        SubmitRequest {
            config: dir.path().join("missing.yaml").to_string_lossy().into_owned(),
            output: dir.path().join("out").to_string_lossy().into_owned(),
            protocol: "protein-anything".to_string(),
            num_designs: 10,
            budget: 2,
        },
    );

    assert_eq!(response.status, "error");
    assert!(response.error_message.unwrap().contains("Config file not found"));
}

#[test]
fn submit_queues_a_valid_job_and_creates_the_output_directory() {
    let dir = tempdir().unwrap();
    let ctx = context(dir.path(), vec!["0".to_string()]);
    let config_path = dir.path().join("run.yaml");
    std::fs::write(&config_path, "placeholder: true").unwrap();
    let output = dir.path().join("out");

    let response = submit(
        &ctx,
        SubmitRequest {
            config: config_path.to_string_lossy().into_owned(),
            output: output.to_string_lossy().into_owned(),
            protocol: "protein-anything".to_string(),
            num_designs: 5,
            budget: 1,
        },
    );

    assert_eq!(response.status, "queued");
    assert!(response.job_id.is_some());
    assert_eq!(response.queue_position, Some(1));
    assert!(output.is_dir());
}

#[test]
fn job_status_reports_not_found_for_unknown_id() {
    let dir = tempdir().unwrap();
    let ctx = context(dir.path(), vec!["0".to_string()]);

    let response = job_status(
        &ctx,
        JobStatusRequest {
            job_id: "nope".to_string(),
        },
    );

    assert_eq!(response.status, "error");
    assert!(response.error.unwrap().contains("not found"));
}

#[test]
fn cancel_of_unknown_job_reports_the_queue_error_as_the_message() {
    let dir = tempdir().unwrap();
    let ctx = context(dir.path(), vec!["0".to_string()]);

    let response = cancel(
        &ctx,
        CancelRequest {
            job_id: "nope".to_string(),
        },
    );

    assert_eq!(response.status, "error");
    assert!(response.message.contains("not found"));
}

#[test]
fn configure_queue_parses_comma_separated_device_ids() {
    let dir = tempdir().unwrap();
    let ctx = context(dir.path(), vec!["0".to_string()]);

    let response = configure_queue(
        &ctx,
        ConfigureQueueRequest {
            max_workers: Some(2),
            device_ids: Some(" 0, 1 ".to_string()),
        },
    );

    assert_eq!(response.status, "success");
    assert_eq!(response.max_workers, 2);
    assert_eq!(response.device_ids, "0,1");
}

#[test]
fn check_status_reports_an_error_for_a_missing_directory() {
    let dir = tempdir().unwrap();
    let ctx = context(dir.path(), vec!["0".to_string()]);

    let response = check_status(
        &ctx,
        CheckStatusRequest {
            output_dir: dir.path().join("nowhere").to_string_lossy().into_owned(),
        },
    );

    assert_eq!(response.status, "error");
    assert!(response.error_message.unwrap().contains("not found"));
}

#[test]
fn check_status_reports_not_started_when_no_log_exists_yet() {
    let dir = tempdir().unwrap();
    let ctx = context(dir.path(), vec!["0".to_string()]);
    let output = dir.path().join("out");
    std::fs::create_dir_all(&output).unwrap();

    let response = check_status(
        &ctx,
        CheckStatusRequest {
            output_dir: output.to_string_lossy().into_owned(),
        },
    );

    assert_eq!(response.status, "success");
    assert_eq!(response.job_status.as_deref(), Some("not_started"));
    assert!(response.summary.is_none());
}

#[test]
fn list_jobs_is_empty_when_the_store_has_no_records() {
    let dir = tempdir().unwrap();
    let ctx = context(dir.path(), vec!["0".to_string()]);

    let response = list_jobs(&ctx);

    assert_eq!(response.status, "success");
    assert!(response.jobs.is_empty());
}

#[test]
fn job_log_reports_an_error_when_the_log_file_is_missing() {
    let dir = tempdir().unwrap();
    let ctx = context(dir.path(), vec!["0".to_string()]);

    let response = job_log(
        &ctx,
        JobLogRequest {
            job_id: "nope".to_string(),
            tail_lines: None,
        },
    );

    assert_eq!(response.status, "error");
}
