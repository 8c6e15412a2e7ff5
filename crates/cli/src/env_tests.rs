// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

#[test]
#[serial] // mutates process-wide env vars
fn max_workers_defaults_to_one_when_unset() {
    std::env::remove_var("BOLTZQ_MAX_WORKERS");
    assert_eq!(max_workers(), 1);
}

#[test]
#[serial]
fn max_workers_parses_the_env_override() {
    std::env::set_var("BOLTZQ_MAX_WORKERS", "4");
    assert_eq!(max_workers(), 4);
    std::env::remove_var("BOLTZQ_MAX_WORKERS");
}

#[test]
#[serial]
fn device_ids_parses_comma_separated_env_override() {
    std::env::set_var("BOLTZQ_DEVICE_IDS", " 0, 1 ,2");
    assert_eq!(device_ids(), vec!["0".to_string(), "1".to_string(), "2".to_string()]);
    std::env::remove_var("BOLTZQ_DEVICE_IDS");
}

#[test]
#[serial]
fn jobs_root_honors_explicit_override() {
    std::env::set_var("BOLTZQ_JOBS_ROOT", "/tmp/boltzq-test-jobs");
    assert_eq!(jobs_root(), PathBuf::from("/tmp/boltzq-test-jobs"));
    std::env::remove_var("BOLTZQ_JOBS_ROOT");
}

#[test]
#[serial]
fn scripts_dir_honors_explicit_override() {
    std::env::set_var("BOLTZQ_SCRIPTS_DIR", "/opt/boltzgen/scripts");
    assert_eq!(scripts_dir(), PathBuf::from("/opt/boltzgen/scripts"));
    std::env::remove_var("BOLTZQ_SCRIPTS_DIR");
}
