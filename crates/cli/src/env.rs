// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI's startup
//! configuration: worker cap, device pool, and storage roots.

use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

const DEFAULT_MAX_WORKERS: u32 = 1;

/// `BOLTZQ_MAX_WORKERS`, defaulting to 1 concurrent job.
pub fn max_workers() -> u32 {
    std::env::var("BOLTZQ_MAX_WORKERS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_MAX_WORKERS)
}

/// `BOLTZQ_DEVICE_IDS` (comma-separated), falling back to an `nvidia-smi`
/// probe and finally to a single assumed device, so a host with no GPU
/// configuration still comes up with a usable one-device pool.
pub fn device_ids() -> Vec<String> {
    if let Ok(raw) = std::env::var("BOLTZQ_DEVICE_IDS") {
        let ids: Vec<String> = raw
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if !ids.is_empty() {
            return ids;
        }
    }

    if let Some(ids) = detect_devices() {
        return ids;
    }

    tracing::warn!("could not detect devices via nvidia-smi, defaulting to [\"0\"]");
    vec!["0".to_string()]
}

fn detect_devices() -> Option<Vec<String>> {
    let output = run_with_timeout(
        Command::new("nvidia-smi").args(["--query-gpu=index", "--format=csv,noheader"]),
        Duration::from_secs(10),
    )?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let ids: Vec<String> = stdout
        .lines()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect();
    if ids.is_empty() {
        None
    } else {
        tracing::info!(?ids, "auto-detected devices");
        Some(ids)
    }
}

/// `nvidia-smi` hanging (e.g. a wedged driver) must not hang startup. Runs
/// the probe on its own thread and gives up after `timeout` rather than
/// blocking forever on `Child::wait`.
fn run_with_timeout(command: &mut Command, timeout: Duration) -> Option<std::process::Output> {
    let mut child = command.stdout(std::process::Stdio::piped()).stderr(std::process::Stdio::piped()).spawn().ok()?;
    let start = std::time::Instant::now();
    loop {
        match child.try_wait().ok()? {
            Some(_) => return child.wait_with_output().ok(),
            None => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    return None;
                }
                std::thread::sleep(Duration::from_millis(50));
            }
        }
    }
}

/// `BOLTZQ_JOBS_ROOT`, defaulting to `~/.local/state/boltzq/jobs`.
pub fn jobs_root() -> PathBuf {
    if let Ok(dir) = std::env::var("BOLTZQ_JOBS_ROOT") {
        return PathBuf::from(dir);
    }
    state_dir().join("jobs")
}

/// `BOLTZQ_SCRIPTS_DIR`, the directory containing `run_boltzgen.py`.
pub fn scripts_dir() -> PathBuf {
    std::env::var("BOLTZQ_SCRIPTS_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("scripts"))
}

fn state_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("BOLTZQ_STATE_DIR") {
        return PathBuf::from(dir);
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return PathBuf::from(xdg).join("boltzq");
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".local/state/boltzq")
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
