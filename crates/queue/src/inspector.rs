// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log-derived status inspector. A separate query path, given only an
//! `output_dir`, that derives a coarse status from filesystem evidence
//! without ever touching the queue's in-memory state — useful for callers
//! that hold only the output path, not the job-id.

use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

const RUN_LOG_FILE: &str = "boltzgen_run.log";
const TAIL_BYTES: u64 = 32 * 1024;

const COMPLETION_MARKERS: [&str; 4] = [
    "boltzgen completed successfully",
    "design completed",
    "all designs completed",
    "finished",
];
const ERROR_MARKERS: [&str; 5] = ["error:", "exception:", "traceback", "failed:", "fatal"];

const RUNNING_WINDOW_MS: i64 = 5 * 60 * 1000;
const POSSIBLY_RUNNING_WINDOW_MS: i64 = 60 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectedStatus {
    NotStarted,
    Running,
    PossiblyRunning,
    StalledOrCompleted,
    Completed,
    Failed,
}

impl std::fmt::Display for InspectedStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            InspectedStatus::NotStarted => "not_started",
            InspectedStatus::Running => "running",
            InspectedStatus::PossiblyRunning => "possibly_running",
            InspectedStatus::StalledOrCompleted => "stalled_or_completed",
            InspectedStatus::Completed => "completed",
            InspectedStatus::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// Derive a coarse status for `output_dir` from `boltzgen_run.log`, as of
/// `now_ms`. This never reads queue state and never mutates anything.
pub fn inspect_status(output_dir: &Path, now_ms: i64) -> InspectedStatus {
    let log_path = output_dir.join(RUN_LOG_FILE);
    if !log_path.exists() {
        return InspectedStatus::NotStarted;
    }

    let tail = read_tail(&log_path, TAIL_BYTES).unwrap_or_default().to_lowercase();
    if ERROR_MARKERS.iter().any(|marker| tail.contains(marker)) {
        return InspectedStatus::Failed;
    }
    if COMPLETION_MARKERS.iter().any(|marker| tail.contains(marker)) {
        return InspectedStatus::Completed;
    }

    match mtime_ms(&log_path).map(|mtime| now_ms.saturating_sub(mtime)) {
        Some(age) if age < RUNNING_WINDOW_MS => InspectedStatus::Running,
        Some(age) if age < POSSIBLY_RUNNING_WINDOW_MS => InspectedStatus::PossiblyRunning,
        _ => InspectedStatus::StalledOrCompleted,
    }
}

/// Output artefacts found under `output_dir`: `*.pdb`/`*.cif` recursively,
/// `*.json`/`*.csv`/`*.txt` at the top level only.
#[derive(Debug, Clone, Default)]
pub struct ArtifactSummary {
    pub pdb_files: Vec<PathBuf>,
    pub cif_files: Vec<PathBuf>,
    pub json_count: usize,
    pub csv_count: usize,
    pub txt_count: usize,
}

impl ArtifactSummary {
    pub fn total_designs(&self) -> usize {
        self.pdb_files.len() + self.cif_files.len()
    }
}

pub fn scan_artifacts(output_dir: &Path) -> ArtifactSummary {
    let mut summary = ArtifactSummary::default();
    scan_recursive(output_dir, &mut summary);

    if let Ok(entries) = std::fs::read_dir(output_dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            match path.extension().and_then(|ext| ext.to_str()) {
                Some("json") => summary.json_count += 1,
                Some("csv") => summary.csv_count += 1,
                Some("txt") => summary.txt_count += 1,
                _ => {}
            }
        }
    }
    summary
}

fn scan_recursive(dir: &Path, summary: &mut ArtifactSummary) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            scan_recursive(&path, summary);
        } else if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
            match ext {
                "pdb" => summary.pdb_files.push(path),
                "cif" => summary.cif_files.push(path),
                _ => {}
            }
        }
    }
}

fn read_tail(path: &Path, max_bytes: u64) -> std::io::Result<String> {
    let mut file = std::fs::File::open(path)?;
    let len = file.metadata()?.len();
    let start = len.saturating_sub(max_bytes);
    file.seek(SeekFrom::Start(start))?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn mtime_ms(path: &Path) -> Option<i64> {
    let metadata = std::fs::metadata(path).ok()?;
    let modified = metadata.modified().ok()?;
    let duration = modified.duration_since(UNIX_EPOCH).ok()?;
    Some(duration.as_millis() as i64)
}

#[cfg(test)]
#[path = "inspector_tests.rs"]
mod tests;
