// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request/response DTOs for the job-submission request surface.
//! Field names are kept verbatim so existing callers round-trip unchanged.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The closed set of supported design protocols. Any other string is a
/// validation error at the `submit`/`run` boundary, never a queue mutation.
pub const VALID_PROTOCOLS: [&str; 5] = [
    "protein-anything",
    "peptide-anything",
    "protein-small_molecule",
    "nanobody-anything",
    "antibody-anything",
];

pub fn validate_protocol(protocol: &str) -> Result<(), String> {
    if VALID_PROTOCOLS.contains(&protocol) {
        Ok(())
    } else {
        Err(format!(
            "Invalid protocol: {protocol}. Must be one of: {}",
            VALID_PROTOCOLS.join(", ")
        ))
    }
}

fn default_num_designs() -> u32 {
    10
}

fn default_budget() -> u32 {
    2
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitRequest {
    pub config: String,
    pub output: String,
    pub protocol: String,
    #[serde(default = "default_num_designs")]
    pub num_designs: u32,
    #[serde(default = "default_budget")]
    pub budget: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_position: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_length: Option<usize>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_designs: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunRequest {
    pub config: String,
    pub output: String,
    pub protocol: String,
    #[serde(default = "default_num_designs")]
    pub num_designs: u32,
    #[serde(default = "default_budget")]
    pub budget: u32,
    #[serde(default)]
    pub cuda_device: Option<String>,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct RunStatistics {
    pub total_designs: usize,
    /// Relative paths, capped at 20 entries per the response-shape budget.
    pub pdb_files: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunResponse {
    pub status: String,
    pub output_dir: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_designs: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuda_device: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<RunStatistics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout_preview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr_preview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckStatusRequest {
    pub output_dir: String,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct CheckStatistics {
    pub total_designs: usize,
    pub pdb_files: Vec<String>,
    pub other_files: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobSummary {
    pub job_status: String,
    pub completion_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_config: Option<JobConfigSummary>,
    pub results: RunStatistics,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_tail: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobConfigSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
    pub protocol: String,
    pub num_designs: u32,
    pub budget: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuda_device: Option<String>,
    pub submitted_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckStatusResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_status: Option<String>,
    pub output_dir: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<CheckStatistics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_info: Option<boltzq_store::JobInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<JobSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobStatusRequest {
    pub job_id: String,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct JobTimestamps {
    pub submitted_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobStatusResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_position: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamps: Option<JobTimestamps>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunningJobEntry {
    pub job_id: String,
    pub device_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueueStatusResponse {
    pub queue_length: usize,
    pub running_count: usize,
    pub max_workers: u32,
    pub running_jobs: Vec<RunningJobEntry>,
    pub queued_jobs: Vec<String>,
    pub available_devices: Vec<String>,
    pub total_devices: usize,
    pub device_assignments: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CancelRequest {
    pub job_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CancelResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ConfigureQueueRequest {
    #[serde(default)]
    pub max_workers: Option<u32>,
    /// Comma-separated device indices, e.g. `"0,1"`.
    #[serde(default)]
    pub device_ids: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigureQueueResponse {
    pub status: String,
    pub max_workers: u32,
    pub device_ids: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceUsage {
    pub jobs_in_memory: usize,
    pub queued_jobs: usize,
    pub running_jobs: usize,
    pub devices_in_use: usize,
    pub devices_available: usize,
    pub total_devices: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceStatusResponse {
    pub is_idle: bool,
    pub all_devices_free: bool,
    pub resource_usage: ResourceUsage,
    pub message: String,
}

/// A single entry in a directory-wide job listing: a read-only directory
/// scan, no queue-state mutation.
#[derive(Debug, Clone, Serialize)]
pub struct JobListEntry {
    pub job_id: String,
    pub status: String,
    pub submitted_at: i64,
    pub output_dir: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListJobsResponse {
    pub status: String,
    pub jobs: Vec<JobListEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobLogRequest {
    pub job_id: String,
    #[serde(default)]
    pub tail_lines: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobLogResponse {
    pub status: String,
    pub job_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_path: Option<String>,
    pub lines: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
