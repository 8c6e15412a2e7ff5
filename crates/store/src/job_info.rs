// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `job_info.json` compatibility projection read by `check_status`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobInfo {
    pub job_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
    pub output_dir: PathBuf,
    pub protocol: String,
    pub num_designs: u32,
    pub budget: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuda_device: Option<String>,
    pub submitted_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
}

#[cfg(test)]
#[path = "job_info_tests.rs"]
mod tests;
