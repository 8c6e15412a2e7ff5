// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Free-function handlers wiring the request surface to a
//! [`ServerContext`]. Every handler returns its response DTO directly —
//! never a `Result` — so a caller gets a well-formed `{status:"error", ...}`
//! body instead of a raw error type.

use crate::context::ServerContext;
use crate::protocol::*;
use boltzq_core::{ArgValue, Clock, JobConfig, JobId, SystemClock};
use boltzq_queue::inspector;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const ARG_ORDER: [&str; 5] = ["config", "output", "protocol", "num_designs", "budget"];

fn build_args(
    config: &str,
    output: &str,
    protocol: &str,
    num_designs: u32,
    budget: u32,
) -> BTreeMap<String, ArgValue> {
    let mut args = BTreeMap::new();
    args.insert("config".to_string(), ArgValue::String(config.to_string()));
    args.insert("output".to_string(), ArgValue::String(output.to_string()));
    args.insert("protocol".to_string(), ArgValue::String(protocol.to_string()));
    args.insert("num_designs".to_string(), ArgValue::Number(num_designs.into()));
    args.insert("budget".to_string(), ArgValue::Number(budget.into()));
    args
}

fn job_name_for(protocol: &str, config: &str) -> String {
    let stem = Path::new(config)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(config);
    format!("boltzgen_{protocol}_{stem}")
}

pub fn submit(ctx: &ServerContext, req: SubmitRequest) -> SubmitResponse {
    if let Err(message) = validate_protocol(&req.protocol) {
        return SubmitResponse {
            status: "error".to_string(),
            job_id: None,
            queue_position: None,
            queue_length: None,
            message: String::new(),
            output_dir: None,
            config: None,
            protocol: None,
            num_designs: None,
            budget: None,
            error_message: Some(message),
        };
    }

    if std::fs::metadata(&req.config).is_err() {
        return error_submit_response(format!("Config file not found: {}", req.config));
    }
    if let Err(err) = std::fs::create_dir_all(&req.output) {
        return error_submit_response(format!("Failed to create output directory: {err}"));
    }

    let config = JobConfig {
        script_path: ctx.design_script_path().to_string_lossy().into_owned(),
        arg_order: ARG_ORDER.iter().map(|s| s.to_string()).collect(),
        args: build_args(&req.config, &req.output, &req.protocol, req.num_designs, req.budget),
        output_dir: PathBuf::from(&req.output),
        job_name: Some(job_name_for(&req.protocol, &req.config)),
    };

    match ctx.queue.submit(config) {
        Ok(outcome) => SubmitResponse {
            status: "queued".to_string(),
            job_id: Some(outcome.job_id.as_str().to_string()),
            queue_position: Some(outcome.position),
            queue_length: Some(outcome.queue_length),
            message: format!(
                "Job queued at position {}. Use check_status or queue_status to monitor.",
                outcome.position
            ),
            output_dir: Some(req.output),
            config: Some(req.config),
            protocol: Some(req.protocol),
            num_designs: Some(req.num_designs),
            budget: Some(req.budget),
            error_message: None,
        },
        Err(err) => error_submit_response(err.to_string()),
    }
}

fn error_submit_response(message: String) -> SubmitResponse {
    SubmitResponse {
        status: "error".to_string(),
        job_id: None,
        queue_position: None,
        queue_length: None,
        message: String::new(),
        output_dir: None,
        config: None,
        protocol: None,
        num_designs: None,
        budget: None,
        error_message: Some(message),
    }
}

pub fn job_status(ctx: &ServerContext, req: JobStatusRequest) -> JobStatusResponse {
    let job_id = JobId::new(req.job_id.clone());
    match ctx.queue.job_status(&job_id) {
        Ok(Some(view)) => {
            let record = view.record;
            JobStatusResponse {
                status: "success".to_string(),
                job_id: Some(record.job_id.clone()),
                job_status: Some(record.status.to_string()),
                queue_position: view.position,
                output_dir: Some(record.output_dir.to_string_lossy().into_owned()),
                device_id: record.device_id.clone(),
                timestamps: Some(JobTimestamps {
                    submitted_at: record.submitted_at,
                    started_at: record.started_at,
                    completed_at: record.completed_at,
                }),
                error: record.error.clone(),
                error_message: None,
            }
        }
        Ok(None) => JobStatusResponse {
            status: "error".to_string(),
            job_id: None,
            job_status: None,
            queue_position: None,
            output_dir: None,
            device_id: None,
            timestamps: None,
            error: Some(format!("Job {} not found", req.job_id)),
            error_message: Some(format!("Job {} not found", req.job_id)),
        },
        Err(err) => JobStatusResponse {
            status: "error".to_string(),
            job_id: None,
            job_status: None,
            queue_position: None,
            output_dir: None,
            device_id: None,
            timestamps: None,
            error: None,
            error_message: Some(err.to_string()),
        },
    }
}

pub fn queue_status(ctx: &ServerContext) -> QueueStatusResponse {
    let view = ctx.queue.queue_status();
    QueueStatusResponse {
        queue_length: view.queue_length,
        running_count: view.running_count,
        max_workers: view.max_workers,
        running_jobs: view
            .running_jobs
            .into_iter()
            .map(|entry| RunningJobEntry {
                job_id: entry.job_id,
                device_id: entry.device_id,
            })
            .collect(),
        queued_jobs: view.queued_jobs,
        available_devices: view.available_devices,
        total_devices: view.total_devices,
        device_assignments: view.device_assignments,
    }
}

pub fn cancel(ctx: &ServerContext, req: CancelRequest) -> CancelResponse {
    let job_id = JobId::new(req.job_id.clone());
    match ctx.queue.cancel(&job_id) {
        Ok(()) => CancelResponse {
            status: "success".to_string(),
            message: format!("Job {} cancelled", req.job_id),
        },
        Err(err) => CancelResponse {
            status: "error".to_string(),
            message: err.to_string(),
        },
    }
}

pub fn configure_queue(ctx: &ServerContext, req: ConfigureQueueRequest) -> ConfigureQueueResponse {
    let device_ids = req.device_ids.as_ref().map(|raw| {
        raw.split(',')
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect::<Vec<_>>()
    });
    let outcome = ctx.queue.reconfigure(req.max_workers, device_ids);
    let device_ids = outcome.device_ids.join(",");
    ConfigureQueueResponse {
        status: "success".to_string(),
        max_workers: outcome.max_workers,
        message: format!(
            "Queue reconfigured: max_workers={}, device_ids={}",
            outcome.max_workers, device_ids
        ),
        device_ids,
    }
}

pub fn resource_status(ctx: &ServerContext) -> ResourceStatusResponse {
    let view = ctx.queue.resource_status();
    let message = if view.is_idle && view.all_devices_free {
        "All resources free. Devices available for other programs.".to_string()
    } else {
        format!(
            "Active: {} running, {} queued, {} device(s) in use",
            view.running_jobs, view.queued_jobs, view.devices_in_use
        )
    };
    ResourceStatusResponse {
        is_idle: view.is_idle,
        all_devices_free: view.all_devices_free,
        resource_usage: ResourceUsage {
            jobs_in_memory: view.jobs_in_memory,
            queued_jobs: view.queued_jobs,
            running_jobs: view.running_jobs,
            devices_in_use: view.devices_in_use,
            devices_available: view.devices_available,
            total_devices: view.total_devices,
        },
        message,
    }
}

/// Purely filesystem-derived: never consults queue state, so it also works
/// for output directories produced by a different process entirely.
pub fn check_status(_ctx: &ServerContext, req: CheckStatusRequest) -> CheckStatusResponse {
    let output_dir = PathBuf::from(&req.output_dir);
    if !output_dir.exists() {
        return CheckStatusResponse {
            status: "error".to_string(),
            job_status: None,
            output_dir: req.output_dir,
            statistics: None,
            job_info: None,
            log_file: None,
            summary: None,
            error_message: Some(format!("Output directory not found: {}", req.output_dir)),
        };
    }

    let job_info = boltzq_store::JobStore::load_job_info(&output_dir).ok().flatten();
    let now_ms = SystemClock.epoch_ms();
    let inspected = inspector::inspect_status(&output_dir, now_ms);
    let artifacts = inspector::scan_artifacts(&output_dir);
    let log_path = boltzq_store::JobStore::run_log_path(&output_dir);

    let statistics = CheckStatistics {
        total_designs: artifacts.total_designs(),
        pdb_files: artifacts
            .pdb_files
            .iter()
            .take(20)
            .map(|p| p.to_string_lossy().into_owned())
            .collect(),
        other_files: Vec::new(),
    };

    let job_status_str = inspected.to_string();
    let summary = if matches!(
        inspected,
        inspector::InspectedStatus::Completed | inspector::InspectedStatus::Failed
    ) {
        Some(build_job_summary(&job_status_str, &statistics, job_info.as_ref()))
    } else {
        None
    };

    CheckStatusResponse {
        status: "success".to_string(),
        job_status: Some(job_status_str),
        output_dir: req.output_dir,
        statistics: Some(statistics),
        job_info,
        log_file: log_path.exists().then(|| log_path.to_string_lossy().into_owned()),
        summary,
        error_message: None,
    }
}

fn build_job_summary(
    job_status: &str,
    statistics: &CheckStatistics,
    job_info: Option<&boltzq_store::JobInfo>,
) -> JobSummary {
    let completion_status = if job_status == "completed" { "Success" } else { "Failed" }.to_string();
    let message = if job_status == "completed" {
        if statistics.total_designs > 0 {
            format!(
                "BoltzGen completed successfully with {} design(s) generated.",
                statistics.total_designs
            )
        } else {
            "BoltzGen completed but no designs were generated.".to_string()
        }
    } else {
        "BoltzGen job failed. Check error messages and log file for details.".to_string()
    };

    JobSummary {
        job_status: job_status.to_string(),
        completion_status,
        job_config: job_info.map(|info| JobConfigSummary {
            config: info.config.clone(),
            protocol: info.protocol.clone(),
            num_designs: info.num_designs,
            budget: info.budget,
            cuda_device: info.cuda_device.clone(),
            submitted_at: info.submitted_at,
        }),
        results: RunStatistics {
            total_designs: statistics.total_designs,
            pdb_files: statistics.pdb_files.clone(),
        },
        message,
        recent_errors: None,
        log_tail: None,
    }
}

/// Supplemented operation: a read-only directory scan over every job the
/// store knows about, no queue-state consultation.
pub fn list_jobs(ctx: &ServerContext) -> ListJobsResponse {
    let records = ctx.store.list_records().unwrap_or_default();
    ListJobsResponse {
        status: "success".to_string(),
        jobs: records
            .into_iter()
            .map(|record| JobListEntry {
                job_id: record.job_id,
                status: record.status.to_string(),
                submitted_at: record.submitted_at,
                output_dir: record.output_dir.to_string_lossy().into_owned(),
                job_name: record.job_name,
            })
            .collect(),
    }
}

pub fn job_log(ctx: &ServerContext, req: JobLogRequest) -> JobLogResponse {
    let log_path = ctx.store.job_log_path(&req.job_id);
    let contents = match std::fs::read_to_string(&log_path) {
        Ok(contents) => contents,
        Err(err) => {
            return JobLogResponse {
                status: "error".to_string(),
                job_id: req.job_id,
                log_path: None,
                lines: Vec::new(),
                error_message: Some(format!("Failed to read log: {err}")),
            }
        }
    };

    let mut lines: Vec<String> = contents.lines().map(|line| line.to_string()).collect();
    if let Some(tail) = req.tail_lines {
        if lines.len() > tail {
            lines = lines.split_off(lines.len() - tail);
        }
    }

    JobLogResponse {
        status: "success".to_string(),
        job_id: req.job_id,
        log_path: Some(log_path.to_string_lossy().into_owned()),
        lines,
        error_message: None,
    }
}

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod tests;
