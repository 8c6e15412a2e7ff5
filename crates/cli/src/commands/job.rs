// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `boltzq job <subcommand>` — operations keyed by job-id rather than
//! output directory.

use anyhow::Result;
use boltzq_server::protocol::{CancelRequest, JobLogRequest, JobStatusRequest};
use boltzq_server::ServerContext;
use clap::{Args, Subcommand};

use crate::output::{print_response, OutputFormat};

#[derive(Args)]
pub struct JobArgs {
    #[command(subcommand)]
    pub command: JobCommand,
}

#[derive(Subcommand)]
pub enum JobCommand {
    /// Show a job's current status and queue position
    Status { job_id: String },
    /// Cancel a queued or running job
    Cancel { job_id: String },
    /// Tail a job's captured log
    Log {
        job_id: String,
        /// Only show the last N lines
        #[arg(long)]
        tail_lines: Option<usize>,
    },
    /// List every job the store has a record for
    List,
}

pub fn execute(ctx: &ServerContext, format: OutputFormat, args: JobArgs) -> Result<()> {
    match args.command {
        JobCommand::Status { job_id } => {
            print_response(format, &boltzq_server::job_status(ctx, JobStatusRequest { job_id }))
        }
        JobCommand::Cancel { job_id } => {
            print_response(format, &boltzq_server::cancel(ctx, CancelRequest { job_id }))
        }
        JobCommand::Log { job_id, tail_lines } => print_response(
            format,
            &boltzq_server::job_log(ctx, JobLogRequest { job_id, tail_lines }),
        ),
        JobCommand::List => print_response(format, &boltzq_server::list_jobs(ctx)),
    }
}
