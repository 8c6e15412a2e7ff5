// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `boltzq queue <subcommand>` — aggregate, queue-wide operations.

use anyhow::Result;
use boltzq_server::protocol::ConfigureQueueRequest;
use boltzq_server::ServerContext;
use clap::{Args, Subcommand};

use crate::output::{print_response, OutputFormat};

#[derive(Args)]
pub struct QueueArgs {
    #[command(subcommand)]
    pub command: QueueCommand,
}

#[derive(Subcommand)]
pub enum QueueCommand {
    /// Show queue length, running jobs, and device assignments
    Status,
    /// Change the worker cap and/or device pool
    Configure {
        #[arg(long)]
        max_workers: Option<u32>,
        /// Comma-separated device indices, e.g. "0,1"
        #[arg(long)]
        device_ids: Option<String>,
    },
    /// Show in-memory job/device counts, useful for verifying the queue is
    /// fully idle
    Resource,
}

pub fn execute(ctx: &ServerContext, format: OutputFormat, args: QueueArgs) -> Result<()> {
    match args.command {
        QueueCommand::Status => print_response(format, &boltzq_server::queue_status(ctx)),
        QueueCommand::Configure { max_workers, device_ids } => print_response(
            format,
            &boltzq_server::configure_queue(ctx, ConfigureQueueRequest { max_workers, device_ids }),
        ),
        QueueCommand::Resource => print_response(format, &boltzq_server::resource_status(ctx)),
    }
}
