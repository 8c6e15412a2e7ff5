// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `boltzq run` — launch a design run synchronously, bypassing the queue.
//! Blocks until the process exits; see `boltzq_server::run`.

use anyhow::Result;
use boltzq_server::protocol::RunRequest;
use boltzq_server::ServerContext;
use clap::Args;

use crate::output::{print_response, OutputFormat};

#[derive(Args)]
pub struct RunArgs {
    /// Path to the BoltzGen YAML configuration file
    pub config: String,
    /// Output directory for the run's artifacts
    pub output: String,
    /// BoltzGen protocol to run
    #[arg(long, default_value = "protein-anything")]
    pub protocol: String,
    /// Number of designs to generate
    #[arg(long, default_value_t = 10)]
    pub num_designs: u32,
    /// Computational budget parameter
    #[arg(long, default_value_t = 2)]
    pub budget: u32,
    /// Pin the run to a specific device instead of letting the caller's
    /// environment decide
    #[arg(long)]
    pub cuda_device: Option<String>,
}

pub fn execute(ctx: &ServerContext, format: OutputFormat, args: RunArgs) -> Result<()> {
    let response = boltzq_server::run(
        ctx,
        RunRequest {
            config: args.config,
            output: args.output,
            protocol: args.protocol,
            num_designs: args.num_designs,
            budget: args.budget,
            cuda_device: args.cuda_device,
        },
    );
    print_response(format, &response)
}
