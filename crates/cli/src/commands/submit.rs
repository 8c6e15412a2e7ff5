// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `boltzq submit` — enqueue a design run and return immediately.

use anyhow::Result;
use boltzq_server::protocol::SubmitRequest;
use boltzq_server::ServerContext;
use clap::Args;

use crate::output::{print_response, OutputFormat};

#[derive(Args)]
pub struct SubmitArgs {
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
}

pub fn execute(ctx: &ServerContext, format: OutputFormat, args: SubmitArgs) -> Result<()> {
    let response = boltzq_server::submit(
        ctx,
        SubmitRequest {
            config: args.config,
            output: args.output,
            protocol: args.protocol,
            num_designs: args.num_designs,
            budget: args.budget,
        },
    );
    print_response(format, &response)
}
