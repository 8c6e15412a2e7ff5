// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `boltzq check-status` — the log-derived, queue-agnostic status inspector
//! Works from an output directory alone, even for runs the current
//! queue never tracked.

use anyhow::Result;
use boltzq_server::protocol::CheckStatusRequest;
use boltzq_server::ServerContext;
use clap::Args;

use crate::output::{print_response, OutputFormat};

#[derive(Args)]
pub struct CheckStatusArgs {
    /// Output directory to inspect
    pub output_dir: String,
}

pub fn execute(ctx: &ServerContext, format: OutputFormat, args: CheckStatusArgs) -> Result<()> {
    let response = boltzq_server::check_status(
        ctx,
        CheckStatusRequest {
            output_dir: args.output_dir,
        },
    );
    print_response(format, &response)
}
