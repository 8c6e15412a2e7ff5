// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! boltzq - GPU design-job queue CLI

mod commands;
mod env;
mod output;

use anyhow::Result;
use boltzq_queue::{QueueConfig, QueueHandle};
use boltzq_server::ServerContext;
use clap::{Parser, Subcommand};

use commands::{check_status, job, queue, run, submit};
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "boltzq", version, about = "GPU design-job queue: submit, run, and monitor BoltzGen jobs")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value_t, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enqueue a design run
    Submit(submit::SubmitArgs),
    /// Run a design synchronously, bypassing the queue
    Run(run::RunArgs),
    /// Inspect an output directory's log for a coarse status
    CheckStatus(check_status::CheckStatusArgs),
    /// Job-id-keyed operations
    Job(job::JobArgs),
    /// Queue-wide operations
    Queue(queue::QueueArgs),
}

fn main() {
    if let Err(err) = run_cli() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    setup_logging();

    let cli = Cli::parse();
    let config = QueueConfig::new(env::max_workers(), env::device_ids(), env::jobs_root(), env::scripts_dir());
    let queue = QueueHandle::new(config)?;
    let ctx = ServerContext::new(queue, env::jobs_root(), env::scripts_dir());

    match cli.command {
        Commands::Submit(args) => submit::execute(&ctx, cli.output, args),
        Commands::Run(args) => run::execute(&ctx, cli.output, args),
        Commands::CheckStatus(args) => check_status::execute(&ctx, cli.output, args),
        Commands::Job(args) => job::execute(&ctx, cli.output, args),
        Commands::Queue(args) => queue::execute(&ctx, cli.output, args),
    }
}

fn setup_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
