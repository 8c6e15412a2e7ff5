// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::{CommandFactory, Parser};

use super::Cli;

#[test]
fn clap_derive_is_internally_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn parses_submit_with_defaulted_protocol_and_budget() {
    let cli = Cli::parse_from(["boltzq", "submit", "run.yaml", "/tmp/out"]);
    match cli.command {
        super::Commands::Submit(args) => {
            assert_eq!(args.protocol, "protein-anything");
            assert_eq!(args.num_designs, 10);
            assert_eq!(args.budget, 2);
        }
        _ => panic!("expected Submit"),
    }
}

#[test]
fn parses_job_status_subcommand() {
    let cli = Cli::parse_from(["boltzq", "job", "status", "abc123"]);
    match cli.command {
        super::Commands::Job(args) => match args.command {
            crate::commands::job::JobCommand::Status { job_id } => assert_eq!(job_id, "abc123"),
            _ => panic!("expected Status"),
        },
        _ => panic!("expected Job"),
    }
}

#[test]
fn parses_queue_configure_with_device_ids() {
    let cli = Cli::parse_from(["boltzq", "queue", "configure", "--device-ids", "0,1"]);
    match cli.command {
        super::Commands::Queue(args) => match args.command {
            crate::commands::queue::QueueCommand::Configure { device_ids, .. } => {
                assert_eq!(device_ids.as_deref(), Some("0,1"));
            }
            _ => panic!("expected Configure"),
        },
        _ => panic!("expected Queue"),
    }
}
