// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builds and supervises the external design-tool subprocess for a single
//! running job: argv/env construction, launch, polling, and termination.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

mod command;
mod process;

pub use command::{build_command, BuiltCommand};
pub use process::{spawn, ExitOutcome, SupervisedProcess};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
