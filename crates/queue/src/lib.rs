// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! boltzq-queue: the FIFO queue core, its background worker loop, and the
//! advisory log-derived status inspector.

mod handle;
pub mod inspector;
mod state;
mod worker;

pub use handle::{QueueConfig, QueueHandle};
pub use state::{
    JobStatusView, QueueStatusView, ReconfigureOutcome, ResourceStatusView, RunningEntry,
    SubmitOutcome,
};

use boltzq_core::Status;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error(transparent)]
    Store(#[from] boltzq_store::StoreError),
    #[error("Job {0} not found")]
    NotFound(String),
    #[error("Job {job_id} is already {status}")]
    AlreadyTerminal { job_id: String, status: Status },
    #[error("{0}")]
    Validation(String),
}
