// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The server's explicitly-owned handle set: one `QueueHandle` plus the
//! ambient paths handlers need to resolve script locations and read-only
//! log/listing views. Built once in `boltzq-cli`'s `main()` and threaded
//! through to every command handler rather than reached for through a
//! global.

use boltzq_queue::QueueHandle;
use boltzq_store::JobStore;
use std::path::PathBuf;

/// The external design script every `submit`/`run` invocation launches.
pub const DESIGN_SCRIPT: &str = "run_boltzgen.py";

pub struct ServerContext {
    pub queue: QueueHandle,
    pub store: JobStore,
    pub scripts_dir: PathBuf,
}

impl ServerContext {
    pub fn new(queue: QueueHandle, jobs_root: PathBuf, scripts_dir: PathBuf) -> Self {
        Self {
            queue,
            store: JobStore::new(jobs_root),
            scripts_dir,
        }
    }

    pub fn design_script_path(&self) -> PathBuf {
        self.scripts_dir.join(DESIGN_SCRIPT)
    }
}
