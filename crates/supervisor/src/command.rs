// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pure argv/env construction, kept separate from process spawning so it is
//! unit-testable without touching the filesystem or the OS process table —
//! returns a data structure describing the launch rather than spawning
//! inline.

use boltzq_core::{ArgValue, JobRecord};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A fully-built invocation, ready to hand to [`crate::process::spawn`].
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltCommand {
    pub program: String,
    pub args: Vec<String>,
    pub env_overrides: BTreeMap<String, String>,
    pub cwd: PathBuf,
}

/// Build the argv and environment for launching `record` on `device_id`.
///
/// Argv construction, exactly: `[script_path, (for each arg in insertion
/// order) "--name" value, unless boolean; boolean-true emits "--name" alone;
/// boolean-false and absent args emit nothing]`.
pub fn build_command(record: &JobRecord, device_id: &str, scripts_dir: PathBuf) -> BuiltCommand {
    let mut args = Vec::new();
    for name in &record.arg_order {
        let Some(value) = record.args.get(name) else {
            continue;
        };
        match value {
            ArgValue::Bool(true) => args.push(format!("--{name}")),
            ArgValue::Bool(false) => {}
            ArgValue::String(s) => {
                args.push(format!("--{name}"));
                args.push(s.clone());
            }
            ArgValue::Number(n) => {
                args.push(format!("--{name}"));
                args.push(n.to_string());
            }
        }
    }

    let mut env_overrides = BTreeMap::new();
    env_overrides.insert("CUDA_VISIBLE_DEVICES".to_string(), device_id.to_string());
    env_overrides.insert("PYTHONUNBUFFERED".to_string(), "1".to_string());
    if std::env::var_os("TRITON_HOME").is_none() {
        env_overrides.insert("TRITON_HOME".to_string(), "/tmp".to_string());
    }

    BuiltCommand {
        program: record.script_path.clone(),
        args,
        env_overrides,
        cwd: scripts_dir,
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
