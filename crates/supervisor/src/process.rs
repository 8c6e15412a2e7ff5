// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Launching, polling, and terminating the external design-process child.

use crate::command::BuiltCommand;
use crate::SupervisorError;
use parking_lot::Mutex;
use std::fs::File;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use tracing::{info, warn};

/// A handle to a launched child process. Exposes only `poll` and
/// `terminate` — escalation to a forceful kill is explicitly out of scope.
///
/// The child is held behind a mutex so both operations take `&self`: the
/// queue's running map holds these by shared reference while the worker
/// loop reaps and a cancelling caller terminates, without needing `&mut`
/// access to the map entry.
pub struct SupervisedProcess {
    child: Mutex<Child>,
    pub pid: u32,
}

/// Launch `built` with stdout+stderr merged into `log_path`, in a new
/// session so cancellation signals can target it without racing the
/// supervisor.
pub fn spawn(built: &BuiltCommand, log_path: &Path) -> Result<SupervisedProcess, SupervisorError> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let log_file = File::create(log_path)?;
    let stderr_file = log_file.try_clone()?;

    let mut command = Command::new(&built.program);
    command
        .args(&built.args)
        .current_dir(&built.cwd)
        .envs(&built.env_overrides)
        .stdin(Stdio::null())
        .stdout(Stdio::from(log_file))
        .stderr(Stdio::from(stderr_file));

    detach(&mut command);

    let child = command.spawn()?;
    let pid = child.id();
    info!(pid, program = %built.program, "spawned design process");
    Ok(SupervisedProcess {
        child: Mutex::new(child),
        pid,
    })
}

#[cfg(unix)]
fn detach(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    // Detach into a new session/process group so a SIGTERM to this pid
    // alone does not race the supervisor's own process group.
    command.process_group(0);
}

#[cfg(not(unix))]
fn detach(_command: &mut Command) {}

/// The outcome of a finished process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    Success,
    Failure(i32),
}

impl SupervisedProcess {
    /// Non-blocking check for exit. Returns `None` if still running.
    pub fn poll(&self) -> Result<Option<ExitOutcome>, SupervisorError> {
        match self.child.lock().try_wait()? {
            Some(status) => {
                let outcome = match status.code() {
                    Some(0) => ExitOutcome::Success,
                    Some(code) => ExitOutcome::Failure(code),
                    // Terminated by signal: treated as a non-zero, non-reportable exit.
                    None => ExitOutcome::Failure(-1),
                };
                Ok(Some(outcome))
            }
            None => Ok(None),
        }
    }

    /// Send a polite termination signal. Escalation to SIGKILL is not
    /// performed — this is a single-step request to exit cleanly.
    #[cfg(unix)]
    pub fn terminate(&self) -> Result<(), SupervisorError> {
        // SAFETY: `pid` is a valid process id obtained from `Child::id` for
        // a process this struct owns; signalling it with SIGTERM is the
        // documented way to request a polite shutdown.
        let result = unsafe { libc::kill(self.pid as libc::pid_t, libc::SIGTERM) };
        if result != 0 {
            let err = std::io::Error::last_os_error();
            warn!(pid = self.pid, error = %err, "terminate signal failed");
            return Err(SupervisorError::Io(err));
        }
        Ok(())
    }

    #[cfg(not(unix))]
    pub fn terminate(&self) -> Result<(), SupervisorError> {
        self.child.lock().kill().map_err(SupervisorError::Io)
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
