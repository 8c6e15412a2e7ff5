// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The synchronous design-run operation: unlike `submit`, this bypasses the
//! queue entirely and blocks the calling thread until the child exits,
//! streaming its stdout/stderr into memory rather than a log file.

use crate::context::ServerContext;
use crate::protocol::{validate_protocol, RunRequest, RunResponse, RunStatistics};
use boltzq_queue::inspector;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

const STDOUT_TAIL_CHARS: usize = 3000;
const STDERR_TAIL_CHARS: usize = 2000;
const INTERRUPTED_EXIT_CODE: i32 = 130;
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_sigint(_signum: libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

pub fn run(ctx: &ServerContext, req: RunRequest) -> RunResponse {
    if let Err(message) = validate_protocol(&req.protocol) {
        return error_response(req.output.clone(), message);
    }
    if std::fs::metadata(&req.config).is_err() {
        return error_response(req.output.clone(), format!("Config file not found: {}", req.config));
    }
    if let Err(err) = std::fs::create_dir_all(&req.output) {
        return error_response(req.output.clone(), format!("Failed to create output directory: {err}"));
    }

    let mut command = Command::new(ctx.design_script_path());
    command
        .arg("--config")
        .arg(&req.config)
        .arg("--output")
        .arg(&req.output)
        .arg("--protocol")
        .arg(&req.protocol)
        .arg("--num_designs")
        .arg(req.num_designs.to_string())
        .arg("--budget")
        .arg(req.budget.to_string())
        .current_dir(&ctx.scripts_dir)
        .env("PYTHONUNBUFFERED", "1")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if std::env::var_os("TRITON_HOME").is_none() {
        command.env("TRITON_HOME", "/tmp");
    }
    if let Some(device) = &req.cuda_device {
        command.env("CUDA_VISIBLE_DEVICES", device);
    }
    detach(&mut command);

    debug!(config = %req.config, output = %req.output, "launching synchronous design run");

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(err) => return error_response(req.output.clone(), format!("Failed to launch design process: {err}")),
    };
    let pid = child.id();

    let stdout_handle = child.stdout.take().map(|pipe| thread::spawn(move || collect_lines(pipe, "stdout")));
    let stderr_handle = child.stderr.take().map(|pipe| thread::spawn(move || collect_lines(pipe, "stderr")));

    INTERRUPTED.store(false, Ordering::SeqCst);
    install_sigint_handler();
    let (status, interrupted) = wait_for_exit(&mut child, pid);
    restore_sigint_handler();

    let stdout = join_reader(stdout_handle);
    let stderr = join_reader(stderr_handle);

    let return_code = if interrupted {
        INTERRUPTED_EXIT_CODE
    } else {
        match status {
            Ok(status) => status.code().unwrap_or(-1),
            Err(err) => return error_response(req.output.clone(), format!("Failed waiting for design process: {err}")),
        }
    };

    info!(return_code, interrupted, output = %req.output, "design run finished");

    let artifacts = inspector::scan_artifacts(Path::new(&req.output));
    let statistics = RunStatistics {
        total_designs: artifacts.total_designs(),
        pdb_files: artifacts
            .pdb_files
            .iter()
            .take(20)
            .map(|p| p.to_string_lossy().into_owned())
            .collect(),
    };

    RunResponse {
        status: if return_code == 0 { "success".to_string() } else { "error".to_string() },
        output_dir: req.output,
        config: Some(req.config),
        protocol: Some(req.protocol),
        num_designs: Some(req.num_designs),
        budget: Some(req.budget),
        cuda_device: req.cuda_device,
        statistics: Some(statistics),
        return_code: Some(return_code),
        stdout_preview: Some(tail_chars(&stdout, STDOUT_TAIL_CHARS)),
        stderr_preview: Some(tail_chars(&stderr, STDERR_TAIL_CHARS)),
        error_message: if return_code == 0 {
            None
        } else if interrupted {
            Some("Interrupted: design process terminated".to_string())
        } else {
            Some(format!("Design process exited with code {return_code}"))
        },
    }
}

/// Place the child in its own process group so a SIGINT delivered to this
/// process (e.g. a Ctrl-C at the terminal) does not also reach the child via
/// the shared foreground process group before `wait_for_exit` gets a chance
/// to terminate it in an orderly way.
#[cfg(unix)]
fn detach(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    command.process_group(0);
}

#[cfg(not(unix))]
fn detach(_command: &mut Command) {}

#[cfg(unix)]
fn install_sigint_handler() {
    unsafe {
        libc::signal(libc::SIGINT, on_sigint as libc::sighandler_t);
    }
}

#[cfg(not(unix))]
fn install_sigint_handler() {}

#[cfg(unix)]
fn restore_sigint_handler() {
    unsafe {
        libc::signal(libc::SIGINT, libc::SIG_DFL);
    }
}

#[cfg(not(unix))]
fn restore_sigint_handler() {}

/// Poll the child non-blockingly so an interrupt observed mid-wait can be
/// turned into a termination request rather than leaving the process to be
/// killed by the same signal with no structured response. Escalation beyond
/// one `SIGTERM` is not attempted, matching `SupervisedProcess::terminate`.
fn wait_for_exit(child: &mut Child, pid: u32) -> (std::io::Result<std::process::ExitStatus>, bool) {
    let mut signalled = false;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return (Ok(status), signalled),
            Ok(None) => {
                if INTERRUPTED.load(Ordering::SeqCst) && !signalled {
                    signalled = true;
                    terminate_process_group(pid);
                }
                thread::sleep(WAIT_POLL_INTERVAL);
            }
            Err(err) => return (Err(err), signalled),
        }
    }
}

#[cfg(unix)]
fn terminate_process_group(pid: u32) {
    // SAFETY: `pid` is the id of a child this process just spawned into its
    // own process group via `detach`; signalling the negated pid targets
    // that whole group with SIGTERM.
    let result = unsafe { libc::kill(-(pid as libc::pid_t), libc::SIGTERM) };
    if result != 0 {
        warn!(pid, error = %std::io::Error::last_os_error(), "failed to signal interrupted design process");
    }
}

#[cfg(not(unix))]
fn terminate_process_group(_pid: u32) {}

fn join_reader(handle: Option<thread::JoinHandle<String>>) -> String {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

/// Drain one stream to completion on its own thread, line-buffered, and
/// return the accumulated text. Runs concurrently with `wait_for_exit` so
/// neither pipe's OS buffer can fill up and deadlock the child while the
/// other is read; truncation to the caller-facing tail only happens once
/// this has returned, so it never clips mid-line.
fn collect_lines(pipe: impl std::io::Read, prefix: &str) -> String {
    let mut buf = String::new();
    let reader = BufReader::new(pipe);
    for line in reader.lines().map_while(Result::ok) {
        if line.is_empty() {
            continue;
        }
        debug!(stream = prefix, "{line}");
        buf.push_str(&line);
        buf.push('\n');
    }
    buf
}

fn tail_chars(s: &str, max_chars: usize) -> String {
    let total = s.chars().count();
    if total <= max_chars {
        s.to_string()
    } else {
        s.chars().skip(total - max_chars).collect()
    }
}

fn error_response(output_dir: String, message: String) -> RunResponse {
    RunResponse {
        status: "error".to_string(),
        output_dir,
        config: None,
        protocol: None,
        num_designs: None,
        budget: None,
        cuda_device: None,
        statistics: None,
        return_code: None,
        stdout_preview: None,
        stderr_preview: None,
        error_message: Some(message),
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
