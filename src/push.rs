//! Pushing the staged sleep screen to the tablet.
//!
//! The [`DevicePusher`] trait is the only thing the rest of the crate knows
//! about remote transfer. The production implementation, [`SshPusher`],
//! shells out to existing tools rather than speaking SSH itself:
//!
//! | Step | Tool | Command |
//! |---|---|---|
//! | Probe | `ping` | one echo request with a timeout |
//! | Prepare | `plink` | `mount -o remount,rw / && mkdir -p <dir> && chmod 755 <dir>` |
//! | Copy | `pscp` | `<file>` → `root@<ip>:<dir>/<name>` |
//!
//! `plink` and `pscp` are looked up in `PUTTY_PATH`. Both run with `-batch`,
//! so the tablet's host key must already be cached (connect once
//! interactively).
//!
//! Process execution sits behind [`CommandRunner`] so the step sequence can
//! be tested without a tablet.

use crate::device::DeviceConfig;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum PushError {
    #[error("file to push {} does not exist", .0.display())]
    FileNotFound(PathBuf),
    #[error("device {host} is not reachable (no ping reply)")]
    Unreachable { host: String },
    #[error("failed to start {program}: {source}")]
    Spawn { program: String, source: io::Error },
    #[error("{step} failed (exit code {}): {stderr}", code.map_or("none".to_string(), |c| c.to_string()))]
    CommandFailed {
        step: PushStep,
        code: Option<i32>,
        stderr: String,
    },
}

/// The three stages of a push, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushStep {
    Probe,
    Prepare,
    Copy,
}

impl std::fmt::Display for PushStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Probe => "reachability probe",
            Self::Prepare => "remote prepare",
            Self::Copy => "file copy",
        })
    }
}

/// Exit status and captured stderr of a finished command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stderr: String,
}

/// Runs an external program to completion.
pub trait CommandRunner {
    fn run(&self, program: &Path, args: &[String]) -> io::Result<CommandOutput>;
}

/// [`CommandRunner`] backed by `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &Path, args: &[String]) -> io::Result<CommandOutput> {
        let output = Command::new(program).args(args).output()?;
        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Sends a file to the tablet.
pub trait DevicePusher {
    fn push(&self, file: &Path, config: &DeviceConfig) -> Result<(), PushError>;
}

/// [`DevicePusher`] that drives `ping`, `plink` and `pscp`.
pub struct SshPusher<R = SystemRunner> {
    runner: R,
    ping_timeout: Duration,
}

impl SshPusher<SystemRunner> {
    pub fn new(ping_timeout: Duration) -> Self {
        Self::with_runner(SystemRunner, ping_timeout)
    }
}

impl<R: CommandRunner> SshPusher<R> {
    pub fn with_runner(runner: R, ping_timeout: Duration) -> Self {
        Self {
            runner,
            ping_timeout,
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    fn exec(&self, step: PushStep, program: &Path, args: &[String]) -> Result<(), PushError> {
        debug!(%step, program = %program.display(), args = ?redact(args), "running");
        let output = self
            .runner
            .run(program, args)
            .map_err(|source| PushError::Spawn {
                program: program.display().to_string(),
                source,
            })?;
        if output.success {
            return Ok(());
        }
        Err(match step {
            PushStep::Probe => PushError::Unreachable {
                host: args.last().cloned().unwrap_or_default(),
            },
            _ => PushError::CommandFailed {
                step,
                code: output.code,
                stderr: output.stderr,
            },
        })
    }
}

impl<R: CommandRunner> DevicePusher for SshPusher<R> {
    fn push(&self, file: &Path, config: &DeviceConfig) -> Result<(), PushError> {
        if !file.is_file() {
            return Err(PushError::FileNotFound(file.to_path_buf()));
        }

        info!(host = %config.ip, "probing device");
        self.exec(
            PushStep::Probe,
            Path::new("ping"),
            &ping_args(&config.ip, self.ping_timeout),
        )?;

        info!(dir = %config.destination_dir, "preparing remote directory");
        self.exec(
            PushStep::Prepare,
            &tool_path(&config.putty_dir, "plink"),
            &plink_args(config),
        )?;

        info!(remote = %config.remote_path(), "copying");
        self.exec(
            PushStep::Copy,
            &tool_path(&config.putty_dir, "pscp"),
            &pscp_args(file, config),
        )?;

        info!(host = %config.ip, "push complete");
        Ok(())
    }
}

/// Path to a PuTTY tool, with `.exe` appended on Windows.
pub fn tool_path(dir: &Path, tool: &str) -> PathBuf {
    dir.join(format!("{tool}{}", std::env::consts::EXE_SUFFIX))
}

/// Arguments for a single ping with `timeout`. The host is always last.
pub fn ping_args(host: &str, timeout: Duration) -> Vec<String> {
    let mut args = if cfg!(windows) {
        vec![
            "-n".to_string(),
            "1".to_string(),
            "-w".to_string(),
            timeout.as_millis().max(1).to_string(),
        ]
    } else if cfg!(target_os = "macos") {
        // BSD ping takes `-W` in milliseconds.
        vec![
            "-c".to_string(),
            "1".to_string(),
            "-W".to_string(),
            timeout.as_millis().max(1).to_string(),
        ]
    } else {
        vec![
            "-c".to_string(),
            "1".to_string(),
            "-W".to_string(),
            timeout.as_secs().max(1).to_string(),
        ]
    };
    args.push(host.to_string());
    args
}

/// Shell command run on the tablet before copying.
///
/// The root filesystem is mounted read-only by default; it has to be
/// remounted before the destination directory can be created.
pub fn remote_prepare_command(destination_dir: &str) -> String {
    let dir = shell_quote(destination_dir);
    format!("mount -o remount,rw / && mkdir -p {dir} && chmod 755 {dir}")
}

fn plink_args(config: &DeviceConfig) -> Vec<String> {
    vec![
        "-ssh".to_string(),
        "-batch".to_string(),
        "-pw".to_string(),
        config.password.clone(),
        format!("root@{}", config.ip),
        remote_prepare_command(&config.destination_dir),
    ]
}

fn pscp_args(file: &Path, config: &DeviceConfig) -> Vec<String> {
    vec![
        "-scp".to_string(),
        "-batch".to_string(),
        "-pw".to_string(),
        config.password.clone(),
        file.display().to_string(),
        format!("root@{}:{}", config.ip, config.remote_path()),
    ]
}

/// Single-quote for a POSIX shell unless the value is plainly safe.
fn shell_quote(s: &str) -> String {
    let safe = !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-+".contains(c));
    if safe {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', r"'\''"))
    }
}

/// Copy of `args` with the value following `-pw` masked.
pub fn redact(args: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(args.len());
    let mut mask_next = false;
    for arg in args {
        if mask_next {
            out.push("***".to_string());
        } else {
            out.push(arg.clone());
        }
        mask_next = arg == "-pw";
    }
    out
}
