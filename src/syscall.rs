// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! External process invocation.
//!
//! Every external program the installer depends on, e.g., the Git binary,
//! the tool runtime, or the dependency installer, is run through these
//! helpers. All calls block the current thread until the child exits. No
//! timeout is applied.

use std::{
    ffi::{OsStr, OsString},
    path::Path,
    process::{Command, ExitStatus},
};
use tracing::{debug, instrument};

/// Run program with captured output.
///
/// Standard output and standard error are merged into one [`String`] that is
/// returned on success, or attached to the error on failure.
///
/// # Errors
///
/// - Return [`SyscallError::Spawn`] if program cannot be started.
/// - Return [`SyscallError::Failed`] if program exits with non-zero status.
#[instrument(skip(cmd, args), level = "debug")]
pub fn syscall_non_interactive(
    cmd: impl AsRef<OsStr>,
    args: impl IntoIterator<Item = impl AsRef<OsStr>>,
) -> Result<String> {
    let program = cmd.as_ref().to_os_string();
    let args = args
        .into_iter()
        .map(|arg| arg.as_ref().to_os_string())
        .collect::<Vec<_>>();
    debug!("run {program:?} {args:?}");

    let output = Command::new(&program)
        .args(&args)
        .output()
        .map_err(|err| SyscallError::Spawn {
            source: err,
            program: program.clone(),
        })?;
    let stdout = String::from_utf8_lossy(output.stdout.as_slice()).into_owned();
    let stderr = String::from_utf8_lossy(output.stderr.as_slice()).into_owned();
    let mut message = String::new();

    if !stdout.is_empty() {
        message.push_str(stdout.as_str());
    }

    if !stderr.is_empty() {
        message.push_str(stderr.as_str());
    }

    let message = message.trim_end().to_string();

    if !output.status.success() {
        return Err(SyscallError::Failed {
            program,
            status: output.status,
            message,
        });
    }

    Ok(message)
}

/// Run program with inherited standard streams.
///
/// Blocks until child exits, and hands back its exit status untouched so the
/// caller can propagate it.
///
/// # Errors
///
/// - Return [`SyscallError::Spawn`] if program cannot be started or waited on.
#[instrument(skip(cmd, args, cwd), level = "debug")]
pub fn syscall_interactive(
    cmd: impl AsRef<OsStr>,
    args: impl IntoIterator<Item = impl AsRef<OsStr>>,
    cwd: impl AsRef<Path>,
) -> Result<ExitStatus> {
    let program = cmd.as_ref().to_os_string();
    debug!("spawn {program:?} in {}", cwd.as_ref().display());

    Command::new(&program)
        .args(args)
        .current_dir(cwd.as_ref())
        .spawn()
        .and_then(|mut child| child.wait())
        .map_err(|err| SyscallError::Spawn {
            source: err,
            program,
        })
}

/// External process error types.
#[derive(Debug, thiserror::Error)]
pub enum SyscallError {
    /// Program could not be started.
    #[error("failed to run {program:?}")]
    Spawn {
        #[source]
        source: std::io::Error,
        program: OsString,
    },

    /// Program ran, but reported failure.
    #[error("command {program:?} failed ({status}):\n{message}")]
    Failed {
        program: OsString,
        status: ExitStatus,
        message: String,
    },
}

/// Friendly result alias :3
pub type Result<T, E = SyscallError> = std::result::Result<T, E>;

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn non_interactive_merges_output() -> anyhow::Result<()> {
        let result = syscall_non_interactive("sh", ["-c", "echo out; echo err 1>&2"])?;
        assert_eq!(result, "out\nerr");
        Ok(())
    }

    #[test]
    fn non_interactive_reports_non_zero_exit() {
        let result = syscall_non_interactive("sh", ["-c", "echo broken; exit 3"]);
        match result {
            Err(SyscallError::Failed {
                status, message, ..
            }) => {
                assert_eq!(status.code(), Some(3));
                assert_eq!(message, "broken");
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn non_interactive_reports_missing_program() {
        let result = syscall_non_interactive("ccgj-definitely-not-a-program", ["--version"]);
        assert!(matches!(result, Err(SyscallError::Spawn { .. })));
    }

    #[test]
    fn interactive_propagates_exit_status() -> anyhow::Result<()> {
        let cwd = tempfile::tempdir()?;
        let status = syscall_interactive("sh", ["-c", "exit 7"], cwd.path())?;
        assert_eq!(status.code(), Some(7));
        Ok(())
    }
}
