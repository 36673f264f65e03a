// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Environment checks done before anything gets installed.
//!
//! Three things must hold for an install to go through: the tool runtime is
//! new enough, the Git binary is available, and the network is reachable.
//! Each check either passes, or fails with a [`PreflightError`] whose
//! [`Severity`] decides whether the run may continue.

use crate::{
    settings::InstallerSettings,
    syscall::{syscall_non_interactive, SyscallError},
};

use reqwest::{blocking::Client, StatusCode};
use semver::{Version, VersionReq};
use std::{ffi::OsString, time::Duration};
use tracing::{info, instrument, warn};

/// How bad a failed check is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Report and carry on.
    Warning,

    /// Abort the whole run.
    Fatal,
}

/// Run every environment check in order.
///
/// Warnings are logged and skipped over. The first fatal failure stops the
/// remaining checks.
///
/// # Errors
///
/// - Return first [`PreflightError`] with [`Severity::Fatal`].
#[instrument(skip(settings), level = "debug")]
pub fn run_checks(settings: &InstallerSettings) -> Result<()> {
    info!("checking system environment");
    escalate(check_runtime(&settings.runtime, &settings.runtime_requirement))?;
    escalate(check_vcs())?;
    escalate(check_network(&settings.probe_url, settings.probe_timeout))?;

    Ok(())
}

fn escalate<T>(check: Result<T>) -> Result<()> {
    match check {
        Ok(_) => Ok(()),
        Err(error) => match error.severity() {
            Severity::Warning => {
                warn!("{error}");
                Ok(())
            }
            Severity::Fatal => Err(error),
        },
    }
}

/// Check tool runtime is installed and satisfies version requirement.
///
/// # Errors
///
/// - Return [`PreflightError::RuntimeMissing`] if runtime cannot be run, or
///   its version cannot be determined.
/// - Return [`PreflightError::RuntimeTooOld`] if runtime version does not
///   match requirement.
pub fn check_runtime(runtime: impl Into<OsString>, requirement: &VersionReq) -> Result<Version> {
    let runtime = runtime.into();
    let output = syscall_non_interactive(&runtime, ["--version"]).map_err(|err| {
        PreflightError::RuntimeMissing {
            runtime: runtime.clone(),
            source: Some(err),
        }
    })?;

    let found =
        parse_runtime_version(&output).ok_or_else(|| PreflightError::RuntimeMissing {
            runtime: runtime.clone(),
            source: None,
        })?;

    let found = ensure_requirement(found, requirement)?;
    info!("runtime version: {found}");
    Ok(found)
}

fn ensure_requirement(found: Version, requirement: &VersionReq) -> Result<Version> {
    if !requirement.matches(&found) {
        return Err(PreflightError::RuntimeTooOld {
            found,
            required: requirement.clone(),
        });
    }

    Ok(found)
}

/// Check Git binary is available.
///
/// # Errors
///
/// - Return [`PreflightError::VcsMissing`] if `git --version` cannot be run
///   or fails.
pub fn check_vcs() -> Result<String> {
    let version = syscall_non_interactive("git", ["--version"])?;
    info!("{version}");
    Ok(version)
}

/// Check network reachability by probing an endpoint.
///
/// # Errors
///
/// - Return [`PreflightError::NetworkDegraded`] if probe answers with any
///   status other than 200.
/// - Return [`PreflightError::NetworkUnreachable`] if probe cannot be sent
///   or times out.
pub fn check_network(url: impl AsRef<str>, timeout: Duration) -> Result<()> {
    let client = Client::builder()
        .timeout(timeout)
        .build()
        .map_err(PreflightError::NetworkUnreachable)?;
    let response = client
        .get(url.as_ref())
        .send()
        .map_err(PreflightError::NetworkUnreachable)?;

    if response.status() != StatusCode::OK {
        return Err(PreflightError::NetworkDegraded(response.status()));
    }

    info!("network connection ok");
    Ok(())
}

/// Extract version from runtime banner, e.g., "Python 3.11.4".
///
/// Missing minor or patch components count as zero. Trailing pre-release
/// tags on a component are ignored.
pub fn parse_runtime_version(output: impl AsRef<str>) -> Option<Version> {
    let token = output
        .as_ref()
        .split_whitespace()
        .find(|token| token.starts_with(|c: char| c.is_ascii_digit()))?;

    let mut parts = token.split('.').map(|part| {
        part.chars()
            .take_while(char::is_ascii_digit)
            .collect::<String>()
            .parse::<u64>()
            .ok()
    });

    let major = parts.next().flatten()?;
    let minor = parts.next().flatten().unwrap_or(0);
    let patch = parts.next().flatten().unwrap_or(0);

    Some(Version::new(major, minor, patch))
}

/// Environment check error types.
#[derive(Debug, thiserror::Error)]
pub enum PreflightError {
    /// Runtime cannot be run or reports no usable version.
    #[error("runtime {runtime:?} not found")]
    RuntimeMissing {
        runtime: OsString,
        #[source]
        source: Option<SyscallError>,
    },

    /// Runtime is older than required.
    #[error("runtime {found} is too old, need {required}")]
    RuntimeTooOld { found: Version, required: VersionReq },

    /// Git binary cannot be run.
    #[error("git is not installed")]
    VcsMissing(#[from] SyscallError),

    /// Network probe failed outright.
    #[error("network connection failed")]
    NetworkUnreachable(#[source] reqwest::Error),

    /// Network probe answered, but not with success.
    #[error("network connection issue: probe answered with {0}")]
    NetworkDegraded(StatusCode),
}

impl PreflightError {
    /// Severity of failed check.
    pub fn severity(&self) -> Severity {
        match self {
            Self::NetworkDegraded(_) => Severity::Warning,
            _ => Severity::Fatal,
        }
    }
}

/// Friendly result alias :3
pub type Result<T, E = PreflightError> = std::result::Result<T, E>;
