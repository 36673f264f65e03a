// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Tool dependency installation.

use crate::syscall::{syscall_non_interactive, SyscallError};

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};
use tracing::{debug, instrument};

/// Install dependencies declared by a manifest file.
pub trait DependencyInstaller {
    fn install(&self, manifest: &Path) -> Result<()>;
}

/// Dependency installation through pip of the tool runtime.
///
/// Runs `<runtime> -m pip install -r <manifest>` and waits for it to finish.
#[derive(Debug, Clone)]
pub struct PipInstaller {
    runtime: OsString,
}

impl PipInstaller {
    /// Construct new pip installer driven by target runtime.
    pub fn new(runtime: impl Into<OsString>) -> Self {
        Self {
            runtime: runtime.into(),
        }
    }

    fn args(&self, manifest: &Path) -> Vec<OsString> {
        vec![
            "-m".into(),
            "pip".into(),
            "install".into(),
            "-r".into(),
            manifest.as_os_str().to_os_string(),
        ]
    }
}

impl DependencyInstaller for PipInstaller {
    #[instrument(skip(self, manifest), level = "debug")]
    fn install(&self, manifest: &Path) -> Result<()> {
        let output = syscall_non_interactive(&self.runtime, self.args(manifest)).map_err(|err| {
            DependencyError {
                source: err,
                manifest: manifest.to_path_buf(),
            }
        })?;
        debug!("{output}");

        Ok(())
    }
}

/// Dependency installation failed.
#[derive(Debug, thiserror::Error)]
#[error("failed to install dependencies from {manifest:?}")]
pub struct DependencyError {
    #[source]
    pub source: SyscallError,
    pub manifest: PathBuf,
}

/// Friendly result alias :3
pub type Result<T, E = DependencyError> = std::result::Result<T, E>;
