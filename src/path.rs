// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine where the toolchain lives on the user's file system, and where
//! each generated artifact goes inside of it.

use std::path::{Path, PathBuf};

/// Name of persisted configuration file at top-level of install root.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Name of master launcher script at top-level of install root.
pub const MASTER_LAUNCHER_FILE_NAME: &str = "ccgj.py";

/// Name of platform specific shell launcher at top-level of install root.
#[cfg(unix)]
pub const SHELL_LAUNCHER_FILE_NAME: &str = "ccgj.sh";

/// Name of platform specific shell launcher at top-level of install root.
#[cfg(not(unix))]
pub const SHELL_LAUNCHER_FILE_NAME: &str = "ccgj.bat";

/// Determine absolute path to user's home directory.
///
/// Does not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or(NoWayHome)
}

/// Determine default absolute path to install root.
///
/// Uses `$HOME/ccgj` as the default install root. Does not check if the path
/// returned actually exists.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn default_install_root() -> Result<PathBuf> {
    home_dir().map(|path| path.join("ccgj"))
}

/// Path to persisted configuration file under an install root.
pub fn config_path(install_root: impl AsRef<Path>) -> PathBuf {
    install_root.as_ref().join(CONFIG_FILE_NAME)
}

/// No way to determine user's home directory.
///
/// # See Also
///
/// - [`dirs::home_dir`](https://docs.rs/dirs/latest/dirs/fn.home_dir.html)
#[derive(Clone, Debug, thiserror::Error)]
#[error("cannot determine absolute path to user's home directory")]
pub struct NoWayHome;

/// Friendly result alias :3
pub type Result<T, E = NoWayHome> = std::result::Result<T, E>;
