// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Installer settings.
//!
//! Everything the installer needs to know up front is gathered into one
//! immutable [`InstallerSettings`] value. It is constructed once at startup,
//! and handed to whoever needs it.

use crate::{
    catalog::ToolCatalog,
    credential::Credential,
    path::{default_install_root, NoWayHome},
};

use semver::VersionReq;
use std::{ffi::OsString, path::PathBuf, time::Duration};

/// Default program used to run tools and install their dependencies.
#[cfg(not(windows))]
pub const DEFAULT_RUNTIME: &str = "python3";

/// Default program used to run tools and install their dependencies.
#[cfg(windows)]
pub const DEFAULT_RUNTIME: &str = "python";

/// Endpoint probed to check network reachability.
pub const DEFAULT_PROBE_URL: &str = "https://github.com";

/// Oldest runtime version the toolchain supports.
pub const DEFAULT_RUNTIME_REQUIREMENT: &str = ">=3.8";

/// Installer settings.
#[derive(Debug, Clone)]
pub struct InstallerSettings {
    /// Directory all tools and generated artifacts are placed under.
    pub install_root: PathBuf,

    /// Program used to run tools and install their dependencies.
    pub runtime: OsString,

    /// Version the runtime must satisfy.
    pub runtime_requirement: VersionReq,

    /// Endpoint probed for network reachability.
    pub probe_url: String,

    /// How long to wait on the network probe.
    pub probe_timeout: Duration,

    /// Credential the installation password must match.
    pub credential: Credential,

    /// Tools to install, in order.
    pub catalog: ToolCatalog,
}

impl InstallerSettings {
    /// Construct new settings for a target install root.
    ///
    /// Uses the builtin credential and tool catalog.
    pub fn new(install_root: impl Into<PathBuf>) -> Self {
        Self {
            install_root: install_root.into(),
            runtime: DEFAULT_RUNTIME.into(),
            runtime_requirement: builtin_requirement(),
            probe_url: DEFAULT_PROBE_URL.into(),
            probe_timeout: Duration::from_secs(10),
            credential: Credential::builtin(),
            catalog: ToolCatalog::builtin(),
        }
    }

    /// Construct new settings using the default install root.
    ///
    /// # Errors
    ///
    /// - Return [`NoWayHome`] if home directory cannot be determined.
    pub fn try_default() -> Result<Self, NoWayHome> {
        Ok(Self::new(default_install_root()?))
    }

    /// Replace runtime program.
    pub fn with_runtime(mut self, runtime: impl Into<OsString>) -> Self {
        self.runtime = runtime.into();
        self
    }

    /// Replace tool catalog.
    pub fn with_catalog(mut self, catalog: ToolCatalog) -> Self {
        self.catalog = catalog;
        self
    }
}

fn builtin_requirement() -> VersionReq {
    // INVARIANT: Constant requirement always parses.
    VersionReq::parse(DEFAULT_RUNTIME_REQUIREMENT).unwrap_or(VersionReq::STAR)
}
