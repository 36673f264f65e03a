// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout of the configuration file that ccgj persists at the
//! end of a successful install, to simplify the process of serialization and
//! deserialization. The launcher reads it back to find installed tools.

use crate::{
    catalog::{ToolCatalog, ToolDescriptor},
    path::config_path,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    fs::{read_to_string, write},
    path::{Path, PathBuf},
    str::FromStr,
};

/// Persisted record of a completed install.
///
/// # General Layout
///
/// The top-level holds install metadata: the installer version, when the
/// install finished, the digest of the installation credential, and where
/// the toolchain was installed to. Each installed tool follows as its own
/// `[[tool]]` table in install order.
///
/// Only the credential digest is stored, never the plaintext secret.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct Configuration {
    /// Version of installer that wrote this configuration.
    pub version: String,

    /// Time install completed.
    pub installed_at: DateTime<Utc>,

    /// SHA-256 digest of installation credential.
    pub credential_hash: String,

    /// Install root of toolchain.
    pub install_directory: PathBuf,

    /// Installed tools.
    #[serde(rename = "tool", default)]
    pub tools: Vec<ToolDescriptor>,
}

impl Configuration {
    /// Construct new configuration stamped with current time.
    pub fn new(
        install_directory: impl Into<PathBuf>,
        credential_hash: impl Into<String>,
        catalog: &ToolCatalog,
    ) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").into(),
            installed_at: Utc::now(),
            credential_hash: credential_hash.into(),
            install_directory: install_directory.into(),
            tools: catalog.iter().cloned().collect(),
        }
    }

    /// Load configuration from install root.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Read`] if file cannot be read.
    /// - Return [`ConfigError::Deserialize`] if file is malformed.
    /// - Return [`ConfigError::ShellExpansion`] if install directory cannot be
    ///   expanded.
    pub fn load(install_root: impl AsRef<Path>) -> Result<Self> {
        let path = config_path(install_root);
        read_to_string(&path)
            .map_err(|err| ConfigError::Read { source: err, path })?
            .parse()
    }

    /// Save configuration to install root, replacing any existing one.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Serialize`] if configuration cannot be
    ///   serialized.
    /// - Return [`ConfigError::Write`] if file cannot be written.
    pub fn save(&self, install_root: impl AsRef<Path>) -> Result<PathBuf> {
        let path = config_path(install_root);
        let contents = toml::to_string_pretty(self)?;
        write(&path, contents).map_err(|err| ConfigError::Write {
            source: err,
            path: path.clone(),
        })?;

        Ok(path)
    }

    /// Catalog of installed tools.
    pub fn catalog(&self) -> ToolCatalog {
        ToolCatalog::new(self.tools.iter().cloned())
    }
}

impl FromStr for Configuration {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut configuration: Configuration = toml::from_str(data)?;

        // INVARIANT: Perform shell expansion on install directory field.
        configuration.install_directory = PathBuf::from(
            shellexpand::full(configuration.install_directory.to_string_lossy().as_ref())?
                .into_owned(),
        );

        Ok(configuration)
    }
}

impl Display for Configuration {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),

    /// Failed to read configuration file.
    #[error("failed to read configuration file {path:?}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Failed to write configuration file.
    #[error("failed to write configuration file {path:?}")]
    Write {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;
