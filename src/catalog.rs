// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Tool catalog.
//!
//! The ccgj toolchain is made up of nine external tools. Each tool is
//! described by a [`ToolDescriptor`] that says where its repository lives,
//! and where it should be placed under the install root. The full listing
//! is fixed at build time through [`ToolCatalog::builtin`].
//!
//! # Tool Layout
//!
//! Every installed tool is expected to follow the same layout relative to
//! its own directory:
//!
//! - `requirements.txt`: optional dependency manifest.
//! - `src/main.py`: entry point executed by the launchers.
//!
//! The install path of a tool doubles as its symbolic command name, e.g.,
//! `ccgj launch specflow` runs the tool installed at `<root>/specflow`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Relative path to dependency manifest inside of a tool directory.
pub const DEPENDENCY_MANIFEST: &str = "requirements.txt";

/// Relative path to entry point inside of a tool directory.
pub const ENTRY_POINT: [&str; 2] = ["src", "main.py"];

const BUILTIN_TOOLS: [(&str, &str, &str, &str); 9] = [
    ("gongju0", "Orchestrator", "Chief Architect", "orchestrator"),
    ("gongju1", "SpecFlow", "Requirements Tool", "specflow"),
    ("gongju2", "TechFlow", "Design Tool", "techflow"),
    ("gongju3", "CodeFlow", "Code Generation", "codeflow"),
    ("gongju4", "TestFlow", "Testing Tool", "testflow"),
    ("gongju5", "ReviewFlow", "Code Review", "reviewflow"),
    ("gongju6", "DocFlow", "Documentation", "docflow"),
    ("gongju7", "DeployFlow", "Deployment", "deployflow"),
    ("gongju8", "FixFlow", "Auto Fix", "fixflow"),
];

const REPOSITORY_BASE: &str = "https://github.com/feizaiguai";

/// Static metadata of one installable tool.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct ToolDescriptor {
    /// Unique identifier of tool, e.g., "gongju1".
    pub id: String,

    /// Human readable name of tool.
    pub name: String,

    /// Brief description of what the tool does.
    pub description: String,

    /// Remote URL to clone tool from.
    pub repository: String,

    /// Path relative to install root, also used as command name.
    pub install_path: String,
}

impl ToolDescriptor {
    /// Construct new tool descriptor.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        repository: impl Into<String>,
        install_path: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            repository: repository.into(),
            install_path: install_path.into(),
        }
    }

    /// Symbolic command name used by the launchers.
    pub fn command(&self) -> &str {
        self.install_path.as_str()
    }

    /// Absolute directory of tool under target install root.
    pub fn directory(&self, install_root: impl AsRef<Path>) -> PathBuf {
        install_root.as_ref().join(&self.install_path)
    }

    /// Absolute path to entry point of tool under target install root.
    pub fn entry_point(&self, install_root: impl AsRef<Path>) -> PathBuf {
        ENTRY_POINT
            .iter()
            .fold(self.directory(install_root), |path, part| path.join(part))
    }

    /// Absolute path to dependency manifest of tool under target install root.
    pub fn manifest(&self, install_root: impl AsRef<Path>) -> PathBuf {
        self.directory(install_root).join(DEPENDENCY_MANIFEST)
    }
}

/// Ordered listing of tools to install.
///
/// # Invariant
///
/// - Declaration order is install order.
#[derive(Default, Debug, PartialEq, Eq, Clone)]
pub struct ToolCatalog {
    tools: Vec<ToolDescriptor>,
}

impl ToolCatalog {
    /// Construct new catalog from a listing of tools.
    pub fn new(tools: impl IntoIterator<Item = ToolDescriptor>) -> Self {
        Self {
            tools: tools.into_iter().collect(),
        }
    }

    /// The nine tools of the ccgj toolchain.
    pub fn builtin() -> Self {
        Self::new(
            BUILTIN_TOOLS
                .iter()
                .map(|(id, name, description, install_path)| {
                    ToolDescriptor::new(
                        *id,
                        *name,
                        *description,
                        format!("{REPOSITORY_BASE}/{id}.git"),
                        *install_path,
                    )
                }),
        )
    }

    /// Find tool by its command name, ignoring case.
    pub fn find(&self, command: impl AsRef<str>) -> Option<&ToolDescriptor> {
        let command = command.as_ref().to_lowercase();
        self.tools.iter().find(|tool| tool.command() == command)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn as_slice(&self) -> &[ToolDescriptor] {
        self.tools.as_slice()
    }
}

impl<'a> IntoIterator for &'a ToolCatalog {
    type Item = &'a ToolDescriptor;
    type IntoIter = std::slice::Iter<'a, ToolDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.tools.iter()
    }
}
