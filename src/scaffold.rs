// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Placeholder entry points.
//!
//! Not every tool repository ships an entry point. The launchers expect one
//! at `src/main.py` regardless, so a stub is written in its place that just
//! announces the tool. An entry point that already exists is never touched.

use crate::catalog::ToolDescriptor;

use indoc::formatdoc;
use std::{
    fs::{create_dir_all, write},
    path::{Path, PathBuf},
};
use tracing::{debug, instrument};

/// Write placeholder entry point for tool if it has none.
///
/// Returns `true` if a placeholder was written, `false` if an entry point was
/// already present.
///
/// # Errors
///
/// - Return [`ScaffoldError`] if parent directories or the file itself
///   cannot be created.
#[instrument(skip(tool, install_root), fields(tool = %tool.id), level = "debug")]
pub fn scaffold_entry_point(tool: &ToolDescriptor, install_root: impl AsRef<Path>) -> Result<bool> {
    let entry_point = tool.entry_point(install_root);
    if entry_point.exists() {
        debug!("keep existing entry point {}", entry_point.display());
        return Ok(false);
    }

    if let Some(parent) = entry_point.parent() {
        create_dir_all(parent).map_err(|err| ScaffoldError {
            source: err,
            path: parent.to_path_buf(),
        })?;
    }

    write(&entry_point, placeholder(tool)).map_err(|err| ScaffoldError {
        source: err,
        path: entry_point.clone(),
    })?;
    debug!("wrote placeholder entry point {}", entry_point.display());

    Ok(true)
}

/// Contents of placeholder entry point for tool.
pub fn placeholder(tool: &ToolDescriptor) -> String {
    let banner = format!("ccgj {} - {}", tool.name, tool.description);
    formatdoc! {r#"
        #!/usr/bin/env python3
        """
        ccgj {name} main module
        """


        def main():
            print({banner:?})
            print("Tool is ready to use")


        if __name__ == "__main__":
            main()
        "#,
        name = tool.name,
        banner = banner,
    }
}

/// Placeholder entry point could not be written.
#[derive(Debug, thiserror::Error)]
#[error("failed to scaffold entry point at {path:?}")]
pub struct ScaffoldError {
    #[source]
    pub source: std::io::Error,
    pub path: PathBuf,
}

/// Friendly result alias :3
pub type Result<T, E = ScaffoldError> = std::result::Result<T, E>;
