// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Toolchain launchers.
//!
//! Once every tool is installed, the toolchain gets two generated launchers
//! at the top-level of the install root:
//!
//! - A master launcher, `ccgj.py`, run through the tool runtime itself so it
//!   works on every platform the runtime does.
//! - A shell launcher for the host platform, `ccgj.sh` on Unix or `ccgj.bat`
//!   on Windows.
//!
//! Both carry the same name to path mapping, and behave the same way. No
//! argument prints help. An unknown name prints an error followed by help. A
//! known name whose directory is missing prints an error. Otherwise the
//! tool's entry point is run as a child process with inherited standard
//! streams, and the launcher exits with the child's exit status.
//!
//! The [`Launcher`] type gives the same behavior natively through
//! `ccgj launch <tool_name>`.

use crate::{
    catalog::{ToolCatalog, ToolDescriptor, ENTRY_POINT},
    path::{MASTER_LAUNCHER_FILE_NAME, SHELL_LAUNCHER_FILE_NAME},
    syscall::{syscall_interactive, SyscallError},
};

use std::{
    ffi::OsString,
    fmt::Write as _,
    fs::write,
    path::{Path, PathBuf},
    process::ExitStatus,
};
use tracing::{info, instrument};

const MASTER_TEMPLATE: &str = r#"#!/usr/bin/env python3
"""
ccgj toolchain launcher

Usage: python ccgj.py <tool_name>
"""

import subprocess
import sys
from pathlib import Path

TOOLS = {
@TOOLS@}


def show_help():
    print(@HELP@)


def main():
    if len(sys.argv) < 2:
        show_help()
        return 0

    tool_name = sys.argv[1].lower()
    if tool_name not in TOOLS:
        print(f"ERROR: Unknown tool: {tool_name}")
        show_help()
        return 1

    tool_dir = Path(__file__).resolve().parent / TOOLS[tool_name]
    if not tool_dir.exists():
        print(f"ERROR: Tool not installed: {tool_name}")
        return 1

    entry_point = tool_dir.joinpath(@ENTRY_POINT@)
    return subprocess.call([sys.executable, str(entry_point)], cwd=str(tool_dir))


if __name__ == "__main__":
    sys.exit(main())
"#;

const SHELL_TEMPLATE: &str = r#"#!/bin/sh
# ccgj toolchain launcher

INSTALL_DIR="$(cd "$(dirname "$0")" && pwd)"
RUNTIME="${CCGJ_RUNTIME:-@RUNTIME@}"

show_help() {
@HELP@}

if [ $# -lt 1 ]; then
    show_help
    exit 0
fi

TOOL_NAME="$(printf '%s' "$1" | tr '[:upper:]' '[:lower:]')"
case "$TOOL_NAME" in
@CASES@    *)
        echo "ERROR: Unknown tool: $TOOL_NAME"
        show_help
        exit 1
        ;;
esac

if [ ! -d "$TOOL_PATH" ]; then
    echo "ERROR: Tool not installed: $TOOL_NAME"
    exit 1
fi

cd "$TOOL_PATH" || exit 1
"$RUNTIME" @ENTRY_POINT@
exit $?
"#;

const BATCH_TEMPLATE: &str = "@echo off\r
REM ccgj toolchain launcher\r
setlocal\r
\r
set \"INSTALL_DIR=%~dp0\"\r
if \"%CCGJ_RUNTIME%\"==\"\" (set \"RUNTIME=@RUNTIME@\") else (set \"RUNTIME=%CCGJ_RUNTIME%\")\r
\r
if \"%~1\"==\"\" goto :show_help\r
\r
set \"TOOL_NAME=%~1\"\r
set \"TOOL_PATH=\"\r
@CASES@if \"%TOOL_PATH%\"==\"\" (\r
    echo ERROR: Unknown tool: %TOOL_NAME%\r
    call :show_help\r
    exit /b 1\r
)\r
\r
if not exist \"%TOOL_PATH%\" (\r
    echo ERROR: Tool not installed: %TOOL_NAME%\r
    exit /b 1\r
)\r
\r
cd /d \"%TOOL_PATH%\"\r
\"%RUNTIME%\" @ENTRY_POINT@\r
exit /b %ERRORLEVEL%\r
\r
:show_help\r
@HELP@exit /b 0\r
";

/// Help text listing every tool of a catalog.
pub fn help_text(catalog: &ToolCatalog, usage: &str) -> String {
    let mut help = String::new();
    let _ = writeln!(help, "ccgj AI Development Toolchain");
    let _ = writeln!(help, "{}", "=".repeat(40));
    let _ = writeln!(help, "Available tools:");
    for tool in catalog {
        let _ = writeln!(help, "  {:<12} - {} ({})", tool.command(), tool.description, tool.id);
    }
    let _ = writeln!(help);
    let _ = writeln!(help, "Usage:");
    let _ = writeln!(help, "  {usage} <tool_name>");

    help
}

/// Render master launcher script.
pub fn master_script(catalog: &ToolCatalog) -> String {
    let tools = catalog
        .iter()
        .map(|tool| format!("    {:?}: {:?},\n", tool.command(), tool.install_path))
        .collect::<String>();
    let entry_point = ENTRY_POINT
        .iter()
        .map(|part| format!("{part:?}"))
        .collect::<Vec<_>>()
        .join(", ");

    MASTER_TEMPLATE
        .replace("@TOOLS@", &tools)
        .replace("@HELP@", &format!("{:?}", help_text(catalog, "python ccgj.py").trim_end()))
        .replace("@ENTRY_POINT@", &entry_point)
}

/// Render POSIX shell launcher script.
pub fn shell_script(catalog: &ToolCatalog, runtime: &str) -> String {
    let help = help_text(catalog, "./ccgj.sh")
        .lines()
        .map(|line| format!("    echo {}\n", sh_quote(line)))
        .collect::<String>();
    let cases = catalog
        .iter()
        .map(|tool| {
            format!(
                "    {})\n        TOOL_PATH=\"$INSTALL_DIR\"/{}\n        ;;\n",
                tool.command(),
                sh_quote(&tool.install_path)
            )
        })
        .collect::<String>();

    SHELL_TEMPLATE
        .replace("@HELP@", &help)
        .replace("@CASES@", &cases)
        .replace("@RUNTIME@", runtime)
        .replace("@ENTRY_POINT@", &ENTRY_POINT.join("/"))
}

/// Render Windows batch launcher script.
pub fn batch_script(catalog: &ToolCatalog, runtime: &str) -> String {
    let help = help_text(catalog, "ccgj.bat")
        .lines()
        .map(|line| match line.is_empty() {
            true => "echo.\r\n".to_string(),
            false => format!("echo {}\r\n", batch_escape(line)),
        })
        .collect::<String>();
    let cases = catalog
        .iter()
        .map(|tool| {
            format!(
                "if /i \"%TOOL_NAME%\"==\"{}\" set \"TOOL_PATH=%INSTALL_DIR%{}\"\r\n",
                tool.command(),
                tool.install_path
            )
        })
        .collect::<String>();

    BATCH_TEMPLATE
        .replace("@HELP@", &help)
        .replace("@CASES@", &cases)
        .replace("@RUNTIME@", runtime)
        .replace("@ENTRY_POINT@", &ENTRY_POINT.join("\\"))
}

/// Write master and shell launchers into install root.
///
/// Returns paths of written launchers, master launcher first.
///
/// # Errors
///
/// - Return [`LaunchError::Write`] if a launcher cannot be written.
#[instrument(skip(catalog, install_root, runtime), level = "debug")]
pub fn write_launchers(
    catalog: &ToolCatalog,
    install_root: impl AsRef<Path>,
    runtime: &str,
) -> Result<[PathBuf; 2]> {
    let master = install_root.as_ref().join(MASTER_LAUNCHER_FILE_NAME);
    write_script(&master, master_script(catalog))?;

    let shell = install_root.as_ref().join(SHELL_LAUNCHER_FILE_NAME);
    #[cfg(unix)]
    write_script(&shell, shell_script(catalog, runtime))?;
    #[cfg(not(unix))]
    write_script(&shell, batch_script(catalog, runtime))?;

    info!("wrote launchers {} and {}", master.display(), shell.display());
    Ok([master, shell])
}

fn write_script(path: &Path, contents: String) -> Result<()> {
    write(path, contents).map_err(|err| LaunchError::Write {
        source: err,
        path: path.to_path_buf(),
    })?;

    #[cfg(unix)]
    {
        use std::{
            fs::{set_permissions, Permissions},
            os::unix::fs::PermissionsExt,
        };
        set_permissions(path, Permissions::from_mode(0o755)).map_err(|err| {
            LaunchError::Write {
                source: err,
                path: path.to_path_buf(),
            }
        })?;
    }

    Ok(())
}

fn sh_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', r#"'\''"#))
}

fn batch_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '^' | '&' | '|' | '<' | '>' | '(' | ')' | '%') {
            escaped.push(if c == '%' { '%' } else { '^' });
        }
        escaped.push(c);
    }

    escaped
}

/// Native launcher for installed tools.
#[derive(Debug, Clone)]
pub struct Launcher {
    install_root: PathBuf,
    runtime: OsString,
    catalog: ToolCatalog,
}

impl Launcher {
    /// Construct new launcher over installed catalog.
    pub fn new(
        install_root: impl Into<PathBuf>,
        runtime: impl Into<OsString>,
        catalog: ToolCatalog,
    ) -> Self {
        Self {
            install_root: install_root.into(),
            runtime: runtime.into(),
            catalog,
        }
    }

    /// Help text listing every launchable tool.
    pub fn help(&self) -> String {
        help_text(&self.catalog, "ccgj launch")
    }

    /// Resolve tool by command name to its installed descriptor.
    ///
    /// # Errors
    ///
    /// - Return [`LaunchError::UnknownTool`] if no tool has that name.
    /// - Return [`LaunchError::NotInstalled`] if tool directory is missing.
    pub fn resolve(&self, name: impl AsRef<str>) -> Result<&ToolDescriptor> {
        let tool = self
            .catalog
            .find(name.as_ref())
            .ok_or_else(|| LaunchError::UnknownTool(name.as_ref().to_string()))?;

        if !tool.directory(&self.install_root).is_dir() {
            return Err(LaunchError::NotInstalled(tool.command().to_string()));
        }

        Ok(tool)
    }

    /// Run tool entry point to completion.
    ///
    /// The runtime is spawned inside the tool directory with inherited
    /// standard streams. Its exit status is handed back as-is for the caller
    /// to propagate.
    ///
    /// # Errors
    ///
    /// - Return [`LaunchError::UnknownTool`] if no tool has that name.
    /// - Return [`LaunchError::NotInstalled`] if tool directory is missing.
    /// - Return [`LaunchError::Spawn`] if runtime cannot be started.
    #[instrument(skip(self, name), fields(tool = %name.as_ref()), level = "debug")]
    pub fn launch(&self, name: impl AsRef<str>) -> Result<ExitStatus> {
        let tool = self.resolve(name)?;
        info!("starting ccgj {}", tool.command());
        let entry_point = tool.entry_point(&self.install_root);
        let status = syscall_interactive(
            &self.runtime,
            [entry_point.as_os_str()],
            tool.directory(&self.install_root),
        )?;

        Ok(status)
    }
}

/// Launcher error types.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    /// Name does not match any tool.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Tool directory does not exist.
    #[error("tool not installed: {0}")]
    NotInstalled(String),

    /// Runtime could not be started.
    #[error(transparent)]
    Spawn(#[from] SyscallError),

    /// Launcher script could not be written.
    #[error("failed to write launcher {path:?}")]
    Write {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = LaunchError> = std::result::Result<T, E>;
