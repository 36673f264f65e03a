// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Installer for the ccgj AI development toolchain.
//!
//! The toolchain is made up of nine tools, each living in its own Git
//! repository. Installing the toolchain means cloning every one of those
//! repositories under a single __install root__, installing whatever
//! dependencies they declare, and making sure each has an entry point that
//! the generated launchers can run.
//!
//! # Install Root Layout
//!
//! ```text
//! ~/ccgj/
//! ├── ccgj.py          master launcher
//! ├── ccgj.sh          shell launcher (ccgj.bat on Windows)
//! ├── config.toml      record of the completed install
//! ├── orchestrator/
//! │   ├── requirements.txt
//! │   └── src/main.py
//! ├── specflow/
//! └── ...
//! ```
//!
//! The launchers and configuration are __finalization artifacts__. They are
//! only written once every tool installed successfully.

pub mod catalog;
pub mod config;
pub mod credential;
pub mod deps;
pub mod installer;
pub mod launcher;
pub mod path;
pub mod preflight;
pub mod scaffold;
pub mod settings;
pub mod syscall;
pub mod vcs;
