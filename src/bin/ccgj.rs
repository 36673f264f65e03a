// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use ccgj::{
    config::Configuration,
    installer::Installer,
    launcher::{LaunchError, Launcher},
    settings::InstallerSettings,
};

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::{ffi::OsString, path::PathBuf, process::exit};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "\n  ccgj [options] [install]\n  ccgj [options] launch [<tool_name>]",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    /// Directory to install toolchain into.
    #[arg(long, global = true, env = "CCGJ_HOME", value_name = "path")]
    pub install_dir: Option<String>,

    /// Program used to run tools and install their dependencies.
    #[arg(long, global = true, env = "CCGJ_RUNTIME", value_name = "program")]
    pub runtime: Option<OsString>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    fn run(self) -> Result<i32> {
        let settings = self.settings()?;
        match self.command {
            None | Some(Command::Install) => run_install(settings),
            Some(Command::Launch(opts)) => run_launch(settings, opts),
        }
    }

    fn settings(&self) -> Result<InstallerSettings> {
        let mut settings = match &self.install_dir {
            Some(path) => InstallerSettings::new(PathBuf::from(
                shellexpand::full(path)?.into_owned(),
            )),
            None => InstallerSettings::try_default()?,
        };

        if let Some(runtime) = &self.runtime {
            settings = settings.with_runtime(runtime.clone());
        }

        Ok(settings)
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Install every tool of the toolchain (default).
    #[command(override_usage = "ccgj install [options]")]
    Install,

    /// Run an installed tool.
    #[command(override_usage = "ccgj launch [options] [<tool_name>]")]
    Launch(LaunchOptions),
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct LaunchOptions {
    /// Name of tool to run, e.g., "specflow".
    #[arg(value_name = "tool_name")]
    pub tool_name: Option<String>,
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    match run() {
        Ok(code) => exit(code),
        Err(error) => {
            error!("{error:?}");
            exit(1);
        }
    }
}

fn run() -> Result<i32> {
    Cli::parse().run()
}

fn run_install(settings: InstallerSettings) -> Result<i32> {
    let installer = Installer::new(settings);
    installer.install()?;

    Ok(0)
}

fn run_launch(settings: InstallerSettings, opts: LaunchOptions) -> Result<i32> {
    let configuration = Configuration::load(&settings.install_root)?;
    let launcher = Launcher::new(
        &configuration.install_directory,
        settings.runtime,
        configuration.catalog(),
    );

    let Some(tool_name) = opts.tool_name else {
        print!("{}", launcher.help());
        return Ok(0);
    };

    match launcher.launch(&tool_name) {
        Ok(status) => Ok(status.code().unwrap_or(1)),
        Err(err @ LaunchError::UnknownTool(_)) => {
            error!("{err}");
            print!("{}", launcher.help());
            Ok(1)
        }
        Err(err) => Err(err.into()),
    }
}
