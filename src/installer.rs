// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Toolchain installation workflow.
//!
//! An install runs strictly in sequence:
//!
//! 1. Show banner.
//! 2. Verify installation password against stored credential.
//! 3. Check environment prerequisites.
//! 4. Create install root.
//! 5. Install each tool of the catalog in declaration order.
//! 6. Finalize, but only if every tool installed.
//!
//! # Failure Handling
//!
//! Steps 2 through 4 are pre-flight steps. Any failure there aborts the whole
//! run right away. Step 5 is different. A tool that fails to clone, update,
//! install dependencies, or scaffold its entry point is recorded as failed,
//! and the batch moves on to the next tool. After the batch, the number of
//! installed tools is compared against the catalog size. Only a complete
//! batch gets finalized. There is no rollback, so whatever the batch left on
//! disk stays there, and a later run updates existing tool directories
//! instead of cloning them again.
//!
//! # Finalization
//!
//! Finalization writes the master launcher, the platform shell launcher, and
//! the persisted [`Configuration`], then prints a summary.

use crate::{
    catalog::ToolDescriptor,
    config::{ConfigError, Configuration},
    credential::{prompt_secret, CredentialError},
    deps::{DependencyError, DependencyInstaller, PipInstaller},
    launcher::{help_text, write_launchers, LaunchError},
    preflight::{run_checks, PreflightError},
    scaffold::{scaffold_entry_point, ScaffoldError},
    settings::InstallerSettings,
    vcs::{Git2SourceControl, SourceControl, VcsError},
};

use indoc::indoc;
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs::create_dir_all,
    path::PathBuf,
};
use tracing::{error, info, instrument};

const BANNER: &str = indoc! {"
    ==================================================
                  ccgj AI Development Toolchain
    ==================================================

      AI: 9 tools working together
      Fast: One command installation
      Smart: Requirements to deployment

    ==================================================
"};

/// How a tool's repository was brought onto disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchAction {
    /// Tool directory did not exist, so repository was cloned.
    Clone,

    /// Tool directory existed, so repository was updated.
    Update,
}

impl Display for FetchAction {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Clone => fmt.write_str("clone"),
            Self::Update => fmt.write_str("update"),
        }
    }
}

/// Result of installing one tool.
#[derive(Debug)]
pub struct ToolOutcome {
    /// Identifier of tool.
    pub tool_id: String,

    /// Whether a clone or an update was attempted.
    pub action: FetchAction,

    /// Whether every step for the tool went through.
    pub result: Result<(), ToolError>,
}

impl ToolOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcome of a whole batch of tool installs.
#[derive(Debug, Default)]
pub struct InstallReport {
    /// Per tool outcomes in install order.
    pub outcomes: Vec<ToolOutcome>,

    /// Whether finalization artifacts were written.
    pub finalized: bool,
}

impl InstallReport {
    /// Number of tools that installed.
    pub fn installed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.succeeded())
            .count()
    }

    /// Number of tools attempted.
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Check if every tool installed.
    pub fn is_complete(&self) -> bool {
        self.installed() == self.total()
    }

    /// Outcomes of tools that failed to install.
    pub fn failures(&self) -> impl Iterator<Item = &ToolOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.succeeded())
    }
}

impl Display for InstallReport {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        write!(fmt, "{}/{} tools installed", self.installed(), self.total())
    }
}

/// Toolchain installer.
///
/// Generic over the source control and dependency installation backends so
/// the workflow can be driven without touching the network.
#[derive(Debug)]
pub struct Installer<S = Git2SourceControl, D = PipInstaller>
where
    S: SourceControl,
    D: DependencyInstaller,
{
    settings: InstallerSettings,
    vcs: S,
    deps: D,
}

impl Installer {
    /// Construct new installer backed by libgit2 and pip.
    pub fn new(settings: InstallerSettings) -> Self {
        let deps = PipInstaller::new(settings.runtime.clone());
        Self {
            settings,
            vcs: Git2SourceControl::new(),
            deps,
        }
    }
}

impl<S, D> Installer<S, D>
where
    S: SourceControl,
    D: DependencyInstaller,
{
    /// Construct new installer with custom backends.
    pub fn with_backends(settings: InstallerSettings, vcs: S, deps: D) -> Self {
        Self {
            settings,
            vcs,
            deps,
        }
    }

    /// Settings installer was built with.
    pub fn settings(&self) -> &InstallerSettings {
        &self.settings
    }

    /// Run full interactive install.
    ///
    /// # Errors
    ///
    /// - Return [`InstallError::Credential`] if password cannot be read.
    /// - Return [`InstallError::CredentialMismatch`] if password is wrong.
    /// - Return [`InstallError::Preflight`] if a fatal environment check
    ///   fails.
    /// - Return [`InstallError::CreateInstallRoot`] if install root cannot be
    ///   created.
    /// - Return [`InstallError::Incomplete`] if any tool failed to install.
    /// - Return [`InstallError::Config`] or [`InstallError::Launcher`] if
    ///   finalization artifacts cannot be written.
    pub fn install(&self) -> Result<InstallReport> {
        self.show_banner();
        println!("Enter installation password:");
        let secret = prompt_secret()?;
        self.authorize(&secret)?;
        run_checks(&self.settings)?;

        let report = self.provision()?;
        if !report.is_complete() {
            return Err(InstallError::Incomplete {
                installed: report.installed(),
                total: report.total(),
            });
        }

        self.show_summary();
        Ok(report)
    }

    /// Print installation banner.
    pub fn show_banner(&self) {
        println!("\n{BANNER}");
    }

    /// Check secret against stored credential.
    ///
    /// # Errors
    ///
    /// - Return [`InstallError::CredentialMismatch`] if secret is wrong.
    pub fn authorize(&self, secret: impl AsRef<str>) -> Result<()> {
        if !self.settings.credential.verify_password(secret) {
            error!("password incorrect");
            return Err(InstallError::CredentialMismatch);
        }

        info!("password verification passed");
        Ok(())
    }

    /// Create install root, install every tool, and finalize if all of them
    /// installed.
    ///
    /// A partial batch is not an error here. Inspect the returned report.
    ///
    /// # Errors
    ///
    /// - Return [`InstallError::CreateInstallRoot`] if install root cannot be
    ///   created.
    /// - Return [`InstallError::Config`] or [`InstallError::Launcher`] if
    ///   finalization artifacts cannot be written.
    #[instrument(skip(self), level = "debug")]
    pub fn provision(&self) -> Result<InstallReport> {
        self.create_install_root()?;

        let mut report = InstallReport::default();
        for tool in &self.settings.catalog {
            report.outcomes.push(self.install_tool(tool));
        }
        info!("{report}");

        if !report.is_complete() {
            for failure in report.failures() {
                error!("{} failed to install", failure.tool_id);
            }
            error!("installation incomplete, launchers and configuration not written");
            return Ok(report);
        }

        self.finalize()?;
        report.finalized = true;

        Ok(report)
    }

    /// Create install root with all of its parents.
    ///
    /// # Errors
    ///
    /// - Return [`InstallError::CreateInstallRoot`] if directory cannot be
    ///   created.
    pub fn create_install_root(&self) -> Result<()> {
        let root = &self.settings.install_root;
        info!("creating install directory: {}", root.display());
        create_dir_all(root).map_err(|err| InstallError::CreateInstallRoot {
            source: err,
            path: root.clone(),
        })?;

        Ok(())
    }

    /// Install one tool.
    ///
    /// Clones the tool repository, or updates it if the tool directory already
    /// exists. Then installs declared dependencies if a manifest exists, and
    /// scaffolds a placeholder entry point if none exists. Failures are
    /// logged and captured in the outcome, never raised.
    #[instrument(skip(self, tool), fields(tool = %tool.id), level = "debug")]
    pub fn install_tool(&self, tool: &ToolDescriptor) -> ToolOutcome {
        info!("installing {} ({})", tool.name, tool.description);
        let directory = tool.directory(&self.settings.install_root);
        let action = match directory.exists() {
            true => FetchAction::Update,
            false => FetchAction::Clone,
        };

        let result = self.run_tool_steps(tool, action);
        match &result {
            Ok(()) => info!("{} installation complete", tool.name),
            Err(err) => error!("{} installation failed: {err}", tool.name),
        }

        ToolOutcome {
            tool_id: tool.id.clone(),
            action,
            result,
        }
    }

    fn run_tool_steps(&self, tool: &ToolDescriptor, action: FetchAction) -> Result<(), ToolError> {
        let root = &self.settings.install_root;
        let directory = tool.directory(root);

        match action {
            FetchAction::Update => {
                info!("{} exists, updating", tool.name);
                self.vcs.update_repo(&directory)?;
            }
            FetchAction::Clone => {
                info!("cloning {}", tool.name);
                self.vcs.clone_repo(&tool.repository, &directory)?;
            }
        }

        let manifest = tool.manifest(root);
        if manifest.exists() {
            info!("installing {} dependencies", tool.name);
            self.deps.install(&manifest)?;
        }

        scaffold_entry_point(tool, root)?;

        Ok(())
    }

    /// Write launchers and configuration into install root.
    ///
    /// Existing artifacts are overwritten. The configuration gets a fresh
    /// timestamp each time.
    ///
    /// # Errors
    ///
    /// - Return [`InstallError::Launcher`] if a launcher cannot be written.
    /// - Return [`InstallError::Config`] if configuration cannot be written.
    #[instrument(skip(self), level = "debug")]
    pub fn finalize(&self) -> Result<()> {
        let root = &self.settings.install_root;
        write_launchers(
            &self.settings.catalog,
            root,
            self.settings.runtime.to_string_lossy().as_ref(),
        )?;

        let configuration = Configuration::new(
            root,
            self.settings.credential.hash(),
            &self.settings.catalog,
        );
        let path = configuration.save(root)?;
        info!("wrote configuration {}", path.display());

        Ok(())
    }

    /// Print success summary.
    pub fn show_summary(&self) {
        let root = self.settings.install_root.display();
        println!("{}", "=".repeat(50));
        println!("                Installation Complete!");
        println!("{}", "=".repeat(50));
        println!();
        println!("Install directory: {root}");
        println!();
        println!("Usage:");
        println!("  ccgj launch <tool_name>");
        println!("  python {root}/ccgj.py <tool_name>");
        println!();
        print!("{}", help_text(&self.settings.catalog, "ccgj launch"));
    }
}

/// Reason a single tool failed to install.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Clone or update of tool repository failed.
    #[error(transparent)]
    CloneOrUpdate(#[from] VcsError),

    /// Dependency installation failed.
    #[error(transparent)]
    Dependencies(#[from] DependencyError),

    /// Placeholder entry point could not be written.
    #[error(transparent)]
    Scaffold(#[from] ScaffoldError),
}

/// Installation error types.
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    /// Password could not be read.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// Password does not match stored credential.
    #[error("installation password incorrect")]
    CredentialMismatch,

    /// Fatal environment check failed.
    #[error(transparent)]
    Preflight(#[from] PreflightError),

    /// Install root could not be created.
    #[error("failed to create install directory {path:?}")]
    CreateInstallRoot {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Not every tool installed.
    #[error("installation failed: {installed}/{total} tools installed")]
    Incomplete { installed: usize, total: usize },

    /// Launcher could not be written.
    #[error(transparent)]
    Launcher(#[from] LaunchError),

    /// Configuration could not be written.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Friendly result alias :3
pub type Result<T, E = InstallError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::ToolCatalog,
        path::{CONFIG_FILE_NAME, MASTER_LAUNCHER_FILE_NAME, SHELL_LAUNCHER_FILE_NAME},
        syscall::SyscallError,
    };
    use pretty_assertions::assert_eq;
    use std::{
        cell::RefCell,
        fs::{read_to_string, write},
        path::Path,
    };

    /// Source control double that records calls and fakes clones.
    #[derive(Debug, Default)]
    struct RecordingVcs {
        calls: RefCell<Vec<(FetchAction, PathBuf)>>,
        broken_url: Option<String>,
    }

    impl RecordingVcs {
        fn failing_on(url: impl Into<String>) -> Self {
            Self {
                broken_url: Some(url.into()),
                ..Default::default()
            }
        }
    }

    impl SourceControl for RecordingVcs {
        fn clone_repo(&self, url: &str, path: &Path) -> crate::vcs::Result<()> {
            self.calls
                .borrow_mut()
                .push((FetchAction::Clone, path.to_path_buf()));
            if self.broken_url.as_deref() == Some(url) {
                return Err(VcsError::Git2(git2::Error::from_str("remote not found")));
            }
            create_dir_all(path).map_err(|_| git2::Error::from_str("mkdir"))?;
            Ok(())
        }

        fn update_repo(&self, path: &Path) -> crate::vcs::Result<()> {
            self.calls
                .borrow_mut()
                .push((FetchAction::Update, path.to_path_buf()));
            Ok(())
        }
    }

    /// Dependency installer double that remembers manifests.
    #[derive(Debug, Default)]
    struct RecordingDeps {
        manifests: RefCell<Vec<PathBuf>>,
        fail: bool,
    }

    impl DependencyInstaller for RecordingDeps {
        fn install(&self, manifest: &Path) -> crate::deps::Result<()> {
            self.manifests.borrow_mut().push(manifest.to_path_buf());
            if self.fail {
                return Err(DependencyError {
                    source: SyscallError::Spawn {
                        source: std::io::Error::other("pip is missing"),
                        program: "pip".into(),
                    },
                    manifest: manifest.to_path_buf(),
                });
            }
            Ok(())
        }
    }

    fn installer<S, D>(root: &Path, vcs: S, deps: D) -> Installer<S, D>
    where
        S: SourceControl,
        D: DependencyInstaller,
    {
        Installer::with_backends(InstallerSettings::new(root.join("ccgj")), vcs, deps)
    }

    fn artifacts(root: &Path) -> [PathBuf; 3] {
        [
            root.join(MASTER_LAUNCHER_FILE_NAME),
            root.join(SHELL_LAUNCHER_FILE_NAME),
            root.join(CONFIG_FILE_NAME),
        ]
    }

    #[test]
    fn authorize_accepts_only_correct_password() {
        let root = tempfile::tempdir().unwrap();
        let installer = installer(root.path(), RecordingVcs::default(), RecordingDeps::default());
        assert!(installer.authorize("datouguai").is_ok());
        assert!(matches!(
            installer.authorize("letmein"),
            Err(InstallError::CredentialMismatch)
        ));
    }

    #[test]
    fn fresh_install_clones_every_tool_once_and_finalizes() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let installer = installer(root.path(), RecordingVcs::default(), RecordingDeps::default());
        let report = installer.provision()?;

        assert_eq!(report.to_string(), "9/9 tools installed");
        assert!(report.finalized);

        let install_root = &installer.settings().install_root;
        let calls = installer.vcs.calls.borrow();
        let expect = ToolCatalog::builtin()
            .iter()
            .map(|tool| (FetchAction::Clone, tool.directory(install_root)))
            .collect::<Vec<_>>();
        assert_eq!(*calls, expect);

        for path in artifacts(install_root) {
            assert!(path.exists(), "missing {}", path.display());
        }

        let configuration = Configuration::load(install_root)?;
        assert_eq!(configuration.catalog(), ToolCatalog::builtin());
        assert_eq!(configuration.credential_hash, installer.settings().credential.hash());

        Ok(())
    }

    #[test]
    fn existing_directories_are_updated_not_cloned() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let installer = installer(root.path(), RecordingVcs::default(), RecordingDeps::default());
        let install_root = installer.settings().install_root.clone();
        create_dir_all(install_root.join("specflow"))?;
        create_dir_all(install_root.join("fixflow"))?;

        let report = installer.provision()?;
        let actions = report
            .outcomes
            .iter()
            .map(|outcome| (outcome.tool_id.as_str(), outcome.action))
            .filter(|(_, action)| *action == FetchAction::Update)
            .collect::<Vec<_>>();
        assert_eq!(
            actions,
            vec![("gongju1", FetchAction::Update), ("gongju8", FetchAction::Update)]
        );
        assert_eq!(installer.vcs.calls.borrow().len(), 9);

        Ok(())
    }

    #[test]
    fn one_failed_clone_blocks_finalization() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let vcs = RecordingVcs::failing_on("https://github.com/feizaiguai/gongju3.git");
        let installer = installer(root.path(), vcs, RecordingDeps::default());
        let report = installer.provision()?;

        assert_eq!(report.to_string(), "8/9 tools installed");
        assert!(!report.finalized);
        let failed = report
            .failures()
            .map(|outcome| outcome.tool_id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(failed, vec!["gongju3"]);

        // Batch carries on past the failure.
        assert_eq!(installer.vcs.calls.borrow().len(), 9);

        for path in artifacts(&installer.settings().install_root) {
            assert!(!path.exists(), "unexpected {}", path.display());
        }

        Ok(())
    }

    #[test]
    fn failed_dependency_install_marks_tool_failed() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let deps = RecordingDeps {
            fail: true,
            ..Default::default()
        };
        let installer = installer(root.path(), RecordingVcs::default(), deps);
        let install_root = installer.settings().install_root.clone();
        create_dir_all(install_root.join("docflow"))?;
        write(install_root.join("docflow/requirements.txt"), "requests\n")?;

        let report = installer.provision()?;
        assert_eq!(report.to_string(), "8/9 tools installed");
        let failure = report.failures().next().unwrap();
        assert_eq!(failure.tool_id, "gongju6");
        assert!(matches!(failure.result, Err(ToolError::Dependencies(_))));
        assert_eq!(
            *installer.deps.manifests.borrow(),
            vec![install_root.join("docflow/requirements.txt")]
        );

        // Failing tool never reaches scaffolding.
        assert!(!install_root.join("docflow/src/main.py").exists());

        Ok(())
    }

    #[test]
    fn rerun_keeps_entry_points_and_rewrites_artifacts() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let installer = installer(root.path(), RecordingVcs::default(), RecordingDeps::default());
        let install_root = installer.settings().install_root.clone();
        installer.provision()?;
        let first = Configuration::load(&install_root)?;

        write(install_root.join("techflow/src/main.py"), "print('custom')\n")?;
        let report = installer.provision()?;
        assert!(report.finalized);
        assert!(report
            .outcomes
            .iter()
            .all(|outcome| outcome.action == FetchAction::Update));

        let second = Configuration::load(&install_root)?;
        assert!(second.installed_at >= first.installed_at);
        assert_eq!(
            read_to_string(install_root.join("techflow/src/main.py"))?,
            "print('custom')\n"
        );

        Ok(())
    }

    #[test]
    fn unwritable_install_root_is_fatal() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let blocker = root.path().join("ccgj");
        write(&blocker, "not a directory")?;

        let installer = installer(root.path(), RecordingVcs::default(), RecordingDeps::default());
        let result = installer.provision();
        assert!(matches!(result, Err(InstallError::CreateInstallRoot { .. })));
        assert!(installer.vcs.calls.borrow().is_empty());

        Ok(())
    }
}
