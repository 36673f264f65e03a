// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Source control for tool repositories.
//!
//! Each tool is a plain Git repository. A tool that is not on disk yet gets
//! cloned, while a tool that already exists gets updated by fetching its
//! current branch from "origin" and fast-forwarding to it. Nothing here ever
//! creates merge commits or rewrites local history. A checkout that cannot be
//! fast-forwarded is reported as a failure instead.

use auth_git2::{GitAuthenticator, Prompter};
use git2::{
    build::{CheckoutBuilder, RepoBuilder},
    Config, FetchOptions, RemoteCallbacks, Repository,
};
use indicatif::{ProgressBar, ProgressStyle};
use inquire::{Password, Text};
use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};
use tracing::{debug, info, instrument};

/// Layer of indirection for tool repository access.
pub trait SourceControl {
    /// Clone repository at URL into fresh directory at path.
    fn clone_repo(&self, url: &str, path: &Path) -> Result<()>;

    /// Bring existing repository at path up to date with its remote.
    fn update_repo(&self, path: &Path) -> Result<()>;
}

/// Source control through libgit2.
#[derive(Debug, Default, Clone, Copy)]
pub struct Git2SourceControl;

impl Git2SourceControl {
    /// Construct new libgit2 source control.
    pub fn new() -> Self {
        Self
    }
}

impl SourceControl for Git2SourceControl {
    /// Clone repository from remote.
    ///
    /// The progress of the clone is displayed through a progress bar. If any
    /// credentials are required for the clone to continue, then the user
    /// will be prompted for that information accordingly. The progress bar
    /// will be blocked for user input.
    ///
    /// # Errors
    ///
    /// - Return [`VcsError::Git2`] if libgit2 operations fail.
    /// - Return [`VcsError::IndicatifStyleTemplate`] if progress bar style
    ///   is invalid.
    #[instrument(skip(self, url, path), level = "debug")]
    fn clone_repo(&self, url: &str, path: &Path) -> Result<()> {
        debug!("clone {url} into {}", path.display());
        let config = open_git_config()?;
        let bar = progress_bar(url)?;
        let prompter = IndicatifPrompter::new(bar.clone());
        let authenticator = GitAuthenticator::default().set_prompter(prompter);

        let fo = fetch_options(&authenticator, &config, &bar);
        let result = RepoBuilder::new().fetch_options(fo).clone(url, path);
        bar.finish_and_clear();
        result?;

        Ok(())
    }

    /// Fast-forward current branch to its counterpart on "origin".
    ///
    /// # Errors
    ///
    /// - Return [`VcsError::Git2`] if libgit2 operations fail.
    /// - Return [`VcsError::DetachedHead`] if no branch is checked out.
    /// - Return [`VcsError::Diverged`] if local branch cannot be
    ///   fast-forwarded.
    #[instrument(skip(self, path), level = "debug")]
    fn update_repo(&self, path: &Path) -> Result<()> {
        let repository = Repository::open(path)?;
        let (refname, branch) = {
            let head = repository.head()?;
            match (head.is_branch(), head.name(), head.shorthand()) {
                (true, Some(refname), Some(branch)) => (refname.to_string(), branch.to_string()),
                _ => return Err(VcsError::DetachedHead(path.to_path_buf())),
            }
        };

        let mut remote = repository.find_remote("origin")?;
        let config = open_git_config()?;
        let bar = progress_bar(format!("{} ({branch})", path.display()))?;
        let prompter = IndicatifPrompter::new(bar.clone());
        let authenticator = GitAuthenticator::default().set_prompter(prompter);

        let mut fo = fetch_options(&authenticator, &config, &bar);
        let fetched = remote.fetch(&[branch.as_str()], Some(&mut fo), None);
        bar.finish_and_clear();
        fetched?;

        let fetch_head = repository.find_reference("FETCH_HEAD")?;
        let fetch_commit = repository.reference_to_annotated_commit(&fetch_head)?;
        let (analysis, _) = repository.merge_analysis(&[&fetch_commit])?;

        if analysis.is_up_to_date() {
            debug!("{} already up to date", path.display());
            return Ok(());
        }

        if !analysis.is_fast_forward() {
            return Err(VcsError::Diverged(path.to_path_buf()));
        }

        info!("fast-forward {} to {}", path.display(), fetch_commit.id());
        let mut reference = repository.find_reference(&refname)?;
        reference.set_target(fetch_commit.id(), "ccgj: fast-forward")?;
        repository.set_head(&refname)?;
        repository.checkout_head(Some(CheckoutBuilder::default().force()))?;

        Ok(())
    }
}

fn open_git_config() -> Result<Config> {
    // INVARIANT: Fall back to empty config when no global config exists.
    Config::open_default().or_else(|_| Config::new().map_err(VcsError::from))
}

fn progress_bar(message: impl Into<String>) -> Result<ProgressBar> {
    let bar = ProgressBar::new(0);
    let style = ProgressStyle::with_template(
        "{elapsed_precise:.green}  {msg:<50}  [{wide_bar:.yellow/blue}]",
    )?
    .progress_chars("-Cco.");
    bar.set_style(style);
    bar.set_message(message.into());
    bar.enable_steady_tick(Duration::from_millis(100));

    Ok(bar)
}

fn fetch_options<'cb>(
    authenticator: &'cb GitAuthenticator,
    config: &'cb Config,
    bar: &'cb ProgressBar,
) -> FetchOptions<'cb> {
    let mut throttle = Instant::now();
    let mut rc = RemoteCallbacks::new();
    rc.credentials(authenticator.credentials(config));
    rc.transfer_progress(move |progress| {
        if throttle.elapsed() > Duration::from_millis(10) {
            throttle = Instant::now();
            bar.set_length(progress.total_objects() as u64);
            bar.set_position(progress.received_objects() as u64);
        }
        true
    });

    let mut fo = FetchOptions::new();
    fo.remote_callbacks(rc);
    fo
}

/// Git2 authentication prompter for progress bar.
#[derive(Debug, Clone)]
pub struct IndicatifPrompter {
    pub(crate) bar: ProgressBar,
}

impl IndicatifPrompter {
    /// Construct new progress bar authenticator.
    pub fn new(bar: ProgressBar) -> Self {
        Self { bar }
    }
}

impl Prompter for IndicatifPrompter {
    #[instrument(skip(self, url, _config), level = "debug")]
    fn prompt_username_password(
        &mut self,
        url: &str,
        _config: &git2::Config,
    ) -> Option<(String, String)> {
        info!("authentication required at {url}");
        self.bar.suspend(|| -> Option<(String, String)> {
            let username = Text::new("username").prompt().ok()?;
            let password = Password::new("password")
                .without_confirmation()
                .prompt()
                .ok()?;
            Some((username, password))
        })
    }

    #[instrument(skip(self, username, url, _config), level = "debug")]
    fn prompt_password(
        &mut self,
        username: &str,
        url: &str,
        _config: &git2::Config,
    ) -> Option<String> {
        info!("authentication required at {url} for user {username}");
        self.bar.suspend(|| -> Option<String> {
            Password::new("password")
                .without_confirmation()
                .prompt()
                .ok()
        })
    }

    #[instrument(skip(self, ssh_key_path, _config), level = "debug")]
    fn prompt_ssh_key_passphrase(
        &mut self,
        ssh_key_path: &Path,
        _config: &git2::Config,
    ) -> Option<String> {
        info!(
            "authentication required with ssh key at {}",
            ssh_key_path.display()
        );
        self.bar.suspend(|| -> Option<String> {
            Password::new("passphrase")
                .without_confirmation()
                .prompt()
                .ok()
        })
    }
}

/// Source control error types.
#[derive(Debug, thiserror::Error)]
pub enum VcsError {
    /// Operations from libgit2 fail.
    #[error(transparent)]
    Git2(#[from] git2::Error),

    /// Style template cannot be set for progress bars.
    #[error(transparent)]
    IndicatifStyleTemplate(#[from] indicatif::style::TemplateError),

    /// No branch checked out to update.
    #[error("repository {0:?} has no branch checked out")]
    DetachedHead(PathBuf),

    /// Local branch has commits the remote does not.
    #[error("repository {0:?} cannot be fast-forwarded")]
    Diverged(PathBuf),
}

/// Friendly result alias :3
pub type Result<T, E = VcsError> = std::result::Result<T, E>;
