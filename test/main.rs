// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT


use anyhow::Result;
use ccgj::catalog::{ToolCatalog, ToolDescriptor};
use git2::{IndexEntry, IndexTime, Repository, RepositoryInitOptions};
use std::path::{Path, PathBuf};

/// Local stand-in for a remote tool repository.
pub(crate) struct RepoFixture {
    repo: Repository,
}

impl RepoFixture {
    pub(crate) fn new(path: impl AsRef<Path>) -> Result<Self> {
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("main");
        let repo = Repository::init_opts(path.as_ref(), &opts)?;

        // INVARIANT: Always provide valid name and email.
        //   - Git will complain if this is not set in CI/CD environments.
        let mut config = repo.config()?;
        config.set_str("user.name", "John Doe")?;
        config.set_str("user.email", "john@doe.com")?;

        Ok(Self { repo })
    }

    pub(crate) fn stage_and_commit(
        &self,
        filename: impl AsRef<Path>,
        contents: impl AsRef<str>,
    ) -> Result<()> {
        let entry = IndexEntry {
            ctime: IndexTime::new(0, 0),
            mtime: IndexTime::new(0, 0),
            dev: 0,
            ino: 0,
            mode: 0o100644,
            uid: 0,
            gid: 0,
            file_size: contents.as_ref().len() as u32,
            id: self.repo.blob(contents.as_ref().as_bytes())?,
            flags: 0,
            flags_extended: 0,
            path: filename
                .as_ref()
                .to_string_lossy()
                .into_owned()
                .into_bytes(),
        };

        // INVARIANT: Always use new tree produced by index after staging new entry.
        let mut index = self.repo.index()?;
        index.add_frombuffer(&entry, contents.as_ref().as_bytes())?;
        let tree_oid = index.write_tree()?;
        let tree = self.repo.find_tree(tree_oid)?;

        // INVARIANT: Always determine latest parent commits to append to.
        let signature = self.repo.signature()?;
        let mut parents = Vec::new();
        if let Some(parent) = self.repo.head().ok().and_then(|head| head.target()) {
            parents.push(self.repo.find_commit(parent)?);
        }
        let parents = parents.iter().collect::<Vec<_>>();

        // INVARIANT: Commit to HEAD by appending to obtained parent commits.
        self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            format!("chore: add {:?}", filename.as_ref()).as_ref(),
            &tree,
            &parents,
        )?;

        Ok(())
    }
}

/// Set of fixture remotes mirroring the builtin catalog.
pub(crate) struct RemoteSet {
    pub(crate) dir: PathBuf,
    pub(crate) remotes: Vec<RepoFixture>,
}

impl RemoteSet {
    /// Create one fixture remote per builtin tool, each with a README.
    pub(crate) fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        let mut remotes = Vec::new();
        for tool in ToolCatalog::builtin().iter() {
            let remote = RepoFixture::new(dir.join(&tool.id))?;
            remote.stage_and_commit("README.md", format!("# {}\n", tool.name))?;
            remotes.push(remote);
        }

        Ok(Self { dir, remotes })
    }

    /// Fixture remote backing tool at catalog position.
    pub(crate) fn remote(&self, position: usize) -> &RepoFixture {
        &self.remotes[position]
    }

    /// Builtin catalog rewired to clone from fixture remotes.
    pub(crate) fn catalog(&self) -> ToolCatalog {
        ToolCatalog::new(ToolCatalog::builtin().iter().map(|tool| ToolDescriptor {
            repository: self.dir.join(&tool.id).to_string_lossy().into_owned(),
            ..tool.clone()
        }))
    }
}
