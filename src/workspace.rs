use std::path::PathBuf;

use tracing::info;

use crate::branch::BranchRef;
use crate::config::DeployConfig;
use crate::error::{DeployError, Result, SyncStage};
use crate::git::{GitClient, GitError};

/// A per-slug working copy in a known, reproducible state.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub path: PathBuf,
    /// Commit SHA the workspace resolved to after synchronization.
    pub head: String,
}

/// Brings the workspace for a branch to the exact state of the remote ref,
/// cloning on first deploy and fetch+hard-resetting on redeploys. Local drift
/// is always discarded: a deployment is a snapshot of the remote, never a
/// merge.
pub struct WorkspaceSynchronizer<'a> {
    git: &'a GitClient,
    config: &'a DeployConfig,
}

impl<'a> WorkspaceSynchronizer<'a> {
    pub fn new(git: &'a GitClient, config: &'a DeployConfig) -> Self {
        Self { git, config }
    }

    pub fn sync(&self, branch: &BranchRef) -> Result<Workspace> {
        let canonical = &self.config.canonical_repo;

        // Materialize the branch on the canonical mirror first so the
        // workspace clone/fetch below cannot race a partial fetch.
        self.git
            .checkout(canonical, branch.short_name())
            .map_err(sync_failure(SyncStage::Checkout))?;
        self.git
            .reset_hard(canonical, &branch.full_name())
            .map_err(sync_failure(SyncStage::Reset))?;

        let path = self.config.repo_dir.join(branch.slug());
        if path.exists() {
            info!(workspace = %path.display(), "Reusing existing workspace");
            self.git
                .fetch(&path, "origin")
                .map_err(sync_failure(SyncStage::Fetch))?;
            self.git
                .reset_hard(&path, &branch.full_name())
                .map_err(sync_failure(SyncStage::Reset))?;
        } else {
            info!(workspace = %path.display(), "Cloning fresh workspace");
            self.git
                .clone_into(canonical, &path)
                .map_err(sync_failure(SyncStage::Clone))?;
            self.git
                .checkout(&path, branch.short_name())
                .map_err(sync_failure(SyncStage::Checkout))?;
        }

        let head = self
            .git
            .head_commit(&path)
            .map_err(sync_failure(SyncStage::Inspect))?;
        info!(workspace = %path.display(), commit = %head, "Workspace synchronized");

        Ok(Workspace { path, head })
    }
}

fn sync_failure(stage: SyncStage) -> impl FnOnce(GitError) -> DeployError {
    move |source| DeployError::Sync { stage, source }
}
