use std::fmt;
use std::path::PathBuf;
use std::time::Instant;

use tracing::{error, info, warn};

use crate::branch::BranchRef;
use crate::builder::BuildRunner;
use crate::config::DeployConfig;
use crate::error::{DeployError, Result};
use crate::git::GitClient;
use crate::install::DependencyInstaller;
use crate::observability::MetricsCollector;
use crate::publish::PublishManager;
use crate::receipt;
use crate::resolver::{self, RemoteBranchResolver};
use crate::workspace::WorkspaceSynchronizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Resolve,
    Sync,
    Install,
    Build,
    Publish,
}

impl PipelineStage {
    pub fn as_str(self) -> &'static str {
        match self {
            PipelineStage::Resolve => "resolve",
            PipelineStage::Sync => "sync",
            PipelineStage::Install => "install",
            PipelineStage::Build => "build",
            PipelineStage::Publish => "publish",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pipeline failure tagged with the stage it originated from. Stages after
/// the failing one never ran; state already on disk is left for inspection.
#[derive(Debug)]
pub struct StageFailure {
    pub stage: PipelineStage,
    pub error: DeployError,
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "deploy halted at {} stage: {}", self.stage, self.error)
    }
}

impl std::error::Error for StageFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

#[derive(Debug, Clone)]
pub struct DeployOutcome {
    pub branch: BranchRef,
    pub slug: String,
    pub workspace: PathBuf,
    pub commit: String,
    pub link: PathBuf,
    /// False when an existing link was found and left untouched.
    pub link_created: bool,
    pub receipt: Option<PathBuf>,
}

/// Sequences resolve, sync, install, build, and publish for one branch.
/// Strictly ordered and single-threaded; the first failing stage halts the
/// run. Concurrent runs against the same slug are not defended against here
/// and must be serialized by the caller.
pub struct Pipeline<'a> {
    config: &'a DeployConfig,
    git: GitClient,
    metrics: MetricsCollector,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a DeployConfig) -> Self {
        let git = GitClient::new(config.ssh_private_key.as_deref());
        Self {
            config,
            git,
            metrics: MetricsCollector::new(),
        }
    }

    pub fn metrics(&self) -> MetricsCollector {
        self.metrics.clone()
    }

    /// Discovery mode: the filtered remote branch listing.
    pub fn list_branches(&self) -> Result<Vec<BranchRef>> {
        RemoteBranchResolver::new(&self.git, self.config).list_branches()
    }

    /// Deploy mode: run the full pipeline for a requested branch identifier.
    pub fn deploy(&self, requested: &str) -> std::result::Result<DeployOutcome, StageFailure> {
        self.metrics.reset();
        let total_start = Instant::now();

        let branch = self.stage(PipelineStage::Resolve, || {
            let resolver = RemoteBranchResolver::new(&self.git, self.config);
            let known = resolver.list_branches()?;
            resolver::validate(requested, &known)
        })?;
        info!(branch = %branch, slug = %branch.slug(), "Branch resolved");

        let workspace = self.stage(PipelineStage::Sync, || {
            WorkspaceSynchronizer::new(&self.git, self.config).sync(&branch)
        })?;

        self.stage(PipelineStage::Install, || {
            DependencyInstaller::new(self.config).install(&workspace)
        })?;

        if self.config.build_targets.is_empty() {
            info!("No build targets configured; skipping build stage");
        } else {
            self.stage(PipelineStage::Build, || {
                BuildRunner::new(self.config).build(&branch, &workspace)
            })?;
        }

        let published = self.stage(PipelineStage::Publish, || {
            PublishManager::new(self.config).publish(&workspace, &branch)
        })?;
        if published.created {
            self.metrics.record_link_created();
        } else {
            self.metrics.record_link_reused();
        }

        let receipt = match receipt::write_receipt(self.config, &branch, &workspace) {
            Ok(path) => Some(path),
            Err(err) => {
                warn!(error = %err, "Failed to write deploy receipt");
                None
            }
        };

        self.metrics.record_total_duration(total_start.elapsed());
        info!(link = %published.link.display(), "Deploy complete");

        Ok(DeployOutcome {
            slug: branch.slug(),
            branch,
            workspace: workspace.path,
            commit: workspace.head,
            link: published.link,
            link_created: published.created,
            receipt,
        })
    }

    fn stage<T>(
        &self,
        stage: PipelineStage,
        run: impl FnOnce() -> Result<T>,
    ) -> std::result::Result<T, StageFailure> {
        let span = tracing::span!(tracing::Level::DEBUG, "stage", stage = stage.as_str());
        let _span_guard = span.enter();
        let _timer = self.metrics.start_stage(stage.as_str());
        run().map_err(|error| {
            error!(stage = stage.as_str(), error = %error, "Pipeline stage failed");
            StageFailure { stage, error }
        })
    }
}
