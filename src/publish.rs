use std::path::PathBuf;

use tracing::{info, warn};

use crate::branch::BranchRef;
use crate::config::DeployConfig;
use crate::error::{DeployError, Result};
use crate::workspace::Workspace;

#[derive(Debug, Clone)]
pub struct PublishResult {
    pub link: PathBuf,
    pub target: PathBuf,
    /// False when the link path already existed and was left untouched.
    pub created: bool,
}

/// Exposes a built workspace at `web_root/slug` via a symbolic link.
///
/// Publishing is idempotent by absence, not by content: an existing path at
/// the link location is a successful no-op even when it points elsewhere.
/// Redeploying an already-published slug therefore does not repoint the live
/// link unless the stale link is removed out-of-band.
pub struct PublishManager<'a> {
    config: &'a DeployConfig,
}

impl<'a> PublishManager<'a> {
    pub fn new(config: &'a DeployConfig) -> Self {
        Self { config }
    }

    pub fn publish(&self, workspace: &Workspace, branch: &BranchRef) -> Result<PublishResult> {
        let target = workspace.path.join(&self.config.build_dir);
        let link = self.config.web_root.join(branch.slug());

        // symlink_metadata also sees dangling symlinks, which count as present
        if std::fs::symlink_metadata(&link).is_ok() {
            warn!(
                link = %link.display(),
                "Publish link already exists; leaving it untouched"
            );
            return Ok(PublishResult {
                link,
                target,
                created: false,
            });
        }

        std::os::unix::fs::symlink(&target, &link).map_err(|err| {
            DeployError::Publish(format!(
                "failed to link {} -> {}: {err}",
                link.display(),
                target.display()
            ))
        })?;

        info!(
            link = %link.display(),
            target = %target.display(),
            "Publish link created"
        );

        Ok(PublishResult {
            link,
            target,
            created: true,
        })
    }
}
