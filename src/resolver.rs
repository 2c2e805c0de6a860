use tracing::debug;

use crate::branch::BranchRef;
use crate::config::DeployConfig;
use crate::error::{DeployError, Result};
use crate::git::GitClient;

/// Lists remote branches through the canonical mirror and validates deploy
/// requests against that list.
pub struct RemoteBranchResolver<'a> {
    git: &'a GitClient,
    config: &'a DeployConfig,
}

impl<'a> RemoteBranchResolver<'a> {
    pub fn new(git: &'a GitClient, config: &'a DeployConfig) -> Self {
        Self { git, config }
    }

    /// Fetch the remote, then enumerate remote branches whose fully-qualified
    /// name contains the configured filter substring. Fetching first means the
    /// listing reflects the remote as of this call, not a stale local cache.
    pub fn list_branches(&self) -> Result<Vec<BranchRef>> {
        self.git.fetch(&self.config.canonical_repo, "origin")?;
        let names = self.git.remote_branches(&self.config.canonical_repo)?;
        debug!(total = names.len(), filter = %self.config.branch_filter, "Remote branches listed");

        Ok(names
            .iter()
            .filter(|name| name.contains(&self.config.branch_filter))
            .filter_map(|name| BranchRef::parse(name))
            .collect())
    }
}

/// Validate a requested branch identifier against the known list. The match is
/// byte-for-byte: a requested value that is not literally present is rejected,
/// so a caller-supplied name can never select a branch through a looser match.
pub fn validate(requested: &str, known: &[BranchRef]) -> Result<BranchRef> {
    known
        .iter()
        .find(|branch| branch.full_name() == requested)
        .cloned()
        .ok_or_else(|| DeployError::BranchNotFound {
            requested: requested.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known() -> Vec<BranchRef> {
        ["origin/fix-123", "origin/fix-124", "origin/main"]
            .iter()
            .map(|name| BranchRef::parse(name).unwrap())
            .collect()
    }

    #[test]
    fn validate_returns_exact_match() {
        let branch = validate("origin/fix-123", &known()).unwrap();
        assert_eq!(branch.full_name(), "origin/fix-123");
    }

    #[test]
    fn validate_rejects_absent_branch() {
        let err = validate("origin/does-not-exist", &known()).unwrap_err();
        match err {
            DeployError::BranchNotFound { requested } => {
                assert_eq!(requested, "origin/does-not-exist");
            }
            other => panic!("expected BranchNotFound, got {other:?}"),
        }
    }

    #[test]
    fn validate_does_not_fuzzy_match() {
        // prefixes, case variants, and short names are all rejected
        assert!(validate("origin/fix", &known()).is_err());
        assert!(validate("origin/FIX-123", &known()).is_err());
        assert!(validate("fix-123", &known()).is_err());
    }
}
