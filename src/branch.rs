use std::fmt;

/// A resolved remote branch: the remote name plus the branch's short name.
///
/// The slug is the filesystem-safe identity of a deployment: workspace
/// directories, publish links, and the derived database name all come from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRef {
    remote: String,
    short_name: String,
}

impl BranchRef {
    /// Parse a fully-qualified remote branch name such as `origin/fix-123`.
    pub fn parse(full_name: &str) -> Option<Self> {
        let (remote, short_name) = full_name.split_once('/')?;
        if remote.is_empty() || short_name.is_empty() {
            return None;
        }
        Some(Self {
            remote: remote.to_string(),
            short_name: short_name.to_string(),
        })
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.remote, self.short_name)
    }

    /// Lowercased short name. Names the workspace directory and publish link,
    /// so branches differing only in case collide on one deployment.
    pub fn slug(&self) -> String {
        self.short_name.to_lowercase()
    }

    /// Database name for this deployment: the short name with every
    /// non-alphanumeric character stripped, lowercased.
    pub fn database_name(&self) -> String {
        self.short_name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase()
    }
}

impl fmt::Display for BranchRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.remote, self.short_name)
    }
}
