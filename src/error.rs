use std::fmt;

use thiserror::Error;

use crate::git::GitError;

/// Phase of workspace synchronization a git failure occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStage {
    Fetch,
    Clone,
    Checkout,
    Reset,
    Inspect,
}

impl SyncStage {
    pub fn as_str(self) -> &'static str {
        match self {
            SyncStage::Fetch => "fetch",
            SyncStage::Clone => "clone",
            SyncStage::Checkout => "checkout",
            SyncStage::Reset => "reset",
            SyncStage::Inspect => "inspect",
        }
    }
}

impl fmt::Display for SyncStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("branch '{requested}' does not exist on the remote")]
    BranchNotFound { requested: String },

    #[error("workspace sync failed during {stage}: {source}")]
    Sync {
        stage: SyncStage,
        #[source]
        source: GitError,
    },

    #[error("failed to launch {what} '{program}': {source}")]
    Launch {
        what: &'static str,
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("dependency install exited with status {exit_code}")]
    Install { exit_code: i32 },

    #[error("build exited with status {exit_code}")]
    Build { exit_code: i32, output: String },

    #[error("publish failed: {0}")]
    Publish(String),

    #[error(transparent)]
    Git(#[from] GitError),
}

pub type Result<T> = std::result::Result<T, DeployError>;
