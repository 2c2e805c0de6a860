use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("failed to run 'git {args}': {source}")]
    Spawn {
        args: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'git {args}' exited with status {status}: {stderr}")]
    Exit {
        args: String,
        status: i32,
        stderr: String,
    },
}

/// Thin wrapper over the `git` CLI. Carries the SSH identity, if any, so every
/// network operation runs with the same `GIT_SSH_COMMAND`.
#[derive(Debug, Clone, Default)]
pub struct GitClient {
    ssh_command: Option<OsString>,
}

impl GitClient {
    pub fn new(ssh_private_key: Option<&Path>) -> Self {
        let ssh_command = ssh_private_key.map(|key| {
            let mut command = OsString::from("ssh -o IdentitiesOnly=yes -i ");
            command.push(key);
            command
        });
        Self { ssh_command }
    }

    /// Run a git subcommand in `workdir` and return trimmed stdout.
    pub fn run(&self, workdir: Option<&Path>, args: &[&str]) -> Result<String, GitError> {
        let mut command = Command::new("git");
        command.args(args);
        if let Some(dir) = workdir {
            command.current_dir(dir);
        }
        if let Some(ssh) = &self.ssh_command {
            command.env("GIT_SSH_COMMAND", ssh);
        }

        debug!(args = %args.join(" "), "Running git");
        let output = command.output().map_err(|source| GitError::Spawn {
            args: args.join(" "),
            source,
        })?;

        if !output.status.success() {
            return Err(GitError::Exit {
                args: args.join(" "),
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    pub fn fetch(&self, repo: &Path, remote: &str) -> Result<(), GitError> {
        self.run(Some(repo), &["fetch", remote]).map(|_| ())
    }

    pub fn checkout(&self, repo: &Path, branch: &str) -> Result<(), GitError> {
        self.run(Some(repo), &["checkout", branch]).map(|_| ())
    }

    pub fn reset_hard(&self, repo: &Path, refname: &str) -> Result<(), GitError> {
        self.run(Some(repo), &["reset", "--hard", refname])
            .map(|_| ())
    }

    pub fn clone_into(&self, source: &Path, dest: &Path) -> Result<(), GitError> {
        let source = source.to_string_lossy();
        let dest = dest.to_string_lossy();
        self.run(None, &["clone", source.as_ref(), dest.as_ref()])
            .map(|_| ())
    }

    /// Enumerate remote branch names (`remote/short` form) in git's listing
    /// order, skipping the symbolic `HEAD` entry.
    pub fn remote_branches(&self, repo: &Path) -> Result<Vec<String>, GitError> {
        let listing = self.run(
            Some(repo),
            &["branch", "-r", "--format=%(refname:short)"],
        )?;
        Ok(listing
            .lines()
            .map(str::trim)
            .filter(|name| !name.is_empty() && !name.ends_with("/HEAD"))
            .map(str::to_string)
            .collect())
    }

    /// Resolve the commit SHA a repository currently has checked out.
    pub fn head_commit(&self, repo: &Path) -> Result<String, GitError> {
        let sha = self.run(Some(repo), &["rev-parse", "HEAD"])?;
        if sha.is_empty() {
            return Err(GitError::Exit {
                args: "rev-parse HEAD".to_string(),
                status: 0,
                stderr: "empty output".to_string(),
            });
        }
        Ok(sha)
    }
}
