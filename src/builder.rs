use std::path::PathBuf;
use std::process::Command;

use tracing::info;

use crate::branch::BranchRef;
use crate::config::DeployConfig;
use crate::error::{DeployError, Result};
use crate::process::{self, CommandOutcome};
use crate::workspace::Workspace;

pub const DATABASE_NAME_TOKEN: &str = "${database_name}";
pub const DATABASE_USER_TOKEN: &str = "${database_user}";
pub const DATABASE_PASSWORD_TOKEN: &str = "${database_password}";

pub fn is_placeholder_token(value: &str) -> bool {
    matches!(
        value,
        DATABASE_NAME_TOKEN | DATABASE_USER_TOKEN | DATABASE_PASSWORD_TOKEN
    )
}

/// Closed mapping from the three recognized placeholder tokens to their
/// resolved values. A property value that is not byte-for-byte one of the
/// tokens passes through unchanged, so config-supplied properties can never
/// reach a secret they were not explicitly mapped to.
#[derive(Debug, Clone)]
pub struct PropertyWhitelist {
    database_name: String,
    database_user: String,
    database_password: String,
}

impl PropertyWhitelist {
    pub fn for_branch(branch: &BranchRef, config: &DeployConfig) -> Self {
        Self {
            database_name: branch.database_name(),
            database_user: config.database_user.clone(),
            database_password: config.database_password.clone(),
        }
    }

    pub fn resolve<'a>(&'a self, raw: &'a str) -> &'a str {
        match raw {
            DATABASE_NAME_TOKEN => &self.database_name,
            DATABASE_USER_TOKEN => &self.database_user,
            DATABASE_PASSWORD_TOKEN => &self.database_password,
            _ => raw,
        }
    }
}

/// Render the configured properties as `-Dname=value` flags, substituting
/// whitelisted placeholder values.
pub fn resolve_properties(config: &DeployConfig, whitelist: &PropertyWhitelist) -> Vec<String> {
    config
        .build_properties
        .iter()
        .map(|(name, value)| format!("-D{}={}", name, whitelist.resolve(value)))
        .collect()
}

pub struct BuildRunner<'a> {
    config: &'a DeployConfig,
}

impl<'a> BuildRunner<'a> {
    pub fn new(config: &'a DeployConfig) -> Self {
        Self { config }
    }

    /// Invoke the build tool once with all resolved properties and the full
    /// ordered target list. Returns `None` when no targets are configured.
    pub fn build(
        &self,
        branch: &BranchRef,
        workspace: &Workspace,
    ) -> Result<Option<CommandOutcome>> {
        if self.config.build_targets.is_empty() {
            info!("No build targets configured; skipping build");
            return Ok(None);
        }

        let whitelist = PropertyWhitelist::for_branch(branch, self.config);
        let properties = resolve_properties(self.config, &whitelist);
        let program = self.build_program(workspace);
        let buildfile = workspace.path.join(&self.config.buildfile);

        info!(
            command = %program.display(),
            targets = ?self.config.build_targets,
            "Running build targets"
        );

        let mut command = Command::new(&program);
        command
            .arg("-buildfile")
            .arg(&buildfile)
            .args(&properties)
            .args(&self.config.build_targets)
            .current_dir(&workspace.path);

        let outcome = process::run_streaming(command, "build").map_err(|source| {
            DeployError::Launch {
                what: "build tool",
                program: program.display().to_string(),
                source,
            }
        })?;

        if !outcome.success() {
            return Err(DeployError::Build {
                exit_code: outcome.exit_code,
                output: outcome.output,
            });
        }

        Ok(Some(outcome))
    }

    fn build_program(&self, workspace: &Workspace) -> PathBuf {
        let configured = PathBuf::from(&self.config.build_command);
        if configured.is_absolute() {
            configured
        } else {
            workspace.path.join(configured)
        }
    }
}
