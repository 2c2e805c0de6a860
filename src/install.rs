use std::process::Command;

use tracing::info;

use crate::config::DeployConfig;
use crate::error::{DeployError, Result};
use crate::process::{self, CommandOutcome};
use crate::workspace::Workspace;

/// Runs the dependency-installation step inside a workspace. The installer is
/// a black box: exit status zero means the workspace is build-ready.
pub struct DependencyInstaller<'a> {
    config: &'a DeployConfig,
}

impl<'a> DependencyInstaller<'a> {
    pub fn new(config: &'a DeployConfig) -> Self {
        Self { config }
    }

    pub fn install(&self, workspace: &Workspace) -> Result<CommandOutcome> {
        let argv = &self.config.install_command;
        let Some((program, args)) = argv.split_first() else {
            return Err(DeployError::Config(
                "install_command must not be empty".to_string(),
            ));
        };

        info!(
            command = %argv.join(" "),
            workspace = %workspace.path.display(),
            "Running dependency install"
        );

        let mut command = Command::new(program);
        command.args(args).current_dir(&workspace.path);

        let outcome =
            process::run_streaming(command, "install").map_err(|source| DeployError::Launch {
                what: "installer",
                program: program.clone(),
                source,
            })?;

        if !outcome.success() {
            return Err(DeployError::Install {
                exit_code: outcome.exit_code,
            });
        }

        Ok(outcome)
    }
}
