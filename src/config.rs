use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Immutable deployment configuration, loaded once per run. No pipeline stage
/// mutates it.
#[derive(Debug, Clone, Deserialize)]
pub struct DeployConfig {
    /// Local mirror working copy of the source repository. Its `origin` remote
    /// is the true upstream; workspaces are cloned from this path.
    pub canonical_repo: PathBuf,
    #[serde(default)]
    pub ssh_private_key: Option<PathBuf>,
    /// Substring filter over fully-qualified remote branch names.
    #[serde(default)]
    pub branch_filter: String,
    /// Root under which per-slug workspaces are created.
    pub repo_dir: PathBuf,
    /// Root under which publish links are created.
    pub web_root: PathBuf,
    /// Relative path within a built workspace that is the publishable artifact.
    pub build_dir: String,
    #[serde(default = "default_install_command")]
    pub install_command: Vec<String>,
    /// Build tool path, relative to the workspace unless absolute.
    #[serde(default = "default_build_command")]
    pub build_command: String,
    /// Buildfile name relative to the workspace.
    #[serde(default = "default_buildfile")]
    pub buildfile: String,
    /// Ordered build target names. Empty means the build stage is skipped.
    #[serde(default)]
    pub build_targets: Vec<String>,
    /// Property name to literal-or-placeholder value.
    #[serde(default)]
    pub build_properties: BTreeMap<String, String>,
    #[serde(default)]
    pub database_user: String,
    #[serde(default)]
    pub database_password: String,
}

fn default_install_command() -> Vec<String> {
    vec!["composer".to_string(), "install".to_string()]
}

fn default_build_command() -> String {
    "vendor/bin/phing".to_string()
}

fn default_buildfile() -> String {
    "build.xml".to_string()
}

impl DeployConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: DeployConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config YAML: {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn load_applies_defaults() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("acceptance.yaml");
        fs::write(
            &path,
            "canonical_repo: /srv/mirror\n\
             repo_dir: /srv/workspaces\n\
             web_root: /srv/www\n\
             build_dir: web\n",
        )
        .unwrap();

        let config = DeployConfig::load(&path).unwrap();
        assert_eq!(config.install_command, vec!["composer", "install"]);
        assert_eq!(config.build_command, "vendor/bin/phing");
        assert_eq!(config.buildfile, "build.xml");
        assert!(config.build_targets.is_empty());
        assert!(config.ssh_private_key.is_none());
        assert_eq!(config.branch_filter, "");
    }

    #[test]
    fn load_reports_missing_file_with_path() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("absent.yaml");
        let err = DeployConfig::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("absent.yaml"));
    }

    #[test]
    fn load_rejects_malformed_yaml() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("broken.yaml");
        fs::write(&path, "canonical_repo: [unterminated").unwrap();
        assert!(DeployConfig::load(&path).is_err());
    }
}
