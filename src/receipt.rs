use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::branch::BranchRef;
use crate::builder::{self, PropertyWhitelist};
use crate::config::DeployConfig;
use crate::workspace::Workspace;

pub const RECEIPT_FILE: &str = ".deploy-receipt.yaml";

/// Record of a successful deployment, written into the workspace. The resolved
/// property flags are hashed rather than listed so credentials never reach
/// disk in clear text.
#[derive(Debug, Serialize)]
pub struct DeployReceipt {
    pub branch: String,
    pub slug: String,
    pub commit: String,
    pub generated_at: DateTime<Utc>,
    pub targets: Vec<String>,
    pub properties_hash: String,
}

pub fn write_receipt(
    config: &DeployConfig,
    branch: &BranchRef,
    workspace: &Workspace,
) -> Result<PathBuf> {
    let whitelist = PropertyWhitelist::for_branch(branch, config);
    let flags = builder::resolve_properties(config, &whitelist);

    let receipt = DeployReceipt {
        branch: branch.full_name(),
        slug: branch.slug(),
        commit: workspace.head.clone(),
        generated_at: Utc::now(),
        targets: config.build_targets.clone(),
        properties_hash: hash_flags(&flags),
    };

    let path = workspace.path.join(RECEIPT_FILE);
    let file = File::create(&path)
        .with_context(|| format!("Failed to create deploy receipt: {}", path.display()))?;
    serde_yaml::to_writer(file, &receipt)
        .with_context(|| format!("Failed to write deploy receipt: {}", path.display()))?;

    Ok(path)
}

fn hash_flags(flags: &[String]) -> String {
    let mut hasher = Sha256::new();
    for flag in flags {
        hasher.update(flag.as_bytes());
        hasher.update([0]);
    }
    format!("{:x}", hasher.finalize())
}
