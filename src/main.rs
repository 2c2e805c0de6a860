use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use branch_deploy::config::DeployConfig;
use branch_deploy::observability::log_snapshot;
use branch_deploy::pipeline::Pipeline;
use branch_deploy::resolver;
use branch_deploy::validation::validate_config;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use serde_json::to_writer_pretty;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, prelude::*};

fn main() -> Result<()> {
    let cli = Cli::parse();
    configure_tracing()?;

    match cli.command {
        Commands::Deploy {
            branch,
            config,
            dry_run,
            print_metrics,
            metrics_json,
        } => deploy(branch, config, dry_run, print_metrics, metrics_json),
        Commands::Branches { config } => list_branches(config),
        Commands::Validate { config } => validate(config),
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            let name = command.get_name().to_string();
            clap_complete::generate(shell, &mut command, name, &mut io::stdout());
            Ok(())
        }
    }
}

fn configure_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|err| anyhow!(err.to_string()))?;
    Ok(())
}

fn load_config(path: &Path) -> Result<DeployConfig> {
    let config = DeployConfig::load(path)?;
    let report = validate_config(&config);

    for warning in &report.warnings {
        warn!(file = %path.display(), "{warning}");
    }
    if !report.is_ok() {
        for message in &report.errors {
            error!(file = %path.display(), "{message}");
        }
        bail!(
            "Configuration failed validation with {} error(s)",
            report.errors.len()
        );
    }

    Ok(config)
}

fn deploy(
    branch: String,
    config_path: PathBuf,
    dry_run: bool,
    print_metrics: bool,
    metrics_json: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(&config_path)?;
    let pipeline = Pipeline::new(&config);

    if dry_run {
        let known = pipeline.list_branches()?;
        let resolved = resolver::validate(&branch, &known)?;
        info!(
            branch = %resolved,
            slug = %resolved.slug(),
            workspace = %config.repo_dir.join(resolved.slug()).display(),
            link = %config.web_root.join(resolved.slug()).display(),
            targets = ?config.build_targets,
            "Dry run: deployment plan resolved"
        );
        return Ok(());
    }

    let outcome = pipeline
        .deploy(&branch)
        .map_err(|failure| anyhow!("{failure}"))?;
    println!("Build complete: {}", outcome.link.display());
    if !outcome.link_created {
        warn!(
            link = %outcome.link.display(),
            "Link already existed and was not repointed; remove it and redeploy to refresh"
        );
    }

    if print_metrics || metrics_json.is_some() {
        let snapshot = pipeline.metrics().snapshot();
        if print_metrics {
            log_snapshot(&snapshot);
        }
        if let Some(path) = metrics_json {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create metrics directory: {}", parent.display())
                })?;
            }
            let file = File::create(&path)
                .with_context(|| format!("Failed to create metrics file: {}", path.display()))?;
            to_writer_pretty(file, &snapshot)
                .with_context(|| format!("Failed to write metrics JSON: {}", path.display()))?;
            info!(metrics = %path.display(), "Metrics JSON written");
        }
    }

    Ok(())
}

fn list_branches(config_path: PathBuf) -> Result<()> {
    let config = load_config(&config_path)?;
    let pipeline = Pipeline::new(&config);
    let branches = pipeline.list_branches()?;

    if branches.is_empty() {
        println!("No suitable branches found to deploy.");
        return Ok(());
    }
    for branch in &branches {
        println!("{branch}");
    }
    Ok(())
}

fn validate(config_path: PathBuf) -> Result<()> {
    let config = DeployConfig::load(&config_path)?;
    let report = validate_config(&config);

    for warning in &report.warnings {
        warn!(file = %config_path.display(), "{warning}");
    }
    if report.is_ok() {
        info!(file = %config_path.display(), "Configuration validation passed");
        Ok(())
    } else {
        for message in &report.errors {
            error!(file = %config_path.display(), "{message}");
        }
        Err(anyhow!(
            "Configuration validation failed with {} error(s)",
            report.errors.len()
        ))
    }
}

#[derive(Parser)]
#[command(
    name = "branch-deploy",
    version,
    about = "Deploys branches of a source repository into published acceptance environments"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy one branch: resolve, sync, install, build, publish
    Deploy {
        /// Fully-qualified remote branch, e.g. origin/fix-123
        branch: String,
        #[arg(long, default_value = "acceptance.yaml")]
        config: PathBuf,
        /// Resolve the branch and print the plan without running anything
        #[arg(long)]
        dry_run: bool,
        #[arg(long)]
        print_metrics: bool,
        #[arg(long = "metrics-json")]
        metrics_json: Option<PathBuf>,
    },
    /// List remote branches matching the configured filter
    Branches {
        #[arg(long, default_value = "acceptance.yaml")]
        config: PathBuf,
    },
    /// Check a configuration file without touching the repository
    Validate {
        #[arg(long, default_value = "acceptance.yaml")]
        config: PathBuf,
    },
    /// Emit a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}
