#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;

use branch_deploy::DeployConfig;

pub fn run_git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

pub fn git_output(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Upstream repository with a `main` branch, a `web/` artifact directory, and
/// the given extra branches.
pub fn init_origin(root: &Path, branches: &[&str]) -> PathBuf {
    let origin = root.join("origin");
    fs::create_dir_all(&origin).unwrap();
    run_git(&origin, &["init", "-b", "main"]);
    run_git(&origin, &["config", "user.name", "fixture"]);
    run_git(&origin, &["config", "user.email", "fixture@example.com"]);
    fs::create_dir_all(origin.join("web")).unwrap();
    fs::write(origin.join("web").join("index.html"), "<h1>acceptance</h1>\n").unwrap();
    run_git(&origin, &["add", "."]);
    run_git(&origin, &["commit", "-m", "initial"]);
    for branch in branches {
        run_git(&origin, &["branch", branch]);
    }
    origin
}

/// Canonical mirror working copy whose `origin` remote is the upstream repo.
pub fn init_canonical(root: &Path, origin: &Path) -> PathBuf {
    let canonical = root.join("canonical");
    run_git(
        root,
        &[
            "clone",
            origin.to_str().unwrap(),
            canonical.to_str().unwrap(),
        ],
    );
    canonical
}

/// Write an executable shell script and return its path.
pub fn write_script(path: &Path, body: &str) -> PathBuf {
    fs::write(path, body).unwrap();
    let mut perms = fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).unwrap();
    path.to_path_buf()
}

pub fn base_config(root: &Path, canonical: PathBuf) -> DeployConfig {
    let web_root = root.join("www");
    fs::create_dir_all(&web_root).unwrap();
    DeployConfig {
        canonical_repo: canonical,
        ssh_private_key: None,
        branch_filter: String::new(),
        repo_dir: root.join("workspaces"),
        web_root,
        build_dir: "web".to_string(),
        install_command: vec!["true".to_string()],
        build_command: "vendor/bin/phing".to_string(),
        buildfile: "build.xml".to_string(),
        build_targets: Vec::new(),
        build_properties: Default::default(),
        database_user: String::new(),
        database_password: String::new(),
    }
}
