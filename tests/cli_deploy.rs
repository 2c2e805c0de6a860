use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::tempdir;

mod common;
use common::{init_canonical, init_origin};

fn write_config(dir: &Path, canonical: &Path) -> PathBuf {
    let repo_dir = dir.join("workspaces");
    let web_root = dir.join("www");
    fs::create_dir_all(&web_root).unwrap();

    let path = dir.join("acceptance.yaml");
    fs::write(
        &path,
        format!(
            "canonical_repo: \"{}\"\n\
             branch_filter: \"fix-\"\n\
             repo_dir: \"{}\"\n\
             web_root: \"{}\"\n\
             build_dir: web\n\
             install_command: [\"sh\", \"-c\", \"true\"]\n",
            canonical.display(),
            repo_dir.display(),
            web_root.display(),
        ),
    )
    .unwrap();
    path
}

#[test]
fn deploy_creates_publish_link() {
    let temp = tempdir().unwrap();
    let origin = init_origin(temp.path(), &["fix-123"]);
    let canonical = init_canonical(temp.path(), &origin);
    let config = write_config(temp.path(), &canonical);

    let output = Command::cargo_bin("branch-deploy")
        .expect("binary present")
        .args(["deploy", "origin/fix-123", "--config"])
        .arg(&config)
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "deploy failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Build complete"));

    let link = temp.path().join("www").join("fix-123");
    assert_eq!(
        fs::read_link(&link).unwrap(),
        temp.path().join("workspaces").join("fix-123").join("web")
    );
}

#[test]
fn deploy_writes_metrics_json_when_asked() {
    let temp = tempdir().unwrap();
    let origin = init_origin(temp.path(), &["fix-124"]);
    let canonical = init_canonical(temp.path(), &origin);
    let config = write_config(temp.path(), &canonical);
    let metrics_path = temp.path().join("metrics.json");

    Command::cargo_bin("branch-deploy")
        .expect("binary present")
        .args(["deploy", "origin/fix-124", "--config"])
        .arg(&config)
        .arg("--metrics-json")
        .arg(&metrics_path)
        .assert()
        .success();

    let metrics = fs::read_to_string(&metrics_path).unwrap();
    assert!(metrics.contains("\"stages\""));
    assert!(metrics.contains("\"sync\""));
}

#[test]
fn deploy_rejects_unknown_branch() {
    let temp = tempdir().unwrap();
    let origin = init_origin(temp.path(), &["fix-123"]);
    let canonical = init_canonical(temp.path(), &origin);
    let config = write_config(temp.path(), &canonical);

    let output = Command::cargo_bin("branch-deploy")
        .expect("binary present")
        .args(["deploy", "origin/does-not-exist", "--config"])
        .arg(&config)
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("does not exist"));
    assert!(!temp.path().join("www").join("does-not-exist").exists());
}

#[test]
fn dry_run_resolves_without_deploying() {
    let temp = tempdir().unwrap();
    let origin = init_origin(temp.path(), &["fix-125"]);
    let canonical = init_canonical(temp.path(), &origin);
    let config = write_config(temp.path(), &canonical);

    Command::cargo_bin("branch-deploy")
        .expect("binary present")
        .args(["deploy", "origin/fix-125", "--dry-run", "--config"])
        .arg(&config)
        .assert()
        .success();

    assert!(!temp.path().join("workspaces").join("fix-125").exists());
    assert!(!temp.path().join("www").join("fix-125").exists());
}
