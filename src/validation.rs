use serde::Serialize;

use crate::builder::{self, DATABASE_PASSWORD_TOKEN, DATABASE_USER_TOKEN};
use crate::config::DeployConfig;

#[derive(Debug, Default, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

pub fn validate_config(config: &DeployConfig) -> ValidationReport {
    let mut report = ValidationReport::default();

    if config.canonical_repo.as_os_str().is_empty() {
        report
            .errors
            .push("canonical_repo cannot be empty".to_string());
    }
    if config.repo_dir.as_os_str().is_empty() {
        report.errors.push("repo_dir cannot be empty".to_string());
    }
    if config.web_root.as_os_str().is_empty() {
        report.errors.push("web_root cannot be empty".to_string());
    }
    if config.build_dir.trim().is_empty() {
        report.errors.push("build_dir cannot be empty".to_string());
    }
    if config.install_command.is_empty() {
        report
            .errors
            .push("install_command must name a program".to_string());
    }

    if !config.build_targets.is_empty() && config.build_command.trim().is_empty() {
        report
            .errors
            .push("build_command cannot be empty when build targets are configured".to_string());
    }
    if config.build_targets.is_empty() && !config.build_properties.is_empty() {
        report.warnings.push(
            "build_properties are configured but no build targets are; they will be ignored"
                .to_string(),
        );
    }

    for (name, value) in &config.build_properties {
        if value.starts_with("${")
            && value.ends_with('}')
            && !builder::is_placeholder_token(value)
        {
            report.errors.push(format!(
                "Property '{name}' references unknown placeholder '{value}'"
            ));
        }
    }

    let user_referenced = config
        .build_properties
        .values()
        .any(|value| value == DATABASE_USER_TOKEN);
    let password_referenced = config
        .build_properties
        .values()
        .any(|value| value == DATABASE_PASSWORD_TOKEN);

    if user_referenced && config.database_user.is_empty() {
        report.errors.push(format!(
            "A property references {DATABASE_USER_TOKEN} but database_user is empty"
        ));
    }
    if password_referenced && config.database_password.is_empty() {
        report.errors.push(format!(
            "A property references {DATABASE_PASSWORD_TOKEN} but database_password is empty"
        ));
    }
    if !config.database_user.is_empty() && !user_referenced {
        report
            .warnings
            .push("database_user is configured but no property references it".to_string());
    }
    if !config.database_password.is_empty() && !password_referenced {
        report
            .warnings
            .push("database_password is configured but no property references it".to_string());
    }

    if config.branch_filter.is_empty() {
        report
            .warnings
            .push("branch_filter is empty; every remote branch will be deployable".to_string());
    }

    report
}
