use std::path::PathBuf;

use crate::process::{CommandRunner, ShellCommand};

use super::parse::parse_version;

pub(crate) fn git_command() -> ShellCommand {
    ShellCommand::new("git")
}

pub fn is_git_command_available() -> bool {
    git_command().is_in_path()
}

pub fn git_command_path() -> Option<PathBuf> {
    git_command().full_path()
}

/// Version reported by `git version`, or `"unknown"`.
pub fn git_command_version() -> String {
    git_command()
        .run(&["version".to_string()])
        .ok()
        .and_then(|output| parse_version(&String::from_utf8_lossy(&output)))
        .unwrap_or_else(|| "unknown".to_string())
}

/// `user.name` from the git configuration, or `"not set"`.
pub fn git_user_name() -> String {
    config_value(&git_command(), "user.name")
}

fn config_value(runner: &dyn CommandRunner, variable: &str) -> String {
    runner
        .run(&["config".to_string(), variable.to_string()])
        .ok()
        .and_then(|output| {
            String::from_utf8_lossy(&output)
                .lines()
                .next()
                .map(|line| line.trim().to_string())
        })
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| "not set".to_string())
}
