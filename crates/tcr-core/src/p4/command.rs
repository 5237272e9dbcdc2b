use std::path::PathBuf;

use crate::error::{VcsError, VcsResult};
use crate::process::{CommandRunner, ShellCommand};

use super::parse::{parse_client_info, parse_set_value, parse_version, ClientInfo};

pub(crate) fn p4_command() -> ShellCommand {
    ShellCommand::new("p4")
}

pub(crate) fn p4_command_with<I, S>(params: I) -> ShellCommand
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    ShellCommand::with_params("p4", params)
}

pub fn is_p4_command_available() -> bool {
    p4_command().is_in_path()
}

pub fn p4_command_path() -> Option<PathBuf> {
    p4_command().full_path()
}

/// Revision reported by `p4 -V`, or `"unknown"`.
pub fn p4_command_version() -> String {
    p4_command()
        .run(&["-V".to_string()])
        .ok()
        .and_then(|output| parse_version(&String::from_utf8_lossy(&output)))
        .unwrap_or_else(|| "unknown".to_string())
}

/// `P4USER` from the p4 environment, or `"not set"`.
pub fn p4_user_name() -> String {
    set_value(&p4_command(), "P4USER").unwrap_or_else(|| "not set".to_string())
}

/// Client workspace name known to the server, or `"not set"`.
pub fn p4_client_name() -> String {
    client_info(&p4_command(), &[])
        .ok()
        .and_then(|info| info.name)
        .unwrap_or_else(|| "not set".to_string())
}

/// Root directory of the current client workspace.
pub fn p4_root_dir() -> VcsResult<PathBuf> {
    client_info(&p4_command(), &[])?
        .root
        .ok_or(VcsError::ClientRootNotSet)
}

/// Runs `p4 info` with the given global options.
pub(crate) fn client_info(runner: &dyn CommandRunner, global: &[String]) -> VcsResult<ClientInfo> {
    let mut args = global.to_vec();
    args.push("info".to_string());
    let output = runner.run(&args)?;
    Ok(parse_client_info(&String::from_utf8_lossy(&output)))
}

fn set_value(runner: &dyn CommandRunner, variable: &str) -> Option<String> {
    let output = runner
        .run(&["set".to_string(), "-q".to_string(), variable.to_string()])
        .ok()?;
    parse_set_value(&String::from_utf8_lossy(&output), variable)
}
