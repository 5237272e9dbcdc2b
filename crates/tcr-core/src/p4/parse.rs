use std::path::PathBuf;

use crate::error::{VcsError, VcsResult};
use crate::vcs::{FileDiff, FileDiffs};

const UNKNOWN: &str = "*unknown*";

/// Pending or submitted changelist, identified by its server-assigned number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeList {
    pub number: String,
}

/// Client workspace details reported by `p4 info`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub name: Option<String>,
    pub root: Option<PathBuf>,
}

/// Parses `p4 diff -f -Od -dl -ds` output.
///
/// Each file starts with `==== <depot path>#<rev> - <local path> ====`
/// followed by summary lines:
///
/// ```text
/// add <n> chunks <lines> lines
/// deleted <n> chunks <lines> lines
/// changed <n> chunks <added> / <removed> lines
/// ```
pub fn parse_diff(output: &str) -> VcsResult<FileDiffs> {
    let mut diffs = FileDiffs::new();
    let mut current: Option<FileDiff> = None;

    for line in output.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        if let Some(path) = parse_header(line) {
            if let Some(done) = current.take() {
                diffs.push(done);
            }
            current = Some(FileDiff::new(path, 0, 0));
            continue;
        }
        let Some(file) = current.as_mut() else {
            return Err(VcsError::Parse(format!("p4 diff output: {line}")));
        };
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            ["add", _, "chunks", lines, "lines"] => {
                file.added_lines += count(lines, line)?;
            }
            ["deleted", _, "chunks", lines, "lines"] => {
                file.removed_lines += count(lines, line)?;
            }
            ["changed", _, "chunks", added, "/", removed, "lines"] => {
                file.added_lines += count(added, line)?;
                file.removed_lines += count(removed, line)?;
            }
            _ => return Err(VcsError::Parse(format!("p4 diff output: {line}"))),
        }
    }
    if let Some(done) = current {
        diffs.push(done);
    }
    Ok(diffs)
}

/// Extracts the changelist number from the acknowledgement of `p4 change -i`,
/// e.g. `Change 1234 created.`
pub fn parse_created_change(output: &str) -> VcsResult<ChangeList> {
    let words: Vec<&str> = output.split_whitespace().collect();
    words
        .windows(3)
        .find_map(|window| match window {
            ["Change", number, created] if is_number(number) && created.starts_with("created") => {
                Some(ChangeList {
                    number: number.to_string(),
                })
            }
            _ => None,
        })
        .ok_or_else(|| VcsError::Parse(format!("p4 change trace: {}", output.trim())))
}

/// Extracts the changelist number from one line of `p4 changes -m1`, e.g.
/// `Change 1234 on 2024/01/31 by user@client 'description'`.
pub fn parse_last_change(output: &str) -> VcsResult<ChangeList> {
    let tokens: Vec<&str> = output.split_whitespace().collect();
    match tokens.as_slice() {
        [] => Err(VcsError::Parse("p4 changes: no submitted changelist found".to_string())),
        ["Change", number, "on", _, "by", ..] if is_number(number) => Ok(ChangeList {
            number: number.to_string(),
        }),
        _ => Err(VcsError::Parse(format!("p4 changes output: {}", output.trim()))),
    }
}

/// Reads `Client name:` and `Client root:` from `p4 info` output.
pub fn parse_client_info(output: &str) -> ClientInfo {
    let mut info = ClientInfo::default();
    for line in output.lines() {
        if let Some(name) = line.strip_prefix("Client name:") {
            info.name = known(name).map(str::to_string);
        } else if let Some(root) = line.strip_prefix("Client root:") {
            info.root = known(root).map(PathBuf::from);
        }
    }
    info
}

/// Revision from `p4 -V`: the remainder of the line starting with `Rev. `.
pub fn parse_version(output: &str) -> Option<String> {
    output
        .lines()
        .find_map(|line| line.strip_prefix("Rev. "))
        .map(|rev| rev.trim().to_string())
}

/// Value of `p4 set -q <variable>` output (`<variable>=<value>`).
pub fn parse_set_value(output: &str, variable: &str) -> Option<String> {
    let line = output.lines().next()?.trim();
    let value = line.strip_prefix(variable)?.strip_prefix('=')?;
    // `p4 set` without -q appends the origin, e.g. " (config)"
    let value = value.split(" (").next().unwrap_or(value).trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn parse_header(line: &str) -> Option<&str> {
    let inner = line.strip_prefix("==== ")?.strip_suffix(" ====")?;
    let (_depot, local) = inner.split_once(" - ")?;
    Some(local.trim())
}

fn count(value: &str, line: &str) -> VcsResult<usize> {
    value
        .parse()
        .map_err(|_| VcsError::Parse(format!("p4 diff line count in: {line}")))
}

fn is_number(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

fn known(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty() && value != UNKNOWN).then_some(value)
}
