use std::path::Path;

use time::OffsetDateTime;

use crate::error::{VcsError, VcsResult};
use crate::vcs::{FileDiff, FileDiffs, LogItem, LogItems};

/// Separates the fields of one `git log` record.
pub const LOG_FIELD_SEPARATOR: char = '\u{1f}';

/// `git log` format matching [`parse_log`]: hash, committer time, raw message.
pub const LOG_FORMAT: &str = "--format=%H%x1f%ct%x1f%B";

/// `git for-each-ref` format matching [`parse_remote_branches`].
pub const REF_FORMAT: &str = "--format=%(refname)%09%(symref)";

const REMOTE_REF_PREFIX: &str = "refs/remotes/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStatus {
    pub path: String,
    pub status: StatusCode,
    pub index_status: char,
    pub worktree_status: char,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Unmodified,
    Modified,
    TypeChanged,
    Added,
    Deleted,
    Renamed,
    Copied,
    Unmerged,
    Untracked,
    Ignored,
}

/// Parses `git diff --numstat` output. Lines that are not exactly
/// `<added>\t<removed>\t<path>` are noise and skipped; binary files
/// (`-` counts) report zero lines.
pub fn parse_numstat(output: &str, root_dir: &Path) -> FileDiffs {
    output
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split('\t').collect();
            let [added, removed, path] = fields.as_slice() else {
                return None;
            };
            Some(FileDiff::new(
                root_dir.join(path),
                added.trim().parse().unwrap_or(0),
                removed.trim().parse().unwrap_or(0),
            ))
        })
        .collect()
}

/// Parses `git status --porcelain=v2 -z` entries.
pub fn parse_porcelain_v2_status(output: &str) -> VcsResult<Vec<FileStatus>> {
    let mut statuses = Vec::new();
    let mut records = output.split('\0');
    while let Some(record) = records.next() {
        if record.is_empty() {
            continue;
        }
        if let Some(entry) = parse_status_entry(record)? {
            // Rename and copy entries carry their original path in the next record.
            if record.starts_with("2 ") {
                records.next();
            }
            statuses.push(entry);
        }
    }
    Ok(statuses)
}

/// A worktree is clean when nothing besides ignored files is reported.
pub fn is_clean(statuses: &[FileStatus]) -> bool {
    statuses
        .iter()
        .all(|status| status.status == StatusCode::Ignored)
}

/// Remote names listed by `git remote`, one per line.
pub fn parse_remote_names(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Short names (`<remote>/<branch>`) of the remote-tracking references
/// listed with [`REF_FORMAT`]. Symbolic references such as
/// `origin/HEAD` are skipped.
pub fn parse_remote_branches(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.splitn(2, '\t');
            let refname = fields.next()?.trim();
            let symref = fields.next().unwrap_or("").trim();
            if !symref.is_empty() {
                return None;
            }
            refname
                .strip_prefix(REMOTE_REF_PREFIX)
                .filter(|short| !short.is_empty())
                .map(str::to_string)
        })
        .collect()
}

/// Parses `git log -z` output produced with [`LOG_FORMAT`], keeping the
/// commits whose message is accepted by `filter`.
pub fn parse_log(output: &str, filter: Option<&dyn Fn(&str) -> bool>) -> VcsResult<LogItems> {
    let mut items = LogItems::new();
    for record in output.split('\0') {
        let record = record.trim_start_matches('\n');
        if record.trim().is_empty() {
            continue;
        }
        let mut fields = record.splitn(3, LOG_FIELD_SEPARATOR);
        let (Some(hash), Some(time), Some(message)) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(VcsError::Parse(format!("git log record: {record:?}")));
        };
        let seconds: i64 = time
            .trim()
            .parse()
            .map_err(|_| VcsError::Parse(format!("git commit time: {time:?}")))?;
        let timestamp = OffsetDateTime::from_unix_timestamp(seconds)
            .map_err(|err| VcsError::Parse(format!("git commit time {seconds}: {err}")))?;
        if filter.map_or(true, |accept| accept(message)) {
            items.push(LogItem::new(hash.trim(), timestamp, message));
        }
    }
    Ok(items)
}

/// First line of `git version` output without its prefix.
pub fn parse_version(output: &str) -> Option<String> {
    output
        .lines()
        .next()
        .and_then(|line| line.trim().strip_prefix("git version "))
        .map(str::to_string)
}

fn parse_status_code(c: char) -> StatusCode {
    match c {
        '.' => StatusCode::Unmodified,
        'M' => StatusCode::Modified,
        'T' => StatusCode::TypeChanged,
        'A' => StatusCode::Added,
        'D' => StatusCode::Deleted,
        'R' => StatusCode::Renamed,
        'C' => StatusCode::Copied,
        'U' => StatusCode::Unmerged,
        '?' => StatusCode::Untracked,
        '!' => StatusCode::Ignored,
        _ => StatusCode::Unmodified,
    }
}

fn tracked_entry(line: &str, fields: usize) -> VcsResult<FileStatus> {
    let mut parts = line.splitn(fields, ' ');
    let _record_type = parts.next();
    let xy = parts.next().unwrap_or("");
    let mut codes = xy.chars();
    let (Some(index_status), Some(worktree_status), None) = (codes.next(), codes.next(), codes.next())
    else {
        return Err(VcsError::Parse(format!("git status code: {xy:?}")));
    };
    let path = parts.last().unwrap_or("").to_string();
    let status = if worktree_status != '.' {
        parse_status_code(worktree_status)
    } else {
        parse_status_code(index_status)
    };
    Ok(FileStatus {
        path,
        status,
        index_status,
        worktree_status,
    })
}

fn parse_status_entry(line: &str) -> VcsResult<Option<FileStatus>> {
    if line.is_empty() || line.starts_with("# ") {
        return Ok(None);
    }
    if line.starts_with("1 ") {
        return tracked_entry(line, 9).map(Some);
    }
    if line.starts_with("2 ") {
        return tracked_entry(line, 10).map(Some);
    }
    if line.starts_with("u ") {
        return tracked_entry(line, 11).map(Some);
    }
    if let Some(path) = line.strip_prefix("? ") {
        return Ok(Some(FileStatus {
            path: path.to_string(),
            status: StatusCode::Untracked,
            index_status: '?',
            worktree_status: '?',
        }));
    }
    if let Some(path) = line.strip_prefix("! ") {
        return Ok(Some(FileStatus {
            path: path.to_string(),
            status: StatusCode::Ignored,
            index_status: '!',
            worktree_status: '!',
        }));
    }
    Ok(None)
}
