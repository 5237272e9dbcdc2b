use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{json, Value};
use tcr_core::{FileDiffs, LogItem, LogItems};
use time::format_description::well_known::Rfc3339;

/// One line per file, `+added -removed path`, followed by a total.
/// Paths below `root` are shown relative to it.
pub fn diff_lines(diffs: &FileDiffs, root: &Path) -> Vec<String> {
    let mut lines: Vec<String> = diffs
        .iter()
        .map(|diff| {
            let path = diff.path.strip_prefix(root).unwrap_or(&diff.path);
            format!(
                "+{} -{} {}",
                diff.added_lines,
                diff.removed_lines,
                path.display()
            )
        })
        .collect();
    lines.push(format!(
        "{} file(s) changed, {} line(s) changed",
        diffs.len(),
        diffs.changed_lines(None)
    ));
    lines
}

pub fn diff_json(diffs: &FileDiffs) -> Value {
    let files: Vec<Value> = diffs
        .iter()
        .map(|diff| {
            json!({
                "path": diff.path.display().to_string(),
                "added_lines": diff.added_lines,
                "removed_lines": diff.removed_lines,
            })
        })
        .collect();
    json!({
        "files": files,
        "changed_lines": diffs.changed_lines(None),
    })
}

/// `<short hash> <date> <subject>` for each item.
pub fn log_lines(items: &LogItems) -> Result<Vec<String>> {
    items
        .iter()
        .map(|item| {
            Ok(format!(
                "{} {} {}",
                short_hash(&item.hash),
                timestamp(item)?,
                subject(&item.message)
            ))
        })
        .collect()
}

pub fn log_json(items: &LogItems) -> Result<Value> {
    let entries = items
        .iter()
        .map(|item| {
            Ok(json!({
                "hash": item.hash,
                "timestamp": timestamp(item)?,
                "message": item.message.trim_end(),
            }))
        })
        .collect::<Result<Vec<Value>>>()?;
    Ok(Value::Array(entries))
}

fn timestamp(item: &LogItem) -> Result<String> {
    item.timestamp
        .format(&Rfc3339)
        .with_context(|| format!("format timestamp of {}", item.hash))
}

fn short_hash(hash: &str) -> &str {
    hash.get(..7).unwrap_or(hash)
}

fn subject(message: &str) -> &str {
    message.lines().next().unwrap_or("").trim_end()
}
