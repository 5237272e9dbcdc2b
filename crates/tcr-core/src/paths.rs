use std::env;
use std::io;
use std::path::{Path, PathBuf};

/// Returns true when `sub` equals `reference` or is nested below it.
/// An empty reference contains every path.
pub fn is_sub_path_of(sub: &Path, reference: &Path) -> bool {
    relative_to(sub, reference).is_some()
}

/// Remainder of `sub` below `reference`, joined with forward slashes.
/// Returns an empty string when both designate the same directory and
/// `None` when `sub` lies outside `reference`.
///
/// Windows paths compare case-insensitively and accept both separators.
pub fn relative_to(sub: &Path, reference: &Path) -> Option<String> {
    let sub_text = sub.to_string_lossy();
    let reference_text = reference.to_string_lossy();
    let sub_parts = components(&sub_text);
    let reference_parts = components(&reference_text);

    if reference_parts.len() > sub_parts.len() {
        return None;
    }
    let same_prefix = reference_parts
        .iter()
        .zip(&sub_parts)
        .all(|(r, s)| same_component(r, s));
    if !same_prefix {
        return None;
    }
    Some(sub_parts[reference_parts.len()..].join("/"))
}

/// Absolute form of `dir`. Existing directories are canonicalized so that
/// symlinks resolve; others are joined onto the current directory.
pub fn absolute_dir(dir: &Path) -> io::Result<PathBuf> {
    if let Ok(resolved) = dir.canonicalize() {
        return Ok(resolved);
    }
    if dir.is_absolute() {
        Ok(dir.to_path_buf())
    } else {
        Ok(env::current_dir()?.join(dir))
    }
}

fn components(path: &str) -> Vec<&str> {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split(is_separator) {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts
}

#[cfg(windows)]
fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

#[cfg(not(windows))]
fn is_separator(c: char) -> bool {
    c == '/'
}

#[cfg(windows)]
fn same_component(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

#[cfg(not(windows))]
fn same_component(a: &str, b: &str) -> bool {
    a == b
}
