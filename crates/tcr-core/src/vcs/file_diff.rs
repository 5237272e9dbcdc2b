use std::path::{Path, PathBuf};

/// Line-change counts for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub path: PathBuf,
    pub added_lines: usize,
    pub removed_lines: usize,
}

impl FileDiff {
    pub fn new(path: impl Into<PathBuf>, added_lines: usize, removed_lines: usize) -> Self {
        Self {
            path: path.into(),
            added_lines,
            removed_lines,
        }
    }

    pub fn changed_lines(&self) -> usize {
        self.added_lines + self.removed_lines
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDiffs(Vec<FileDiff>);

impl FileDiffs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diff: FileDiff) {
        self.0.push(diff);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FileDiff> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[FileDiff] {
        &self.0
    }

    /// Sums the changed lines of every file accepted by `predicate`,
    /// or of all files when no predicate is given.
    pub fn changed_lines(&self, predicate: Option<&dyn Fn(&Path) -> bool>) -> usize {
        self.0
            .iter()
            .filter(|diff| predicate.map_or(true, |accept| accept(&diff.path)))
            .map(FileDiff::changed_lines)
            .sum()
    }
}

impl From<Vec<FileDiff>> for FileDiffs {
    fn from(diffs: Vec<FileDiff>) -> Self {
        Self(diffs)
    }
}

impl FromIterator<FileDiff> for FileDiffs {
    fn from_iter<I: IntoIterator<Item = FileDiff>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for FileDiffs {
    type Item = FileDiff;
    type IntoIter = std::vec::IntoIter<FileDiff>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a FileDiffs {
    type Item = &'a FileDiff;
    type IntoIter = std::slice::Iter<'a, FileDiff>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
