mod file_diff;
mod log_item;

use std::path::{Path, PathBuf};

pub use file_diff::{FileDiff, FileDiffs};
pub use log_item::{LogItem, LogItems};

use crate::error::VcsResult;

/// Message filter applied by [`Vcs::log`].
pub type MessageFilter<'a> = &'a dyn Fn(&str) -> bool;

/// Operations the TCR workflow needs from a version-control system.
///
/// Calls are synchronous and block until the underlying tool exits.
/// Implementations hold plain, unsynchronized state: callers sharing one
/// instance across threads must serialize access themselves.
pub trait Vcs: Send {
    fn name(&self) -> &'static str;

    /// Short description of the session, e.g. `git branch "main"`.
    fn session_summary(&self) -> String;

    fn root_dir(&self) -> &Path;

    fn remote_name(&self) -> &str;

    fn working_branch(&self) -> &str;

    fn is_on_root_branch(&self) -> bool;

    /// Stages `paths`, or the whole working copy when `paths` is empty.
    fn add(&self, paths: &[PathBuf]) -> VcsResult<()>;

    /// Records staged changes. `amend` is ignored by backends without local commits.
    fn commit(&self, amend: bool, messages: &[String]) -> VcsResult<()>;

    /// Discards local changes on `path`.
    fn restore(&self, path: &Path) -> VcsResult<()>;

    /// Undoes the last commit by recording a new one.
    fn revert(&self) -> VcsResult<()>;

    fn rollback_last_commit(&self) -> VcsResult<()> {
        self.revert()
    }

    fn push(&mut self) -> VcsResult<()>;

    fn pull(&self) -> VcsResult<()>;

    fn stash(&self, message: &str) -> VcsResult<()>;

    /// Re-applies the latest stash, keeping it in the stash list when `keep` is set.
    fn unstash(&self, keep: bool) -> VcsResult<()>;

    fn diff(&self) -> VcsResult<FileDiffs>;

    /// History items whose message is accepted by `filter` (all of them without one).
    /// No ordering is guaranteed.
    fn log(&self, filter: Option<MessageFilter<'_>>) -> VcsResult<LogItems>;

    fn enable_auto_push(&mut self, flag: bool);

    fn is_auto_push_enabled(&self) -> bool;

    fn is_remote_enabled(&self) -> bool;

    fn check_remote_access(&self) -> bool;

    fn supports_emojis(&self) -> bool;
}
