use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::VcsConfig;
use crate::error::{VcsError, VcsResult};
use crate::process::CommandRunner;
use crate::vcs::{FileDiffs, LogItems, MessageFilter, Vcs};

use super::command::git_command;
use super::parse::{
    is_clean, parse_log, parse_numstat, parse_porcelain_v2_status, parse_remote_branches,
    parse_remote_names, LOG_FORMAT, REF_FORMAT,
};

pub const NAME: &str = "git";

/// Remote alias used when none is configured.
pub const DEFAULT_REMOTE_NAME: &str = "origin";

const ROOT_BRANCHES: [&str; 2] = ["main", "master"];

/// [`Vcs`] implementation driving the `git` command line on a local clone.
pub struct GitBackend {
    root_dir: PathBuf,
    remote_name: String,
    remote_enabled: bool,
    working_branch: String,
    working_branch_exists_on_remote: bool,
    auto_push_enabled: bool,
    runner: Box<dyn CommandRunner>,
}

impl GitBackend {
    /// Opens the repository containing `dir`.
    pub fn open(dir: &Path, config: &VcsConfig) -> VcsResult<Self> {
        Self::open_with_runner(dir, config, Box::new(git_command()))
    }

    pub fn open_with_runner(
        dir: &Path,
        config: &VcsConfig,
        runner: Box<dyn CommandRunner>,
    ) -> VcsResult<Self> {
        let root_dir = discover_root_dir(dir)?;
        let mut git = Self {
            root_dir,
            remote_name: String::new(),
            remote_enabled: false,
            working_branch: String::new(),
            working_branch_exists_on_remote: false,
            auto_push_enabled: config.auto_push,
            runner,
        };

        git.working_branch = git.retrieve_working_branch()?;

        if git.is_remote_defined(&config.remote_name) {
            git.remote_enabled = true;
            git.remote_name = config.remote_name.clone();
            git.working_branch_exists_on_remote = git.is_working_branch_on_remote()?;
        }

        debug!(
            root = %git.root_dir.display(),
            branch = %git.working_branch,
            remote_enabled = git.remote_enabled,
            on_remote = git.working_branch_exists_on_remote,
            "opened git repository"
        );
        Ok(git)
    }

    pub fn working_branch_exists_on_remote(&self) -> bool {
        self.working_branch_exists_on_remote
    }

    fn retrieve_working_branch(&self) -> VcsResult<String> {
        // Repository with at least one commit
        if let Ok(output) = self.run_git(&["rev-parse", "--abbrev-ref", "HEAD"]) {
            return Ok(first_line(&output));
        }
        // Brand new repository: HEAD points to a branch that does not exist yet
        let output = self.run_git(&["symbolic-ref", "--short", "HEAD"])?;
        Ok(first_line(&output))
    }

    fn is_remote_defined(&self, remote_name: &str) -> bool {
        match self.run_git(&["remote"]) {
            Ok(output) => parse_remote_names(&String::from_utf8_lossy(&output))
                .iter()
                .any(|name| name == remote_name),
            Err(err) => {
                debug!(error = %err, "unable to list git remotes");
                false
            }
        }
    }

    fn is_working_branch_on_remote(&self) -> VcsResult<bool> {
        let output = self.run_git(&["for-each-ref", REF_FORMAT, "refs/remotes"])?;
        let remote_branch = format!("{}/{}", self.remote_name, self.working_branch);
        Ok(parse_remote_branches(&String::from_utf8_lossy(&output))
            .iter()
            .any(|branch| *branch == remote_branch))
    }

    fn nothing_to_commit(&self) -> bool {
        let output = match self.run_git(&["status", "--porcelain=v2", "-z", "--untracked-files=all"]) {
            Ok(output) => output,
            Err(_) => return false,
        };
        parse_porcelain_v2_status(&String::from_utf8_lossy(&output))
            .map(|statuses| is_clean(&statuses))
            .unwrap_or(false)
    }

    fn git_args<S: AsRef<str>>(&self, args: &[S]) -> Vec<String> {
        let mut all = vec!["-C".to_string(), self.root_dir.to_string_lossy().into_owned()];
        all.extend(args.iter().map(|arg| arg.as_ref().to_string()));
        all
    }

    /// Runs git from the repository root and returns its output.
    fn run_git<S: AsRef<str>>(&self, args: &[S]) -> VcsResult<Vec<u8>> {
        self.runner.run(&self.git_args(args))
    }

    /// Runs git from the repository root and traces its output.
    fn trace_git<S: AsRef<str>>(&self, args: &[S]) -> VcsResult<()> {
        self.runner.trace(&self.git_args(args))
    }
}

impl Vcs for GitBackend {
    fn name(&self) -> &'static str {
        NAME
    }

    fn session_summary(&self) -> String {
        format!("{} branch \"{}\"", NAME, self.working_branch)
    }

    fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn remote_name(&self) -> &str {
        &self.remote_name
    }

    fn working_branch(&self) -> &str {
        &self.working_branch
    }

    /// Trivial heuristic: the root branch is called "main" or "master".
    fn is_on_root_branch(&self) -> bool {
        ROOT_BRANCHES.contains(&self.working_branch.as_str())
    }

    fn add(&self, paths: &[PathBuf]) -> VcsResult<()> {
        let mut args = vec!["add".to_string()];
        if paths.is_empty() {
            args.push(".".to_string());
        } else {
            args.extend(paths.iter().map(|p| p.to_string_lossy().into_owned()));
        }
        self.trace_git(&args)
    }

    fn commit(&self, amend: bool, messages: &[String]) -> VcsResult<()> {
        let mut args = vec!["commit".to_string(), "--no-gpg-sign".to_string()];
        if amend {
            args.push("--amend".to_string());
        }
        for message in messages {
            args.push("-m".to_string());
            args.push(message.clone());
        }
        match self.trace_git(&args) {
            Err(err) if self.nothing_to_commit() => {
                debug!(error = %err, "nothing to commit");
                Ok(())
            }
            result => result,
        }
    }

    fn restore(&self, path: &Path) -> VcsResult<()> {
        info!("Reverting {}", path.display());
        let path = path.to_string_lossy();
        self.trace_git(&["checkout", "HEAD", "--", &*path])
    }

    fn revert(&self) -> VcsResult<()> {
        info!("Reverting changes");
        self.trace_git(&["revert", "--no-gpg-sign", "--no-edit", "HEAD"])
    }

    fn push(&mut self) -> VcsResult<()> {
        if !self.remote_enabled {
            return Ok(());
        }
        info!(
            "Pushing changes to {}/{}",
            self.remote_name, self.working_branch
        );
        self.trace_git(&[
            "push",
            "--no-recurse-submodules",
            self.remote_name.as_str(),
            self.working_branch.as_str(),
        ])?;
        self.working_branch_exists_on_remote = true;
        Ok(())
    }

    fn pull(&self) -> VcsResult<()> {
        if !self.working_branch_exists_on_remote || !self.remote_enabled {
            info!("Working locally on branch {}", self.working_branch);
            return Ok(());
        }
        info!(
            "Pulling latest changes from {}/{}",
            self.remote_name, self.working_branch
        );
        self.trace_git(&[
            "pull",
            "--no-recurse-submodules",
            self.remote_name.as_str(),
            self.working_branch.as_str(),
        ])
    }

    fn stash(&self, message: &str) -> VcsResult<()> {
        info!("Stashing changes");
        self.trace_git(&[
            "stash",
            "push",
            "--quiet",
            "--include-untracked",
            "--message",
            message,
        ])
    }

    fn unstash(&self, keep: bool) -> VcsResult<()> {
        info!("Applying stashed changes");
        let action = if keep { "apply" } else { "pop" };
        self.trace_git(&["stash", action, "--quiet"])
    }

    fn diff(&self) -> VcsResult<FileDiffs> {
        let output = self.run_git(&[
            "diff",
            "--numstat",
            "--ignore-cr-at-eol",
            "--ignore-all-space",
            "--ignore-blank-lines",
            "HEAD",
        ])?;
        Ok(parse_numstat(&String::from_utf8_lossy(&output), &self.root_dir))
    }

    fn log(&self, filter: Option<MessageFilter<'_>>) -> VcsResult<LogItems> {
        let output = self.run_git(&["log", "-z", LOG_FORMAT, "HEAD"])?;
        parse_log(&String::from_utf8_lossy(&output), filter)
    }

    fn enable_auto_push(&mut self, flag: bool) {
        if self.auto_push_enabled == flag {
            return;
        }
        self.auto_push_enabled = flag;
        info!(
            "Git auto-push is turned {}",
            if flag { "on" } else { "off" }
        );
    }

    fn is_auto_push_enabled(&self) -> bool {
        self.auto_push_enabled
    }

    fn is_remote_enabled(&self) -> bool {
        self.remote_enabled
    }

    /// A clean `git push --dry-run` hints that the remote accepts pushes.
    fn check_remote_access(&self) -> bool {
        if self.remote_name.is_empty() || self.working_branch.is_empty() || !self.remote_enabled {
            return false;
        }
        self.run_git(&[
            "push",
            "--dry-run",
            self.remote_name.as_str(),
            self.working_branch.as_str(),
        ])
            .is_ok()
    }

    fn supports_emojis(&self) -> bool {
        true
    }
}

/// Walks up from `dir` looking for repository metadata and returns the
/// directory holding it.
fn discover_root_dir(dir: &Path) -> VcsResult<PathBuf> {
    let start = dir
        .canonicalize()
        .map_err(|_| VcsError::NotARepository(dir.to_path_buf()))?;
    start
        .ancestors()
        .find(|candidate| candidate.join(".git").exists())
        .map(Path::to_path_buf)
        .ok_or_else(|| VcsError::NotARepository(dir.to_path_buf()))
}

fn first_line(output: &[u8]) -> String {
    String::from_utf8_lossy(output)
        .lines()
        .next()
        .unwrap_or("")
        .trim()
        .to_string()
}
