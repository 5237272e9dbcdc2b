use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::VcsConfig;
use crate::error::{VcsError, VcsResult};
use crate::paths::{absolute_dir, is_sub_path_of, relative_to};
use crate::process::CommandRunner;
use crate::vcs::{FileDiffs, LogItems, MessageFilter, Vcs};

use super::command::{client_info, p4_command, p4_command_with};
use super::parse::{parse_created_change, parse_diff, parse_last_change, ChangeList};

pub const NAME: &str = "p4";

#[cfg(windows)]
const DESCRIPTION_EOL: &str = "\r\n";
#[cfg(not(windows))]
const DESCRIPTION_EOL: &str = "\n";

/// [`Vcs`] implementation driving the `p4` command line on a client workspace.
///
/// Changes are recorded in server-side changelists: [`Vcs::commit`] opens a
/// pending changelist and submits it, so there is no separate push phase.
pub struct P4Backend {
    base_dir: PathBuf,
    root_dir: PathBuf,
    client_name: String,
    runner: Box<dyn CommandRunner>,
}

impl P4Backend {
    /// Opens the client workspace containing `dir`.
    pub fn open(dir: &Path, config: &VcsConfig) -> VcsResult<Self> {
        Self::open_with_runner(dir, config, Box::new(p4_command()))
    }

    pub fn open_with_runner(
        dir: &Path,
        _config: &VcsConfig,
        runner: Box<dyn CommandRunner>,
    ) -> VcsResult<Self> {
        let base_dir = absolute_dir(dir)?;
        let global = vec!["-d".to_string(), base_dir.to_string_lossy().into_owned()];
        let info = client_info(runner.as_ref(), &global)?;
        let client_name = info.name.ok_or(VcsError::ClientNotSet)?;
        let root_dir = absolute_dir(&info.root.ok_or(VcsError::ClientRootNotSet)?)?;

        if !is_sub_path_of(&base_dir, &root_dir) {
            return Err(VcsError::OutsideWorkspace {
                dir: base_dir,
                root: root_dir,
            });
        }

        debug!(
            root = %root_dir.display(),
            client = %client_name,
            "opened p4 client workspace"
        );
        Ok(Self {
            base_dir,
            root_dir,
            client_name,
            runner,
        })
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Translates a local directory into client syntax, e.g. `//client/sub/...`.
    /// Relative directories are taken from the current directory.
    pub fn to_p4_client_path(&self, dir: &Path) -> VcsResult<String> {
        if dir.as_os_str().is_empty() {
            return Err(VcsError::InvalidPath("can not convert an empty path".to_string()));
        }
        let dir = absolute_dir(dir)?;
        let relative = relative_to(&dir, &self.root_dir).ok_or_else(|| {
            VcsError::InvalidPath(format!(
                "{} is outside p4 root directory {}",
                dir.display(),
                self.root_dir.display()
            ))
        })?;
        if relative.is_empty() {
            Ok(format!("//{}/...", self.client_name))
        } else {
            Ok(format!("//{}/{}/...", self.client_name, relative))
        }
    }

    fn reconcile(&self, paths: &[String]) -> VcsResult<()> {
        let mut args = vec![
            "reconcile".to_string(),
            "-a".to_string(),
            "-e".to_string(),
            "-d".to_string(),
        ];
        if paths.is_empty() {
            args.push(self.to_p4_client_path(&self.base_dir)?);
        } else {
            args.extend(paths.iter().cloned());
        }
        self.trace_p4(&args)
    }

    fn create_change_list(&self, messages: &[String]) -> VcsResult<ChangeList> {
        let change_in = p4_command_with(self.p4_args(&["change", "-i"]));
        let description = description_field(messages);
        let output = self.runner.run_and_pipe(
            &change_in,
            &self.p4_args(&["-Q", "utf8", "--field", description.as_str(), "change", "-o"]),
        )?;
        let trace = String::from_utf8_lossy(&output);
        let change_list = parse_created_change(&trace)?;
        info!("{}", trace.trim());
        Ok(change_list)
    }

    fn submit_change_list(&self, change_list: &ChangeList) -> VcsResult<()> {
        self.trace_p4(&["submit", "-c", change_list.number.as_str()])
    }

    fn last_submitted_change_list(&self) -> VcsResult<ChangeList> {
        let client = format!("@{}", self.client_name);
        let output = self.run_p4(&["changes", "-m1", "-s", "submitted", client.as_str()])?;
        parse_last_change(&String::from_utf8_lossy(&output))
    }

    fn p4_args<S: AsRef<str>>(&self, args: &[S]) -> Vec<String> {
        let mut all = vec![
            "-d".to_string(),
            self.root_dir.to_string_lossy().into_owned(),
            "-c".to_string(),
            self.client_name.clone(),
        ];
        all.extend(args.iter().map(|arg| arg.as_ref().to_string()));
        all
    }

    /// Runs p4 from the client root and returns its output.
    fn run_p4<S: AsRef<str>>(&self, args: &[S]) -> VcsResult<Vec<u8>> {
        self.runner.run(&self.p4_args(args))
    }

    /// Runs p4 from the client root and traces its output.
    fn trace_p4<S: AsRef<str>>(&self, args: &[S]) -> VcsResult<()> {
        self.runner.trace(&self.p4_args(args))
    }
}

impl Vcs for P4Backend {
    fn name(&self) -> &'static str {
        NAME
    }

    fn session_summary(&self) -> String {
        format!("{} client \"{}\"", NAME, self.client_name)
    }

    fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn remote_name(&self) -> &str {
        ""
    }

    fn working_branch(&self) -> &str {
        ""
    }

    fn is_on_root_branch(&self) -> bool {
        false
    }

    /// `reconcile` covers additions, edits and deletions in one call.
    fn add(&self, paths: &[PathBuf]) -> VcsResult<()> {
        let paths: Vec<String> = paths
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        self.reconcile(&paths)
    }

    /// Opens a pending changelist described by `messages`, then submits it.
    /// `amend` has no meaning for submitted changelists and is ignored.
    fn commit(&self, _amend: bool, messages: &[String]) -> VcsResult<()> {
        let change_list = self.create_change_list(messages)?;
        self.submit_change_list(&change_list)
    }

    fn restore(&self, path: &Path) -> VcsResult<()> {
        let path = path.to_string_lossy().into_owned();
        // Newly added files must be opened before p4 can revert them
        if let Err(err) = self.reconcile(std::slice::from_ref(&path)) {
            warn!("{err}");
        }
        self.trace_p4(&["revert", path.as_str()])
    }

    fn revert(&self) -> VcsResult<()> {
        self.rollback_last_commit()
    }

    /// Opens a new changelist undoing the last changelist submitted from this client.
    fn rollback_last_commit(&self) -> VcsResult<()> {
        let change_list = self.last_submitted_change_list()?;
        info!("Undoing changelist {}", change_list.number);
        let range = format!("@{0},@{0}", change_list.number);
        self.trace_p4(&["undo", range.as_str()])
    }

    fn push(&mut self) -> VcsResult<()> {
        Ok(())
    }

    fn pull(&self) -> VcsResult<()> {
        let path = self.to_p4_client_path(&self.base_dir)?;
        self.trace_p4(&["sync", path.as_str()])
    }

    fn stash(&self, _message: &str) -> VcsResult<()> {
        Err(VcsError::Unsupported {
            vcs: NAME,
            operation: "stash",
        })
    }

    fn unstash(&self, _keep: bool) -> VcsResult<()> {
        Err(VcsError::Unsupported {
            vcs: NAME,
            operation: "unstash",
        })
    }

    fn diff(&self) -> VcsResult<FileDiffs> {
        let path = self.to_p4_client_path(&self.base_dir)?;
        let output = self.run_p4(&["diff", "-f", "-Od", "-dl", "-ds", path.as_str()])?;
        parse_diff(&String::from_utf8_lossy(&output))
    }

    fn log(&self, _filter: Option<MessageFilter<'_>>) -> VcsResult<LogItems> {
        Err(VcsError::Unsupported {
            vcs: NAME,
            operation: "log",
        })
    }

    fn enable_auto_push(&mut self, _flag: bool) {
        info!("Perforce auto-push is always on: changes reach the server on submit");
    }

    fn is_auto_push_enabled(&self) -> bool {
        true
    }

    fn is_remote_enabled(&self) -> bool {
        true
    }

    fn check_remote_access(&self) -> bool {
        true
    }

    fn supports_emojis(&self) -> bool {
        false
    }
}

fn description_field(messages: &[String]) -> String {
    let mut field = String::from("Description=");
    for message in messages {
        field.push_str(message);
        field.push_str(DESCRIPTION_EOL);
    }
    field
}
