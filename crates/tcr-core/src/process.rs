use std::fmt;
use std::io::{ErrorKind, Read};
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::thread;

use tracing::{debug, info};

use crate::error::{VcsError, VcsResult};

/// Target used for the output of traced commands.
pub const TRACE_TARGET: &str = "tcr::vcs::trace";

/// Capability for running one external tool. Backends receive it at
/// construction so that tests can substitute a recording fake.
pub trait CommandRunner: Send + Sync {
    /// Runs the command with `args` appended and returns stdout followed by stderr.
    /// A non-zero exit status is an error.
    fn run(&self, args: &[String]) -> VcsResult<Vec<u8>>;

    /// Runs the command with `args` appended and pipes its stdout into `to`.
    /// Returns the combined output of `to`. A failure at either stage yields
    /// a single [`VcsError::PipelineFailed`].
    fn run_and_pipe(&self, to: &ShellCommand, args: &[String]) -> VcsResult<Vec<u8>>;

    /// Same as [`CommandRunner::run`], with the output forwarded to the trace target.
    fn trace(&self, args: &[String]) -> VcsResult<()> {
        report(self.run(args))
    }

    /// Same as [`CommandRunner::run_and_pipe`], with the output forwarded to the trace target.
    fn trace_and_pipe(&self, to: &ShellCommand, args: &[String]) -> VcsResult<()> {
        report(self.run_and_pipe(to, args))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    name: String,
    params: Vec<String>,
}

impl ShellCommand {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    pub fn with_params<I, S>(name: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            params: params.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn is_in_path(&self) -> bool {
        which::which(&self.name).is_ok()
    }

    pub fn full_path(&self) -> Option<PathBuf> {
        which::which(&self.name).ok()
    }

    /// Command line as it would be typed, including `extra` arguments.
    pub fn command_line(&self, extra: &[String]) -> String {
        let mut line = self.name.clone();
        for param in self.params.iter().chain(extra) {
            line.push(' ');
            line.push_str(param);
        }
        line
    }

    fn build(&self, extra: &[String]) -> Command {
        let mut command = Command::new(&self.name);
        command.args(&self.params).args(extra);
        command
    }

    fn spawn_error(&self, err: std::io::Error) -> VcsError {
        if err.kind() == ErrorKind::NotFound {
            VcsError::CommandNotFound(self.name.clone())
        } else {
            VcsError::Io(err)
        }
    }
}

impl fmt::Display for ShellCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line(&[]))
    }
}

impl CommandRunner for ShellCommand {
    fn run(&self, args: &[String]) -> VcsResult<Vec<u8>> {
        let line = self.command_line(args);
        debug!(command = %line, "running command");
        let output = self
            .build(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|err| self.spawn_error(err))?;

        let combined = combined_output(&output);
        if !output.status.success() {
            return Err(VcsError::CommandFailed {
                command: line,
                output: String::from_utf8_lossy(&combined).into_owned(),
            });
        }
        Ok(combined)
    }

    fn run_and_pipe(&self, to: &ShellCommand, args: &[String]) -> VcsResult<Vec<u8>> {
        let line = format!("{} | {}", self.command_line(args), to);
        debug!(command = %line, "running command pipeline");

        let mut upstream = self
            .build(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| self.spawn_error(err))?;

        let Some(pipe) = upstream.stdout.take() else {
            let _ = upstream.kill();
            let _ = upstream.wait();
            return Err(VcsError::PipelineFailed {
                command: line,
                output: "upstream command has no stdout".to_string(),
            });
        };

        let downstream = match to
            .build(&[])
            .stdin(Stdio::from(pipe))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(err) => {
                let _ = upstream.kill();
                let _ = upstream.wait();
                return Err(to.spawn_error(err));
            }
        };

        // Upstream stderr is drained on its own thread while both children run
        let upstream_stderr = upstream.stderr.take();
        let stderr_reader = thread::spawn(move || {
            let mut buffer = Vec::new();
            if let Some(mut stderr) = upstream_stderr {
                let _ = stderr.read_to_end(&mut buffer);
            }
            buffer
        });

        let downstream = downstream.wait_with_output();
        let upstream_status = upstream.wait();
        let upstream_stderr = stderr_reader.join().unwrap_or_default();
        let downstream = downstream?;
        let upstream_status = upstream_status?;

        let combined = combined_output(&downstream);
        if !upstream_status.success() || !downstream.status.success() {
            let mut text = String::from_utf8_lossy(&combined).into_owned();
            text.push_str(&String::from_utf8_lossy(&upstream_stderr));
            return Err(VcsError::PipelineFailed {
                command: line,
                output: text,
            });
        }
        Ok(combined)
    }
}

fn combined_output(output: &Output) -> Vec<u8> {
    let mut combined = output.stdout.clone();
    combined.extend_from_slice(&output.stderr);
    combined
}

fn report(result: VcsResult<Vec<u8>>) -> VcsResult<()> {
    match result {
        Ok(output) => {
            report_text(&String::from_utf8_lossy(&output));
            Ok(())
        }
        Err(err) => {
            if let VcsError::CommandFailed { output, .. } | VcsError::PipelineFailed { output, .. } =
                &err
            {
                report_text(output);
            }
            Err(err)
        }
    }
}

fn report_text(text: &str) {
    for line in text.lines().filter(|line| !line.trim().is_empty()) {
        info!(target: TRACE_TARGET, "{line}");
    }
}
