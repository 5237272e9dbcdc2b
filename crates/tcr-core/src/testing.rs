use std::sync::{Arc, Mutex};

use crate::error::{VcsError, VcsResult};
use crate::process::{CommandRunner, ShellCommand};

type Responder = dyn Fn(&[String]) -> VcsResult<Vec<u8>> + Send + Sync;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FakeCall {
    pub args: Vec<String>,
    pub piped_to: Option<ShellCommand>,
}

/// Records every invocation and answers with a scripted responder.
#[derive(Clone)]
pub(crate) struct FakeRunner {
    calls: Arc<Mutex<Vec<FakeCall>>>,
    responder: Arc<Responder>,
}

impl FakeRunner {
    pub fn new(responder: impl Fn(&[String]) -> VcsResult<Vec<u8>> + Send + Sync + 'static) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            responder: Arc::new(responder),
        }
    }

    pub fn succeeding() -> Self {
        Self::new(|_| Ok(Vec::new()))
    }

    pub fn calls(&self) -> Vec<FakeCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_args(&self) -> Vec<String> {
        self.calls().last().map(|c| c.args.clone()).unwrap_or_default()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, args: &[String], piped_to: Option<&ShellCommand>) {
        self.calls.lock().unwrap().push(FakeCall {
            args: args.to_vec(),
            piped_to: piped_to.cloned(),
        });
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, args: &[String]) -> VcsResult<Vec<u8>> {
        self.record(args, None);
        (self.responder)(args)
    }

    fn run_and_pipe(&self, to: &ShellCommand, args: &[String]) -> VcsResult<Vec<u8>> {
        self.record(args, Some(to));
        (self.responder)(args)
    }
}

pub(crate) fn failure(output: &str) -> VcsError {
    VcsError::CommandFailed {
        command: "fake".to_string(),
        output: output.to_string(),
    }
}

/// True when `args` contains `needle` as a contiguous run.
pub(crate) fn has_args(args: &[String], needle: &[&str]) -> bool {
    args.windows(needle.len())
        .any(|window| window.iter().zip(needle).all(|(a, b)| a == b))
}
