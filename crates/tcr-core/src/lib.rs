pub mod commit_message;
pub mod config;
pub mod error;
pub mod factory;
pub mod git;
pub mod p4;
pub mod paths;
pub mod process;
pub mod vcs;

#[cfg(test)]
mod testing;

pub use commit_message::{message_builder, MessageBuilder};
pub use config::VcsConfig;
pub use error::{VcsError, VcsResult};
pub use factory::{open, open_by_name, VcsKind};
pub use git::GitBackend;
pub use p4::P4Backend;
pub use process::{CommandRunner, ShellCommand};
pub use vcs::{FileDiff, FileDiffs, LogItem, LogItems, MessageFilter, Vcs};
