mod backend;
mod command;
pub mod parse;

pub use backend::{GitBackend, DEFAULT_REMOTE_NAME, NAME};
pub use command::{git_command_path, git_command_version, git_user_name, is_git_command_available};
