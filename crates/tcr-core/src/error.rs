use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum VcsError {
    #[error("not a git repository: {0}")]
    NotARepository(PathBuf),
    #[error("directory {dir} does not belong to p4 client root {root}")]
    OutsideWorkspace { dir: PathBuf, root: PathBuf },
    #[error("p4 client name is not set")]
    ClientNotSet,
    #[error("p4 client root is not set")]
    ClientRootNotSet,
    #[error("command not found: {0}")]
    CommandNotFound(String),
    #[error("command failed: {command}: {output}")]
    CommandFailed { command: String, output: String },
    #[error("command pipeline failed: {command}: {output}")]
    PipelineFailed { command: String, output: String },
    #[error("failed to parse {0}")]
    Parse(String),
    #[error("VCS not supported: \"{0}\"")]
    UnsupportedVcs(String),
    #[error("{operation} operation not available for {vcs}")]
    Unsupported {
        vcs: &'static str,
        operation: &'static str,
    },
    #[error("invalid path: {0}")]
    InvalidPath(String),
    #[error("config validation error: {0}")]
    Config(String),
    #[error("toml deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type VcsResult<T> = std::result::Result<T, VcsError>;
