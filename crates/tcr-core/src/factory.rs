use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::config::VcsConfig;
use crate::error::{VcsError, VcsResult};
use crate::git::{self, GitBackend};
use crate::p4::{self, P4Backend};
use crate::vcs::Vcs;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VcsKind {
    #[default]
    Git,
    P4,
}

impl VcsKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VcsKind::Git => git::NAME,
            VcsKind::P4 => p4::NAME,
        }
    }
}

impl FromStr for VcsKind {
    type Err = VcsError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_lowercase().as_str() {
            git::NAME => Ok(VcsKind::Git),
            p4::NAME => Ok(VcsKind::P4),
            _ => Err(VcsError::UnsupportedVcs(name.to_string())),
        }
    }
}

impl fmt::Display for VcsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opens a session of the requested VCS on `dir`.
pub fn open(kind: VcsKind, dir: &Path, config: &VcsConfig) -> VcsResult<Box<dyn Vcs>> {
    match kind {
        VcsKind::Git => Ok(Box::new(GitBackend::open(dir, config)?)),
        VcsKind::P4 => Ok(Box::new(P4Backend::open(dir, config)?)),
    }
}

/// Same as [`open`], with the VCS given by name.
pub fn open_by_name(name: &str, dir: &Path, config: &VcsConfig) -> VcsResult<Box<dyn Vcs>> {
    open(name.parse()?, dir, config)
}
