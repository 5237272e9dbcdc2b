use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::Deserialize;

use crate::error::{VcsError, VcsResult};
use crate::factory::VcsKind;
use crate::git::DEFAULT_REMOTE_NAME;

/// Settings applied when a VCS session is opened.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VcsConfig {
    pub vcs: VcsKind,
    pub remote_name: String,
    pub auto_push: bool,
}

impl Default for VcsConfig {
    fn default() -> Self {
        Self {
            vcs: VcsKind::Git,
            remote_name: DEFAULT_REMOTE_NAME.to_string(),
            auto_push: false,
        }
    }
}

impl VcsConfig {
    /// `<config dir>/tcr/vcs.toml`, when a home directory can be resolved.
    pub fn default_path() -> Option<PathBuf> {
        BaseDirs::new().map(|base| base.config_dir().join("tcr").join("vcs.toml"))
    }

    pub fn load_from(path: &Path) -> VcsResult<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` when it exists, falling back to defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> VcsResult<Self> {
        match path {
            Some(path) if path.exists() => Self::load_from(path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> VcsResult<()> {
        if self.remote_name.trim().is_empty() {
            return Err(VcsError::Config("remote_name must not be empty".to_string()));
        }
        if self.remote_name.chars().any(char::is_whitespace) {
            return Err(VcsError::Config(format!(
                "remote_name '{}' must not contain whitespace",
                self.remote_name
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_target_git_origin_without_auto_push() {
        let cfg = VcsConfig::default();
        assert_eq!(cfg.vcs, VcsKind::Git);
        assert_eq!(cfg.remote_name, "origin");
        assert!(!cfg.auto_push);
    }

    #[test]
    fn load_from_reads_toml_and_fills_missing_fields() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("vcs.toml");
        fs::write(&path, "vcs = \"p4\"\nauto_push = true\n").unwrap();

        let cfg = VcsConfig::load_from(&path).expect("load");
        assert_eq!(cfg.vcs, VcsKind::P4);
        assert!(cfg.auto_push);
        assert_eq!(cfg.remote_name, "origin");
    }

    #[test]
    fn load_from_rejects_blank_remote_name() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("vcs.toml");
        fs::write(&path, "remote_name = \"  \"\n").unwrap();

        let err = VcsConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, VcsError::Config(_)));
    }

    #[test]
    fn load_from_rejects_unknown_vcs() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("vcs.toml");
        fs::write(&path, "vcs = \"svn\"\n").unwrap();

        assert!(matches!(
            VcsConfig::load_from(&path),
            Err(VcsError::TomlDe(_))
        ));
    }

    #[test]
    fn load_or_default_tolerates_missing_file() {
        let dir = TempDir::new().expect("tempdir");
        let cfg = VcsConfig::load_or_default(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(cfg, VcsConfig::default());
        assert_eq!(VcsConfig::load_or_default(None).unwrap(), VcsConfig::default());
    }

    #[test]
    fn default_path_ends_with_tcr_file() {
        if let Some(path) = VcsConfig::default_path() {
            assert!(path.ends_with("tcr/vcs.toml"));
        }
    }
}
