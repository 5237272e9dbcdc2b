use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tcr_core::{VcsConfig, VcsKind};

/// Values given on the command line, taking precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub vcs: Option<String>,
    pub remote: Option<String>,
    pub auto_push: Option<bool>,
}

/// Loads the config file (explicit path or default location) and applies `overrides`.
pub fn resolve_config(overrides: &Overrides) -> Result<VcsConfig> {
    let mut config = match &overrides.config {
        Some(path) => VcsConfig::load_from(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => load_default()?,
    };

    if let Some(name) = &overrides.vcs {
        config.vcs = name
            .parse::<VcsKind>()
            .with_context(|| format!("select vcs '{name}'"))?;
    }
    if let Some(remote) = &overrides.remote {
        config.remote_name = remote.clone();
    }
    if let Some(auto_push) = overrides.auto_push {
        config.auto_push = auto_push;
    }
    config.validate().context("validate config")?;
    Ok(config)
}

fn load_default() -> Result<VcsConfig> {
    let path = VcsConfig::default_path();
    VcsConfig::load_or_default(path.as_deref())
        .with_context(|| format!("load config {}", display(path.as_deref())))
}

fn display(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "<none>".to_string())
}
