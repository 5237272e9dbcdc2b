use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tcr_cli::render::{diff_json, diff_lines, log_json, log_lines};
use tcr_cli::settings::{resolve_config, Overrides};
use tcr_core::{git, message_builder, p4, Vcs, VcsConfig, VcsKind};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tcr-vcs", version, about = "Drive git or Perforce the way TCR does")]
struct Cli {
    /// Directory inside the working copy
    #[arg(long, env = "TCR_BASE_DIR", default_value = ".")]
    dir: PathBuf,
    /// Version control system to use (git or p4)
    #[arg(long, env = "TCR_VCS")]
    vcs: Option<String>,
    /// Git remote name
    #[arg(long)]
    remote: Option<String>,
    /// Push after each commit
    #[arg(long)]
    auto_push: bool,
    /// Config file (default: <config dir>/tcr/vcs.toml)
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the session opened on the working copy
    Info,
    /// Check that the VCS command line tool is usable
    Check,
    /// Stage paths (the whole working copy when none is given)
    Add { paths: Vec<PathBuf> },
    /// Commit staged changes
    Commit {
        /// Message line; the first one is the header
        #[arg(short = 'm', long = "message", required = true)]
        messages: Vec<String>,
        /// Appended to the message after a blank line
        #[arg(long, default_value = "")]
        suffix: String,
        /// Amend the previous commit
        #[arg(long)]
        amend: bool,
    },
    /// Discard local changes on a path
    Restore { path: PathBuf },
    /// Revert the last commit with a new one
    Revert,
    /// Undo the last commit or changelist
    Rollback,
    /// Push local commits to the remote
    Push,
    /// Pull changes from the remote
    Pull,
    /// Stash local changes
    Stash {
        #[arg(short = 'm', long = "message")]
        message: String,
    },
    /// Re-apply the latest stash
    Unstash {
        /// Keep the stash entry after applying it
        #[arg(long)]
        keep: bool,
    },
    /// Show changed lines per file
    Diff {
        /// Emit JSON output
        #[arg(long)]
        json: bool,
    },
    /// Show history, oldest first
    Log {
        /// Only list items whose message contains this text
        #[arg(long)]
        grep: Option<String>,
        /// Emit JSON output
        #[arg(long)]
        json: bool,
    },
    /// Check that the remote accepts pushes
    RemoteAccess,
}

fn main() -> Result<()> {
    init_tracing();
    let Cli {
        dir,
        vcs,
        remote,
        auto_push,
        config,
        command,
    } = Cli::parse();
    let overrides = Overrides {
        config,
        vcs,
        remote,
        auto_push: auto_push.then_some(true),
    };
    let config = resolve_config(&overrides)?;
    debug!(vcs = %config.vcs, dir = %dir.display(), "resolved configuration");

    let session = || open_session(&dir, &config);
    match command {
        Commands::Info => run_info(session()?.as_ref()),
        Commands::Check => run_check(config.vcs),
        Commands::Add { paths } => session()?.add(&paths).context("add"),
        Commands::Commit {
            messages,
            suffix,
            amend,
        } => run_commit(session()?.as_mut(), messages, &suffix, amend),
        Commands::Restore { path } => session()?
            .restore(&path)
            .with_context(|| format!("restore {}", path.display())),
        Commands::Revert => session()?.revert().context("revert"),
        Commands::Rollback => session()?.rollback_last_commit().context("rollback"),
        Commands::Push => session()?.push().context("push"),
        Commands::Pull => session()?.pull().context("pull"),
        Commands::Stash { message } => session()?.stash(&message).context("stash"),
        Commands::Unstash { keep } => session()?.unstash(keep).context("unstash"),
        Commands::Diff { json } => run_diff(session()?.as_ref(), json),
        Commands::Log { grep, json } => run_log(session()?.as_ref(), grep.as_deref(), json),
        Commands::RemoteAccess => run_remote_access(session()?.as_ref()),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_session(dir: &Path, config: &VcsConfig) -> Result<Box<dyn Vcs>> {
    let mut vcs = tcr_core::open(config.vcs, dir, config)
        .with_context(|| format!("open {} session in {}", config.vcs, dir.display()))?;
    if config.auto_push {
        vcs.enable_auto_push(true);
    }
    info!("{}", vcs.session_summary());
    Ok(vcs)
}

fn run_info(vcs: &dyn Vcs) -> Result<()> {
    println!("vcs: {}", vcs.name());
    println!("root: {}", vcs.root_dir().display());
    println!("branch: {}", vcs.working_branch());
    println!("on root branch: {}", vcs.is_on_root_branch());
    println!("remote: {}", vcs.remote_name());
    println!("remote enabled: {}", vcs.is_remote_enabled());
    println!("auto-push: {}", vcs.is_auto_push_enabled());
    println!("emojis: {}", vcs.supports_emojis());
    Ok(())
}

fn run_check(kind: VcsKind) -> Result<()> {
    let available = match kind {
        VcsKind::Git => {
            let available = git::is_git_command_available();
            println!("git available: {available}");
            if available {
                println!("git path: {}", display_path(git::git_command_path()));
                println!("git version: {}", git::git_command_version());
                println!("git user: {}", git::git_user_name());
            }
            available
        }
        VcsKind::P4 => {
            let available = p4::is_p4_command_available();
            println!("p4 available: {available}");
            if available {
                println!("p4 path: {}", display_path(p4::p4_command_path()));
                println!("p4 version: {}", p4::p4_command_version());
                println!("p4 user: {}", p4::p4_user_name());
                println!("p4 client: {}", p4::p4_client_name());
                match p4::p4_root_dir() {
                    Ok(root) => println!("p4 root: {}", root.display()),
                    Err(err) => println!("p4 root: {err}"),
                }
            }
            available
        }
    };
    if available {
        Ok(())
    } else {
        Err(anyhow!("{kind} command was not found in PATH"))
    }
}

/// Commits, then pushes when auto-push is on.
fn run_commit(vcs: &mut dyn Vcs, messages: Vec<String>, suffix: &str, amend: bool) -> Result<()> {
    let mut messages = messages.into_iter();
    let header = messages.next().unwrap_or_default();
    let builder = message_builder(&header, messages.collect(), suffix);
    let lines = builder
        .generate_message()
        .context("generate commit message")?;
    vcs.commit(amend, &lines).context("commit")?;
    if vcs.is_auto_push_enabled() {
        vcs.push().context("auto-push")?;
    }
    Ok(())
}

fn run_diff(vcs: &dyn Vcs, json: bool) -> Result<()> {
    let diffs = vcs.diff().context("diff")?;
    if json {
        let output = serde_json::to_string_pretty(&diff_json(&diffs)).context("serialize json")?;
        println!("{output}");
    } else {
        for line in diff_lines(&diffs, vcs.root_dir()) {
            println!("{line}");
        }
    }
    Ok(())
}

fn run_log(vcs: &dyn Vcs, grep: Option<&str>, json: bool) -> Result<()> {
    let mut items = match grep {
        Some(text) => {
            let filter = |message: &str| message.contains(text);
            vcs.log(Some(&filter)).context("log")?
        }
        None => vcs.log(None).context("log")?,
    };
    items.sort_by_date();

    if json {
        let output = serde_json::to_string_pretty(&log_json(&items)?).context("serialize json")?;
        println!("{output}");
    } else {
        for line in log_lines(&items)? {
            println!("{line}");
        }
    }
    Ok(())
}

fn run_remote_access(vcs: &dyn Vcs) -> Result<()> {
    if vcs.check_remote_access() {
        println!("remote access: ok");
        Ok(())
    } else {
        Err(anyhow!("no write access to remote '{}'", vcs.remote_name()))
    }
}

fn display_path(path: Option<PathBuf>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "not found".to_string())
}
