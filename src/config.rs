use anyhow::{Context, Result, bail};
use clap::Parser;
use clap::error::ErrorKind;
use std::path::PathBuf;

/// Any non-empty value turns on the diagnostic log file.
pub const DEBUG_ENV: &str = "DEBUG";
/// Overrides the git binary (name looked up on `PATH`, or a path).
pub const GIT_ENV: &str = "TOW_GIT";
pub const DEBUG_LOG_FILE: &str = "debug.log";
const DEFAULT_GIT: &str = "git";

#[derive(Debug, Parser)]
#[command(
    name = "tow",
    version,
    about = "List, select and remove the worktrees of a bare git repository"
)]
pub struct Cli {
    /// Bare repository whose worktrees are shown
    #[arg(value_name = "PATH_TO_BARE_REPO")]
    pub repo: PathBuf,
}

impl Cli {
    /// Parses `std::env::args`. Usage errors exit with status 1.
    pub fn parse_or_exit() -> Self {
        match Self::try_parse() {
            Ok(cli) => cli,
            Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                err.exit()
            }
            Err(err) => {
                let _ = err.print();
                std::process::exit(1);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub repo: PathBuf,
    pub git_binary: PathBuf,
    pub debug_log: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env(cli: Cli) -> Result<Self> {
        Self::resolve(cli, |key| std::env::var(key).ok())
    }

    fn resolve<F>(cli: Cli, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if !cli.repo.is_dir() {
            bail!("repository path is not a directory: {}", cli.repo.display());
        }

        let git = env(GIT_ENV)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GIT.to_string());
        let git_binary =
            which::which(&git).with_context(|| format!("git binary not found: {git}"))?;

        let debug_log = env(DEBUG_ENV)
            .filter(|value| !value.is_empty())
            .map(|_| PathBuf::from(DEBUG_LOG_FILE));

        Ok(Self {
            repo: cli.repo,
            git_binary,
            debug_log,
        })
    }
}
