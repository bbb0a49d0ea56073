use crate::domain::{CommandResult, Worktree};
use crate::error::{StoreError, StoreResult};
use chrono::{DateTime, Local};
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;
use tracing::debug;

pub trait WorktreeStore: Send + Sync {
    fn list(&self) -> StoreResult<Vec<Worktree>>;
    fn remove_worktree(&self, name: &str, force: bool) -> StoreResult<()>;
    fn delete_branch(&self, branch: &str) -> StoreResult<()>;
}

/// Talks to a bare repository through the `git` binary.
#[derive(Debug, Clone)]
pub struct GitWorktreeStore {
    binary: PathBuf,
    repo: PathBuf,
}

impl GitWorktreeStore {
    pub fn new(binary: impl Into<PathBuf>, repo: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            repo: repo.into(),
        }
    }

    fn run_raw<I, S>(&self, args: I) -> StoreResult<CommandResult>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<OsString> = args
            .into_iter()
            .map(|arg| arg.as_ref().to_os_string())
            .collect();
        let mut cmd = Command::new(&self.binary);
        cmd.arg("-C").arg(&self.repo);
        cmd.args(&args);

        let started = Instant::now();
        let output = cmd.output().map_err(|source| StoreError::Spawn {
            command: self.describe(&args),
            source,
        })?;
        let duration_ms = started.elapsed().as_millis() as u64;

        let result = CommandResult {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            duration_ms,
        };
        debug!(
            command = %self.describe(&args),
            exit = result.exit_code,
            duration_ms,
            "git finished"
        );
        Ok(result)
    }

    fn run_checked(&self, args: &[&str]) -> StoreResult<CommandResult> {
        let result = self.run_raw(args)?;
        if !result.success() {
            return Err(StoreError::CommandFailed {
                command: format!("git {}", args.join(" ")),
                message: result.failure_message(),
            });
        }
        Ok(result)
    }

    fn describe(&self, args: &[OsString]) -> String {
        let mut out = self.binary.display().to_string();
        for arg in args {
            out.push(' ');
            out.push_str(&arg.to_string_lossy());
        }
        out
    }
}

impl WorktreeStore for GitWorktreeStore {
    fn list(&self) -> StoreResult<Vec<Worktree>> {
        let result = self.run_checked(&["worktree", "list"])?;
        let entries = parse_list_output(&result.stdout, modified_date)?;
        Ok(sort_by_modified(entries))
    }

    fn remove_worktree(&self, name: &str, force: bool) -> StoreResult<()> {
        self.run_checked(&remove_worktree_args(name, force))?;
        Ok(())
    }

    fn delete_branch(&self, branch: &str) -> StoreResult<()> {
        self.run_checked(&delete_branch_args(branch))?;
        Ok(())
    }
}

fn remove_worktree_args(name: &str, force: bool) -> Vec<&str> {
    let mut args = vec!["worktree", "remove"];
    if force {
        args.push("--force");
    }
    args.push("--");
    args.push(name);
    args
}

// Safe delete only. A forced worktree removal never forces the branch away.
fn delete_branch_args(branch: &str) -> Vec<&str> {
    vec!["branch", "-d", "--", branch]
}

/// A listing line before its modification date is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingLine {
    pub path: PathBuf,
    pub name: String,
    pub revision: String,
    pub branch: String,
}

impl ListingLine {
    pub fn stamped(self, modified_at: String) -> Worktree {
        Worktree {
            path: self.path,
            name: self.name,
            revision: self.revision,
            branch: self.branch,
            modified_at,
        }
    }
}

/// Parses `<path> <revision> [<branch>] [annotations...]`.
pub fn parse_worktree_line(line: &str) -> StoreResult<ListingLine> {
    let malformed = |reason| StoreError::MalformedLine {
        line: line.to_string(),
        reason,
    };

    let mut tokens = line.split_whitespace();
    let (Some(path), Some(revision), Some(branch_token)) =
        (tokens.next(), tokens.next(), tokens.next())
    else {
        return Err(malformed("expected path, revision and branch"));
    };

    let name = match path.rsplit_once('/') {
        Some((_, name)) if !name.is_empty() => name,
        _ => return Err(malformed("path has no final segment")),
    };

    let mut chars = branch_token.chars();
    if chars.next().is_none() || chars.next_back().is_none() {
        return Err(malformed("branch token is too short"));
    }

    Ok(ListingLine {
        path: PathBuf::from(path),
        name: name.to_string(),
        revision: revision.to_string(),
        branch: chars.as_str().to_string(),
    })
}

/// Parses the full `git worktree list` report. The first line describes the
/// bare repository itself and is skipped, as are blank lines.
pub fn parse_list_output<F>(output: &str, stamp: F) -> StoreResult<Vec<Worktree>>
where
    F: Fn(&Path) -> StoreResult<String>,
{
    let mut entries = Vec::new();
    for raw in output.lines().skip(1) {
        if raw.trim().is_empty() {
            continue;
        }
        let listed = parse_worktree_line(raw)?;
        let modified_at = stamp(&listed.path)?;
        entries.push(listed.stamped(modified_at));
    }
    Ok(entries)
}

/// Oldest first. Stable, so equal dates keep listing order.
pub fn sort_by_modified(mut entries: Vec<Worktree>) -> Vec<Worktree> {
    entries.sort_by(|a, b| a.modified_at.cmp(&b.modified_at));
    entries
}

/// Local calendar date of the last modification of `path`.
pub fn modified_date(path: &Path) -> StoreResult<String> {
    let modified = fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map_err(|source| StoreError::Metadata {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(DateTime::<Local>::from(modified)
        .format("%Y-%m-%d")
        .to_string())
}
