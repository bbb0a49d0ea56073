use std::fmt;
use std::path::PathBuf;

/// One worktree as reported by `git worktree list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Worktree {
    pub path: PathBuf,
    pub name: String,
    pub revision: String,
    pub branch: String,
    /// Last-modified date of `path`, `YYYY-MM-DD`.
    pub modified_at: String,
}

impl fmt::Display for Worktree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {} at {}",
            self.name,
            self.branch,
            self.revision,
            self.path.display()
        )
    }
}

/// What the worker needs to remove one worktree and its branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTarget {
    pub name: String,
    pub branch: String,
}

impl From<&Worktree> for DeleteTarget {
    fn from(tree: &Worktree) -> Self {
        Self {
            name: tree.name.clone(),
            branch: tree.branch.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Best human-readable reason for a failed invocation.
    pub fn failure_message(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            format!("exit status {}", self.exit_code)
        } else {
            squash_lines(stderr)
        }
    }
}

fn squash_lines(input: &str) -> String {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(exit_code: i32, stderr: &str) -> CommandResult {
        CommandResult {
            exit_code,
            stdout: String::new(),
            stderr: stderr.to_string(),
            duration_ms: 0,
        }
    }

    #[test]
    fn failure_message_joins_stderr_lines() {
        let res = result(128, "fatal: 'wt' contains modified files\nuse --force to delete it\n");
        assert!(!res.success());
        assert_eq!(
            res.failure_message(),
            "fatal: 'wt' contains modified files | use --force to delete it"
        );
    }

    #[test]
    fn failure_message_falls_back_to_exit_code() {
        assert_eq!(result(1, "  \n").failure_message(), "exit status 1");
    }

    #[test]
    fn delete_target_takes_name_and_branch() {
        let tree = Worktree {
            path: PathBuf::from("/repos/bare/feature-x"),
            name: "feature-x".to_string(),
            revision: "a1b2c3d".to_string(),
            branch: "feature/x".to_string(),
            modified_at: "2024-01-01".to_string(),
        };
        assert_eq!(
            DeleteTarget::from(&tree),
            DeleteTarget {
                name: "feature-x".to_string(),
                branch: "feature/x".to_string(),
            }
        );
    }
}
