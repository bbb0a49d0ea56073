use std::path::PathBuf;
use thiserror::Error;

/// Failures talking to git or reading what it reported.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to execute {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("malformed worktree line {line:?}: {reason}")]
    MalformedLine { line: String, reason: &'static str },

    #[error("failed to read modification time of {}: {source}", path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_failure_message_names_the_command() {
        let err = StoreError::CommandFailed {
            command: "git worktree remove feature-x".to_string(),
            message: "contains modified or untracked files".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "git worktree remove feature-x failed: contains modified or untracked files"
        );
    }
}
