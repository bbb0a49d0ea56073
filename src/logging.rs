//! Diagnostic log file, enabled through the `DEBUG` environment variable.
//!
//! The terminal is in raw mode for the whole session, so traces go to a file
//! instead of stderr. Without the toggle no subscriber is installed and the
//! `tracing` macros are no-ops.

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing::Subscriber;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Installs a global subscriber appending to `path`.
pub fn init_file_logging(path: &Path) -> Result<()> {
    let file = open_log_file(path)?;
    file_subscriber(file, env_filter(std::env::var("RUST_LOG").ok()))
        .try_init()
        .context("failed to install tracing subscriber")?;
    Ok(())
}

fn file_subscriber(file: File, filter: EnvFilter) -> impl Subscriber + Send + Sync + 'static {
    tracing_subscriber::registry().with(filter).with(
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(file)),
    )
}

fn open_log_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file: {}", path.display()))
}

fn env_filter(raw: Option<String>) -> EnvFilter {
    raw.and_then(|value| EnvFilter::try_new(value).ok())
        .unwrap_or_else(|| EnvFilter::new(default_filter()))
}

/// Targets are rooted at the compiled crate name (`tow`), not the package.
fn default_filter() -> String {
    format!("{}=debug", env!("CARGO_CRATE_NAME"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_with(filter: EnvFilter, emit: impl FnOnce()) -> String {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("debug.log");
        let file = open_log_file(&path).expect("open");
        tracing::subscriber::with_default(file_subscriber(file, filter), emit);
        std::fs::read_to_string(&path).expect("read")
    }

    #[test]
    fn default_filter_writes_crate_events() {
        let contents = log_with(env_filter(None), || {
            tracing::debug!(count = 3, "worktree list refreshed");
            tracing::debug!(target: "some_dependency", "dependency chatter");
        });
        assert!(contents.contains("worktree list refreshed"), "{contents:?}");
        assert!(contents.contains("count=3"), "{contents:?}");
        assert!(!contents.contains("dependency chatter"), "{contents:?}");
    }

    #[test]
    fn rust_log_overrides_default_filter() {
        let contents = log_with(env_filter(Some("warn".to_string())), || {
            tracing::debug!("below threshold");
            tracing::warn!("delete failed");
        });
        assert!(!contents.contains("below threshold"), "{contents:?}");
        assert!(contents.contains("delete failed"), "{contents:?}");
    }

    #[test]
    fn invalid_rust_log_falls_back_to_default() {
        let contents = log_with(env_filter(Some("tow=loudest".to_string())), || {
            tracing::debug!("still logged");
        });
        assert!(contents.contains("still logged"), "{contents:?}");
    }

    #[test]
    fn unopenable_log_file_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing-dir").join("debug.log");
        let err = open_log_file(&path).expect_err("parent missing");
        assert!(format!("{err:#}").contains("failed to open log file"));
    }

    #[test]
    fn log_file_is_appended_to() {
        use std::io::Write;

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("debug.log");
        std::fs::write(&path, "earlier\n").expect("seed");
        let mut file = open_log_file(&path).expect("open");
        writeln!(file, "later").expect("write");
        let contents = std::fs::read_to_string(&path).expect("read");
        assert_eq!(contents, "earlier\nlater\n");
    }
}
