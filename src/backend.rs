use crate::app::{BackendEvent, BackendTask};
use crate::domain::DeleteTarget;
use crate::error::StoreResult;
use crate::infra::WorktreeStore;
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

pub(crate) async fn worker_loop(
    store: Arc<dyn WorktreeStore>,
    mut task_rx: UnboundedReceiver<BackendTask>,
    event_tx: UnboundedSender<BackendEvent>,
) {
    while let Some(task) = task_rx.recv().await {
        let event = match task {
            BackendTask::Refresh => {
                let s = store.clone();
                match tokio::task::spawn_blocking(move || s.list()).await {
                    Ok(Ok(entries)) => BackendEvent::ListSucceeded(entries),
                    other => BackendEvent::ListFailed(flatten_error(other)),
                }
            }
            BackendTask::Delete { targets, force } => {
                let s = store.clone();
                let result = tokio::task::spawn_blocking(move || {
                    delete_worktrees(s.as_ref(), &targets, force)
                })
                .await;
                match result {
                    Ok(Ok(removed)) => BackendEvent::DeleteSucceeded { removed },
                    other => BackendEvent::DeleteFailed(flatten_error(other)),
                }
            }
        };

        if event_tx.send(event).is_err() {
            break;
        }
    }
}

/// Removes each worktree and then its branch. Stops at the first failure;
/// whatever was removed before it stays removed.
pub(crate) fn delete_worktrees(
    store: &dyn WorktreeStore,
    targets: &[DeleteTarget],
    force: bool,
) -> StoreResult<Vec<String>> {
    let mut removed = Vec::with_capacity(targets.len());
    for target in targets {
        debug!(name = %target.name, branch = %target.branch, force, "removing worktree");
        store.remove_worktree(&target.name, force).inspect_err(|err| {
            warn!(name = %target.name, %err, "worktree removal failed");
        })?;
        store.delete_branch(&target.branch).inspect_err(|err| {
            warn!(branch = %target.branch, %err, "branch deletion failed");
        })?;
        removed.push(target.name.clone());
    }
    Ok(removed)
}

fn flatten_error<T>(res: Result<StoreResult<T>, tokio::task::JoinError>) -> String {
    match res {
        Ok(Ok(_)) => "ok".to_string(),
        Ok(Err(err)) => err.to_string(),
        Err(err) => format!("join error: {err}"),
    }
}
