use crate::app::{App, BackendTask, Message};
use anyhow::Result;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

pub(crate) fn send_task(
    app: &mut App,
    task_tx: &UnboundedSender<BackendTask>,
    task: BackendTask,
) -> Result<()> {
    debug!(?task, "dispatching backend task");
    app.in_flight += 1;
    task_tx
        .send(task)
        .map_err(|err| anyhow::anyhow!("failed to dispatch task: {err}"))
}

/// Runs `message` through the session and forwards any follow-up task.
pub(crate) fn dispatch(
    app: &mut App,
    task_tx: &UnboundedSender<BackendTask>,
    message: Message,
) -> Result<()> {
    match app.update(message) {
        Some(task) => send_task(app, task_tx, task),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::BackendEvent;
    use tokio::sync::mpsc;

    #[test]
    fn dispatch_forwards_follow_up_tasks() {
        let mut app = App::new();
        let (task_tx, mut task_rx) = mpsc::unbounded_channel::<BackendTask>();

        dispatch(&mut app, &task_tx, Message::RefreshRequested).expect("dispatch");
        assert_eq!(task_rx.try_recv().ok(), Some(BackendTask::Refresh));
        assert!(app.busy());

        dispatch(&mut app, &task_tx, BackendEvent::ListSucceeded(Vec::new()).into())
            .expect("dispatch");
        assert!(task_rx.try_recv().is_err());
        assert!(!app.busy());
    }

    #[test]
    fn send_task_fails_when_worker_is_gone() {
        let mut app = App::new();
        let (task_tx, task_rx) = mpsc::unbounded_channel::<BackendTask>();
        drop(task_rx);
        assert!(send_task(&mut app, &task_tx, BackendTask::Refresh).is_err());
    }
}
