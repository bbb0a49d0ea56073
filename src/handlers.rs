use crate::actions::dispatch;
use crate::app::{App, BackendEvent, BackendTask, Message};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc::UnboundedSender;

pub(crate) fn handle_backend_event(
    app: &mut App,
    task_tx: &UnboundedSender<BackendTask>,
    event: BackendEvent,
) -> Result<()> {
    dispatch(app, task_tx, Message::Backend(event))
}

pub(crate) fn handle_key_event(
    app: &mut App,
    key: KeyEvent,
    task_tx: &UnboundedSender<BackendTask>,
) -> Result<()> {
    match message_for_key(key) {
        Some(message) => dispatch(app, task_tx, message),
        None => Ok(()),
    }
}

fn message_for_key(key: KeyEvent) -> Option<Message> {
    if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
        return Some(Message::QuitRequested);
    }

    let message = match key.code {
        KeyCode::Char('q') => Message::QuitRequested,
        KeyCode::Char('k') | KeyCode::Up => Message::CursorUp,
        KeyCode::Char('j') | KeyCode::Down => Message::CursorDown,
        KeyCode::Char(' ') | KeyCode::Enter => Message::ToggleSelection,
        KeyCode::Char('r') => Message::RefreshRequested,
        KeyCode::Char('d') => Message::DeleteRequested { force: false },
        KeyCode::Char('D') => Message::DeleteRequested { force: true },
        _ => return None,
    };
    Some(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Worktree;
    use std::path::PathBuf;
    use tokio::sync::mpsc;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn tree(name: &str) -> Worktree {
        Worktree {
            path: PathBuf::from(format!("/repos/bare/{name}")),
            name: name.to_string(),
            revision: "a1b2c3d".to_string(),
            branch: name.to_string(),
            modified_at: "2024-01-01".to_string(),
        }
    }

    #[test]
    fn vim_and_arrow_keys_move_the_cursor() {
        assert_eq!(message_for_key(key(KeyCode::Char('j'))), Some(Message::CursorDown));
        assert_eq!(message_for_key(key(KeyCode::Down)), Some(Message::CursorDown));
        assert_eq!(message_for_key(key(KeyCode::Char('k'))), Some(Message::CursorUp));
        assert_eq!(message_for_key(key(KeyCode::Up)), Some(Message::CursorUp));
    }

    #[test]
    fn ctrl_c_and_q_quit() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(message_for_key(ctrl_c), Some(Message::QuitRequested));
        assert_eq!(message_for_key(key(KeyCode::Char('q'))), Some(Message::QuitRequested));
        assert_eq!(message_for_key(key(KeyCode::Char('c'))), None);
    }

    #[test]
    fn shifted_d_forces_delete() {
        assert_eq!(
            message_for_key(key(KeyCode::Char('d'))),
            Some(Message::DeleteRequested { force: false })
        );
        let shifted = KeyEvent::new(KeyCode::Char('D'), KeyModifiers::SHIFT);
        assert_eq!(
            message_for_key(shifted),
            Some(Message::DeleteRequested { force: true })
        );
    }

    #[test]
    fn delete_key_sends_task_only_with_selection() {
        let mut app = App::new();
        let (task_tx, mut task_rx) = mpsc::unbounded_channel::<BackendTask>();
        handle_backend_event(
            &mut app,
            &task_tx,
            BackendEvent::ListSucceeded(vec![tree("a"), tree("b")]),
        )
        .expect("event");

        handle_key_event(&mut app, key(KeyCode::Char('d')), &task_tx).expect("key");
        assert!(task_rx.try_recv().is_err());

        handle_key_event(&mut app, key(KeyCode::Enter), &task_tx).expect("key");
        handle_key_event(&mut app, key(KeyCode::Char('d')), &task_tx).expect("key");
        let Ok(BackendTask::Delete { targets, force }) = task_rx.try_recv() else {
            panic!("expected delete task");
        };
        assert!(!force);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].name, "a");
    }

    #[test]
    fn refresh_key_sends_refresh_task() {
        let mut app = App::new();
        let (task_tx, mut task_rx) = mpsc::unbounded_channel::<BackendTask>();
        handle_key_event(&mut app, key(KeyCode::Char('r')), &task_tx).expect("key");
        assert_eq!(task_rx.try_recv().ok(), Some(BackendTask::Refresh));
    }
}
