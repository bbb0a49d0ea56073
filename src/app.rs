use crate::domain::{DeleteTarget, Worktree};
use std::collections::HashSet;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Ready,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendTask {
    Refresh,
    Delete {
        targets: Vec<DeleteTarget>,
        force: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    ListSucceeded(Vec<Worktree>),
    ListFailed(String),
    /// Names of the worktrees that were removed, in removal order.
    DeleteSucceeded { removed: Vec<String> },
    DeleteFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    RefreshRequested,
    CursorUp,
    CursorDown,
    ToggleSelection,
    DeleteRequested { force: bool },
    QuitRequested,
    Backend(BackendEvent),
}

impl From<BackendEvent> for Message {
    fn from(event: BackendEvent) -> Self {
        Message::Backend(event)
    }
}

/// Session state. Cursor and selection are indices into `entries` and are
/// repaired every time `entries` is replaced or shrinks.
#[derive(Debug)]
pub struct App {
    pub entries: Vec<Worktree>,
    pub cursor: usize,
    pub selected: HashSet<usize>,
    pub error: Option<String>,
    pub phase: Phase,
    pub in_flight: usize,
    /// A delete batch has been handed to the worker and not yet answered.
    pub deleting: bool,
    pub should_quit: bool,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            selected: HashSet::new(),
            error: None,
            phase: Phase::Loading,
            in_flight: 0,
            deleting: false,
            should_quit: false,
        }
    }

    pub fn busy(&self) -> bool {
        self.in_flight > 0
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    /// Applies one message and returns the follow-up work, if any.
    pub fn update(&mut self, message: Message) -> Option<BackendTask> {
        match message {
            Message::RefreshRequested => Some(self.request_refresh()),
            Message::CursorUp => {
                self.clear_error();
                self.cursor = self.cursor.saturating_sub(1);
                None
            }
            Message::CursorDown => {
                self.clear_error();
                if self.cursor + 1 < self.entries.len() {
                    self.cursor += 1;
                }
                None
            }
            Message::ToggleSelection => {
                self.clear_error();
                self.toggle_selection();
                None
            }
            Message::DeleteRequested { force } => self.request_delete(force),
            Message::QuitRequested => {
                self.should_quit = true;
                None
            }
            Message::Backend(event) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                self.apply_backend_event(event)
            }
        }
    }

    fn apply_backend_event(&mut self, event: BackendEvent) -> Option<BackendTask> {
        match event {
            BackendEvent::ListSucceeded(entries) => {
                info!(count = entries.len(), "worktree list refreshed");
                self.replace_entries(entries);
                self.phase = Phase::Ready;
                None
            }
            BackendEvent::ListFailed(message) => {
                warn!(%message, "worktree list failed");
                self.fail(message);
                None
            }
            BackendEvent::DeleteSucceeded { removed } => {
                info!(?removed, "worktrees deleted");
                self.deleting = false;
                self.remove_named(&removed);
                Some(self.request_refresh())
            }
            BackendEvent::DeleteFailed(message) => {
                warn!(%message, "worktree delete failed");
                self.deleting = false;
                self.fail(message);
                None
            }
        }
    }

    fn request_refresh(&mut self) -> BackendTask {
        self.clear_error();
        self.phase = Phase::Loading;
        BackendTask::Refresh
    }

    fn request_delete(&mut self, force: bool) -> Option<BackendTask> {
        if self.selected.is_empty() {
            return None;
        }
        if self.deleting {
            debug!("delete already running, ignoring request");
            return None;
        }
        self.clear_error();

        // Set iteration order; removal is by name so order does not matter.
        let targets: Vec<DeleteTarget> = self
            .selected
            .iter()
            .filter_map(|&index| self.entries.get(index))
            .map(DeleteTarget::from)
            .collect();
        debug!(count = targets.len(), force, "delete requested");
        self.deleting = true;
        Some(BackendTask::Delete { targets, force })
    }

    fn toggle_selection(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        if !self.selected.remove(&self.cursor) {
            self.selected.insert(self.cursor);
        }
    }

    /// A new collection invalidates every index held against the old one.
    fn replace_entries(&mut self, entries: Vec<Worktree>) {
        self.entries = entries;
        self.selected.clear();
        self.clamp_cursor();
    }

    /// Drops removed entries locally and shifts surviving selection indices
    /// so they still point at the same worktrees.
    fn remove_named(&mut self, removed: &[String]) {
        let mut dropped = Vec::new();
        let mut kept = Vec::with_capacity(self.entries.len());
        for (index, tree) in std::mem::take(&mut self.entries).into_iter().enumerate() {
            if removed.contains(&tree.name) {
                debug!(worktree = %tree, "dropped after delete");
                dropped.push(index);
            } else {
                kept.push(tree);
            }
        }
        self.entries = kept;

        self.selected = self
            .selected
            .iter()
            .filter(|&&index| !dropped.contains(&index))
            .map(|&index| index - dropped.iter().filter(|&&d| d < index).count())
            .filter(|&index| index < self.entries.len())
            .collect();
        self.clamp_cursor();
    }

    fn clamp_cursor(&mut self) {
        self.cursor = self.cursor.min(self.entries.len().saturating_sub(1));
    }

    fn fail(&mut self, message: String) {
        self.error = Some(message);
        self.phase = Phase::Error;
    }

    fn clear_error(&mut self) {
        self.error = None;
        if self.phase == Phase::Error {
            self.phase = Phase::Ready;
        }
    }
}
