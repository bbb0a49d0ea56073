mod actions;
mod app;
mod backend;
mod config;
mod domain;
mod error;
mod handlers;
mod infra;
mod logging;
mod terminal;
mod ui;

use crate::actions::dispatch;
use crate::app::{App, BackendEvent, BackendTask, Message};
use crate::backend::worker_loop;
use crate::config::{AppConfig, Cli};
use crate::handlers::{handle_backend_event, handle_key_event};
use crate::infra::{GitWorktreeStore, WorktreeStore};
use crate::terminal::{geometry, restore_terminal, setup_terminal};
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_or_exit();
    let config = match AppConfig::from_env(cli) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("{err:#}");
            std::process::exit(1);
        }
    };

    if let Some(path) = &config.debug_log
        && let Err(err) = logging::init_file_logging(path)
    {
        eprintln!("fatal: {err:#}");
        std::process::exit(1);
    }
    info!(
        repo = %config.repo.display(),
        git = %config.git_binary.display(),
        "starting session"
    );

    let mut terminal = setup_terminal()?;

    let run_result = run_app(&mut terminal, config).await;

    restore_terminal(&mut terminal)?;
    if let Err(err) = run_result {
        eprintln!("{err:#}");
        std::process::exit(1);
    }

    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: AppConfig,
) -> Result<()> {
    let mut app = App::new();
    let store: Arc<dyn WorktreeStore> =
        Arc::new(GitWorktreeStore::new(config.git_binary, config.repo));

    let (task_tx, task_rx) = mpsc::unbounded_channel::<BackendTask>();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<BackendEvent>();

    tokio::spawn(worker_loop(store, task_rx, event_tx));

    dispatch(&mut app, &task_tx, Message::RefreshRequested)?;

    while !app.should_quit {
        while let Ok(event) = event_rx.try_recv() {
            handle_backend_event(&mut app, &task_tx, event)?;
        }

        let size = geometry();
        terminal.draw(|frame| ui::draw(frame, &app, size))?;

        if event::poll(Duration::from_millis(100)).context("event poll failed")?
            && let Event::Key(key) = event::read().context("event read failed")?
            && key.kind == KeyEventKind::Press
        {
            handle_key_event(&mut app, key, &task_tx)?;
        }
    }

    info!("session finished");
    Ok(())
}
