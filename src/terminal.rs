use anyhow::{Context, Result};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io;
use tracing::debug;

/// `(rows, columns)` used when the terminal cannot report its size.
pub(crate) const DEFAULT_GEOMETRY: (usize, usize) = (40, 80);

/// Enters raw mode and the alternate screen. If a later step fails, raw mode
/// is switched off again before the error is returned.
pub(crate) fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("failed to enable raw mode")?;
    enter_or_rollback(
        || {
            execute!(io::stdout(), EnterAlternateScreen)
                .context("failed to enter alternate screen")?;
            Terminal::new(CrosstermBackend::new(io::stdout())).context("failed to create terminal")
        },
        leave_raw_screen,
    )
}

fn enter_or_rollback<T>(
    enter: impl FnOnce() -> Result<T>,
    rollback: impl FnOnce() -> Result<()>,
) -> Result<T> {
    enter().or_else(|err| {
        if let Err(cleanup) = rollback() {
            debug!(error = %format!("{cleanup:#}"), "terminal rollback failed");
        }
        Err(err)
    })
}

fn leave_raw_screen() -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(io::stdout(), LeaveAlternateScreen).context("failed to leave alternate screen")?;
    Ok(())
}

pub(crate) fn restore_terminal(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;
    Ok(())
}

/// Current `(rows, columns)`.
pub(crate) fn geometry() -> (usize, usize) {
    geometry_or_default(crossterm::terminal::size())
}

fn geometry_or_default(size: io::Result<(u16, u16)>) -> (usize, usize) {
    match size {
        Ok((columns, rows)) if columns > 0 && rows > 0 => (rows as usize, columns as usize),
        Ok(_) => DEFAULT_GEOMETRY,
        Err(err) => {
            debug!(%err, "terminal size unavailable, using default");
            DEFAULT_GEOMETRY
        }
    }
}
