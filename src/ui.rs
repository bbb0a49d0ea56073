use crate::app::App;
use ratatui::Frame;
use ratatui::prelude::{Color, Line, Modifier, Style};
use ratatui::widgets::Paragraph;
use std::ops::Range;

/// Header, error banner, table header, blank spacer and footer.
const CHROME_ROWS: usize = 5;
const MIN_COLUMN_WIDTH: usize = 10;
const ROW_PREFIX_WIDTH: usize = 6;
const COLUMN_GAP: &str = "  ";
const TABLE_HEADERS: [&str; 3] = ["Worktree", "Branch", "Modified at"];
const FOOTER: &str = "q: Quit, Enter/Space: Select, d: Delete, D: Force delete, r: Refresh";

pub fn draw(frame: &mut Frame, app: &App, geometry: (usize, usize)) {
    let (rows, columns) = geometry;
    let window = visible_window(app.entries.len(), app.cursor, data_rows(rows));
    let cursor_line = (!app.entries.is_empty()).then(|| 3 + app.cursor - window.start);
    let first_row = 3;

    let lines: Vec<Line> = render_lines(app, rows, columns)
        .into_iter()
        .enumerate()
        .map(|(idx, text)| {
            let style = match idx {
                0 => Style::default().add_modifier(Modifier::BOLD),
                1 => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                2 => Style::default().fg(Color::Gray),
                _ if Some(idx) == cursor_line => Style::default()
                    .fg(Color::Black)
                    .bg(Color::LightGreen)
                    .add_modifier(Modifier::BOLD),
                _ if idx >= first_row
                    && idx < first_row + window.len()
                    && app.is_selected(window.start + idx - first_row) =>
                {
                    Style::default().fg(Color::Yellow)
                }
                _ => Style::default(),
            };
            Line::styled(text, style)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), frame.area());
}

/// Full screen text for `app` on a `rows` x `columns` terminal.
pub fn render_lines(app: &App, rows: usize, columns: usize) -> Vec<String> {
    let mut lines = Vec::with_capacity(rows);
    lines.push(header_line(app));
    lines.push(
        app.error
            .as_ref()
            .map(|message| format!("Error: {message}"))
            .unwrap_or_default(),
    );

    let widths = column_widths(
        app.entries
            .iter()
            .map(|tree| [tree.name.as_str(), tree.branch.as_str(), tree.modified_at.as_str()]),
    );
    lines.push(layout_row(
        &" ".repeat(ROW_PREFIX_WIDTH),
        TABLE_HEADERS,
        widths,
        columns,
    ));

    for index in visible_window(app.entries.len(), app.cursor, data_rows(rows)) {
        let tree = &app.entries[index];
        let cursor = if index == app.cursor { '>' } else { ' ' };
        let checked = if app.is_selected(index) { 'x' } else { ' ' };
        lines.push(layout_row(
            &format!("{cursor} [{checked}] "),
            [&tree.name, &tree.branch, &tree.modified_at],
            widths,
            columns,
        ));
    }

    lines.push(String::new());
    lines.push(truncate(FOOTER, columns));
    lines
}

fn header_line(app: &App) -> String {
    let total = app.entries.len();
    let current = if total == 0 { 0 } else { app.cursor + 1 };
    let mut line = format!("Your worktrees: [{current}/{total}]");
    if app.busy() {
        line.push_str(" (loading…)");
    }
    line
}

pub fn data_rows(rows: usize) -> usize {
    rows.saturating_sub(CHROME_ROWS).max(1)
}

/// Range of entry indices to show. Starts at 0 and only slides once the
/// cursor would fall off the bottom, keeping it on the last visible row.
pub fn visible_window(len: usize, cursor: usize, data_rows: usize) -> Range<usize> {
    let rows = data_rows.max(1);
    if len <= rows {
        return 0..len;
    }
    let start = (cursor + 1).saturating_sub(rows).min(len - rows);
    start..start + rows
}

/// Per-column width: the longest cell or header, never below the minimum.
pub fn column_widths<'a, I>(rows: I) -> [usize; 3]
where
    I: IntoIterator<Item = [&'a str; 3]>,
{
    let mut widths = TABLE_HEADERS.map(|header| header.chars().count().max(MIN_COLUMN_WIDTH));
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }
    widths
}

/// One aligned table line, cut to `max_width` characters.
pub fn layout_row(prefix: &str, cells: [&str; 3], widths: [usize; 3], max_width: usize) -> String {
    let mut line = String::from(prefix);
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if i > 0 {
            line.push_str(COLUMN_GAP);
        }
        line.push_str(&format!("{cell:<width$}"));
    }
    truncate(line.trim_end(), max_width)
}

fn truncate(line: &str, max_width: usize) -> String {
    line.chars().take(max_width).collect()
}
