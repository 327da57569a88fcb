//! Terminal rendering for the queue status table.
//!
//! Screen layout, top to bottom:
//! - one bold header row with the column labels,
//! - the visible slice of the table,
//! - one footer row with the active sort on the left and
//!   `<last visible>/<total>` on the right.
//!
//! The three count columns keep the snapshot's computed widths and are
//! right-justified; the name column takes whatever width is left and
//! truncates long names.

use std::io::{self, Stdout};

use chrono::Local;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};

use queuetop_protocol::{
    ColumnWidths, Counter, Snapshot, SortSpec, StatusRow, COLUMN_SEPARATORS,
    COLUMN_SEPARATOR_WIDTH, FOOTER_ROWS, HEADER_ROWS, NAME_LABEL, QUEUED_LABEL, RUNNING_LABEL,
    WORKERS_LABEL,
};
use queuetop_state::Viewport;

/// Everything a frame depends on.
#[derive(Debug, Clone, Copy)]
pub struct View<'a> {
    pub snapshot: Option<&'a Snapshot>,
    pub sort: SortSpec,
    pub viewport: Viewport,
}

/// Column widths fitted to a terminal width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub name: usize,
    pub queued: usize,
    pub running: usize,
    pub workers: usize,
}

impl ColumnLayout {
    /// Give the name column all space not taken by the count columns and
    /// separators.
    pub fn fit(widths: ColumnWidths, terminal_width: u16) -> Self {
        let fixed = widths.numeric_total() + COLUMN_SEPARATORS * COLUMN_SEPARATOR_WIDTH;
        Self {
            name: (terminal_width as usize).saturating_sub(fixed),
            queued: widths.queued,
            running: widths.running,
            workers: widths.workers,
        }
    }

    fn line(&self, name: &str, queued: String, running: String, workers: String) -> String {
        let sep = " ".repeat(COLUMN_SEPARATOR_WIDTH);
        let name: String = name.chars().take(self.name).collect();
        format!(
            "{:<name_w$}{sep}{}{sep}{}{sep}{}",
            name,
            queued,
            running,
            workers,
            name_w = self.name,
            sep = sep,
        )
    }

    pub fn header(&self) -> String {
        self.line(
            NAME_LABEL,
            format!("{:<w$}", QUEUED_LABEL, w = self.queued),
            format!("{:<w$}", RUNNING_LABEL, w = self.running),
            format!("{:<w$}", WORKERS_LABEL, w = self.workers),
        )
    }

    pub fn row(&self, row: &StatusRow) -> String {
        self.line(
            &row.name,
            format_counter(&row.queued, self.queued),
            format_counter(&row.running, self.running),
            format_counter(&row.workers, self.workers),
        )
    }
}

/// Right-justify anything integer-valued; leave other tokens as-is.
pub fn format_counter(counter: &Counter, width: usize) -> String {
    if counter.is_numeric() {
        format!("{:>width$}", counter.value(), width = width)
    } else {
        format!("{:<width$}", counter.to_string(), width = width)
    }
}

/// Footer progress text: one-based index of the last row on screen over
/// the total row count.
pub fn progress_label(viewport: &Viewport, total: usize) -> String {
    format!("{}/{}", viewport.last_visible(total), total)
}

/// Render one frame.
pub fn render(frame: &mut Frame, view: &View) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_ROWS as u16),
            Constraint::Min(0),
            Constraint::Length(FOOTER_ROWS as u16),
        ])
        .split(frame.area());

    let widths = view
        .snapshot
        .map(Snapshot::widths)
        .unwrap_or_else(ColumnWidths::from_labels);
    let layout = ColumnLayout::fit(widths, frame.area().width);

    render_header(frame, chunks[0], &layout);
    render_body(frame, chunks[1], &layout, view);
    render_footer(frame, chunks[2], view);
}

fn render_header(frame: &mut Frame, area: Rect, layout: &ColumnLayout) {
    let header = Paragraph::new(Line::from(Span::styled(
        layout.header(),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    frame.render_widget(header, area);
}

fn render_body(frame: &mut Frame, area: Rect, layout: &ColumnLayout, view: &View) {
    let snapshot = match view.snapshot {
        Some(snapshot) => snapshot,
        None => {
            let waiting = Paragraph::new(Line::from(Span::styled(
                "Waiting for status...",
                Style::default().fg(Color::DarkGray),
            )));
            frame.render_widget(waiting, area);
            return;
        }
    };

    if snapshot.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "No matching queues",
            Style::default().fg(Color::DarkGray),
        )));
        frame.render_widget(empty, area);
        return;
    }

    let lines: Vec<Line> = snapshot.rows()[view.viewport.visible_range(snapshot.len())]
        .iter()
        .map(|row| Line::from(layout.row(row)))
        .collect();

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_footer(frame: &mut Frame, area: Rect, view: &View) {
    let total = view.snapshot.map_or(0, Snapshot::len);
    let progress = progress_label(&view.viewport, total);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(progress.chars().count() as u16),
        ])
        .split(area);

    let arrow = if view.sort.ascending { "\u{2191}" } else { "\u{2193}" };
    let mut status = vec![
        Span::styled("sort ", Style::default().fg(Color::Gray)),
        Span::styled(
            format!("{} {}", view.sort.key.label(), arrow),
            Style::default().fg(Color::Yellow),
        ),
    ];
    match view.snapshot {
        Some(snapshot) => {
            let hosts = if snapshot.host_count() == 1 { "host" } else { "hosts" };
            status.push(Span::styled(
                format!(
                    "  {} {}  updated {}",
                    snapshot.host_count(),
                    hosts,
                    snapshot.taken_at().with_timezone(&Local).format("%H:%M:%S")
                ),
                Style::default().fg(Color::Gray),
            ));
        }
        None => status.push(Span::styled(
            "  connecting...",
            Style::default().fg(Color::DarkGray),
        )),
    }

    frame.render_widget(Paragraph::new(Line::from(status)), columns[0]);
    frame.render_widget(
        Paragraph::new(progress).alignment(Alignment::Right),
        columns[1],
    );
}

/// Set up the terminal for TUI rendering.
pub fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to its original state.
pub fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Install a panic hook that restores the terminal before reporting.
pub fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_column_absorbs_leftover_width() {
        let widths = ColumnWidths::from_labels();
        let layout = ColumnLayout::fit(widths, 80);
        assert_eq!(layout.name, 80 - widths.numeric_total() - 3);
        assert_eq!(layout.header().chars().count(), 80);
    }

    #[test]
    fn narrow_terminal_leaves_no_name_column() {
        let layout = ColumnLayout::fit(ColumnWidths::from_labels(), 10);
        assert_eq!(layout.name, 0);
    }

    #[test]
    fn long_names_are_truncated() {
        let widths = ColumnWidths::from_labels();
        let layout = ColumnLayout::fit(widths, (widths.numeric_total() + 3 + 5) as u16);
        let line = layout.row(&StatusRow::new("abcdefghij", 1, 2, 3));
        assert!(line.starts_with("abcde "));
        assert_eq!(line.chars().count(), layout.name + 3 + widths.numeric_total());
    }

    #[test]
    fn counts_right_justified_raw_left_as_is() {
        assert_eq!(format_counter(&Counter::Count(42), 6), "    42");
        assert_eq!(format_counter(&Counter::Raw("n/a".into()), 6), "n/a   ");
        assert_eq!(format_counter(&Counter::parse("007"), 6), "     7");
    }
}
