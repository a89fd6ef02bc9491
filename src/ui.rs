//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).
//!
//! Layout, top to bottom: a one-line control bar (or text prompt), the
//! thread table, a pager line and a status bar.  A [`Notice`] is drawn as a
//! centred modal over everything else.
//!
//! [`Notice`]: crate::app::Notice

use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::app::{App, Mode, Notice};
use crate::pager::PAGE_SIZES;
use crate::session::SessionStatus;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let [controls_area, table_area, pager_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_controls(app, frame, controls_area);
    draw_table(app, frame, table_area);
    draw_pager(app, frame, pager_area);
    draw_status_bar(app, frame, status_area);

    if let Some(notice) = &app.notice {
        draw_notice(notice, frame);
    }
}

fn key_hint<'a>(key: &'a str, label: &'a str, enabled: bool) -> Vec<Span<'a>> {
    let (key_style, label_style) = if enabled {
        (
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            Style::default(),
        )
    } else {
        (
            Style::default().fg(Color::DarkGray),
            Style::default().fg(Color::DarkGray),
        )
    };
    vec![
        Span::styled(format!(" {key}"), key_style),
        Span::styled(format!(": {label} "), label_style),
    ]
}

fn prompt(label: &str, buf: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!(" {label}: "), Style::default().fg(Color::Yellow)),
        Span::raw(buf.to_string()),
        Span::styled("▏", Style::default().fg(Color::Yellow)),
        Span::styled("  Enter: confirm  Esc: cancel", Style::default().fg(Color::DarkGray)),
    ])
}

/// Render either the key bar or the active text prompt.
fn draw_controls(app: &App, frame: &mut Frame, area: Rect) {
    let line = match &app.mode {
        Mode::Channel(buf) => prompt("Subreddit", buf),
        Mode::JumpToPage(buf) => prompt("Go to page", buf),
        Mode::Normal => {
            let busy = app.is_busy();
            let mut spans = Vec::new();
            spans.extend(key_hint("s", "start", !busy));
            spans.extend(key_hint("x", "stop", busy));
            spans.extend(key_hint("e", "export CSV", !busy));
            spans.extend(key_hint("q", "quit", true));
            Line::from(spans)
        }
    };
    frame.render_widget(Paragraph::new(line), area);
}

/// Render the current page of threads.
fn draw_table(app: &mut App, frame: &mut Frame, area: Rect) {
    let rows: Vec<Row> = app
        .visible_threads()
        .iter()
        .map(|thread| {
            Row::new(vec![
                Cell::from(thread.author_name.clone()).style(Style::default().fg(Color::Cyan)),
                Cell::from(thread.title.clone()),
                Cell::from(thread.score.to_string()).style(Style::default().fg(Color::Green)),
            ])
        })
        .collect();

    let header = Row::new(vec!["Author", "Title", "Upvotes"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let title = match app.sessions.channel() {
        Some(channel) => format!(" r/{channel} "),
        None => " Threads ".to_string(),
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(20),
            Constraint::Min(10),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .block(Block::default().title(title).borders(Borders::ALL))
    .row_highlight_style(
        Style::default()
            .add_modifier(Modifier::BOLD)
            .bg(Color::DarkGray),
    )
    .highlight_symbol("▸ ");

    frame.render_stateful_widget(table, area, &mut app.table_state);
}

/// Render page position and page-size choices.
fn draw_pager(app: &App, frame: &mut Frame, area: Rect) {
    let len = app.threads().len();
    let pager = &app.pager;

    let mut spans = vec![
        Span::raw(" Page "),
        Span::styled(
            format!("{} of {}", pager.index() + 1, pager.page_count(len)),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  Show"),
    ];
    for size in PAGE_SIZES {
        let style = if size == pager.size() {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" {size}"), style));
    }
    spans.extend(key_hint("Home", "<<", pager.can_previous()));
    spans.extend(key_hint("←", "<", pager.can_previous()));
    spans.extend(key_hint("→", ">", pager.can_next(len)));
    spans.extend(key_hint("End", ">>", pager.can_next(len)));
    spans.extend(key_hint(":", "go to", true));
    spans.extend(key_hint("+/-", "size", true));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let indicator = match app.sessions.status() {
        SessionStatus::Running => SPINNER[app.ticks % SPINNER.len()],
        SessionStatus::Failed => "✗",
        SessionStatus::Completed => "✓",
        SessionStatus::Idle | SessionStatus::Stopped => "·",
    };

    let mut spans = vec![
        Span::styled(format!(" {indicator} "), Style::default().fg(Color::Magenta)),
        Span::styled(&app.status, Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(
            format!("{} threads fetched", app.threads().len()),
            Style::default().fg(Color::Green),
        ),
    ];
    if let Some(at) = app.sessions.last_update() {
        spans.push(Span::styled(
            format!("  updated {}", at.format("%H:%M:%S UTC")),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if let Some(thread) = app.selected_thread() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            thread.url(),
            Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_notice(notice: &Notice, frame: &mut Frame) {
    let area = centered(frame.area(), 60, 8);
    let body = Paragraph::new(format!("{}\n\n[Enter] OK", notice.message))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(format!(" {} ", notice.title))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        );
    frame.render_widget(Clear, area);
    frame.render_widget(body, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    cell
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{app_with, single_page};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::path::PathBuf;
    use std::time::Duration;

    fn render(app: &mut App) -> String {
        let backend = TestBackend::new(160, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(app, f)).unwrap();
        let buf = terminal.backend().buffer().clone();
        buf.content()
            .iter()
            .map(|c| c.symbol().chars().next().unwrap_or(' '))
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn draw_does_not_panic_with_no_items() {
        let mut app = app_with(vec![], PathBuf::from("."));
        let text = render(&mut app);
        assert!(text.contains("0 threads fetched"));
        assert!(text.contains("Page 1 of 1"));
    }

    #[tokio::test(start_paused = true)]
    async fn draw_shows_rows_and_counts() {
        let mut app = app_with(single_page(15), PathBuf::from("."));
        app.submit_channel("rust");
        tokio::time::sleep(Duration::from_millis(100)).await;
        app.tick();
        app.select_next();

        let text = render(&mut app);
        assert!(text.contains("r/rust"));
        assert!(text.contains("15 threads fetched"));
        assert!(text.contains("Page 1 of 2"));
        assert!(text.contains("t9"));
        assert!(!text.contains("t10"));
        assert!(text.contains("https://reddit.com/r/test/comments/t0/"));
    }

    #[tokio::test(start_paused = true)]
    async fn draw_shows_prompt_while_typing() {
        let mut app = app_with(vec![], PathBuf::from("."));
        app.begin_channel_entry();
        app.push_char('r');
        let text = render(&mut app);
        assert!(text.contains("Subreddit: r"));
    }

    #[tokio::test(start_paused = true)]
    async fn draw_shows_notice_modal() {
        let mut app = app_with(vec![], PathBuf::from("."));
        app.submit_channel("?");
        let text = render(&mut app);
        assert!(text.contains("Invalid subreddit"));
    }
}
