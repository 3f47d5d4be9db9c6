mod feed;
mod rates;

use chrono::{DateTime, Utc};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::App;

/// Header, status bar, and the list block's top and bottom borders.
const CHROME_ROWS: u16 = 4;

/// Rows left for article cards in a terminal of `height` rows.
pub fn list_rows(height: u16) -> u16 {
    height.saturating_sub(CHROME_ROWS)
}

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    feed::render(frame, app, chunks[1]);
    if app.panel.open {
        rates::render(frame, app);
    }
    render_status_bar(frame, app, chunks[2]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let loaded = app.feed.articles().len();
    let count = match app.feed.total_results() {
        Some(total) => format!("{} of {}", loaded, total),
        None => loaded.to_string(),
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "harvest - Farming News",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {} | {}", count, app.source_name()),
            Style::default().fg(Color::Gray),
        ),
    ]))
    .style(Style::default().bg(Color::DarkGray));

    frame.render_widget(header, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status = if let Some(error) = &app.error {
        Line::from(vec![Span::styled(
            format!("Error: {}", error),
            Style::default().fg(Color::Red),
        )])
    } else if let Some(error) = app.feed.error() {
        Line::from(vec![Span::styled(
            format!("{} | r: retry | q: quit", error),
            Style::default().fg(Color::Red),
        )])
    } else if let Some(notice) = &app.notice {
        Line::from(vec![Span::styled(
            notice.as_str(),
            Style::default().fg(Color::Green),
        )])
    } else if let Some(page) = app.feed.in_flight() {
        Line::from(vec![Span::styled(
            format!("Loading page {}...", page),
            Style::default().fg(Color::Yellow),
        )])
    } else {
        let help = if app.panel.open {
            "j/k: nav | Enter: open | y: copy link | b/Esc: close rates | q: quit"
        } else {
            "j/k/g/G: nav | Ctrl+d/u: page | Enter: open | i: image | y: copy | b: rates | q: quit"
        };
        Line::from(vec![Span::styled(help, Style::default().fg(Color::Gray))])
    };

    let status_bar = Paragraph::new(status).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status_bar, area);
}

/// Cut `s` to at most `max` characters, marking the cut with "...".
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("...");
    out
}

pub(crate) fn format_age(dt: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(dt);

    if duration.num_days() > 0 {
        format!("{}d", duration.num_days())
    } else if duration.num_hours() > 0 {
        format!("{}h", duration.num_hours())
    } else if duration.num_minutes() > 0 {
        format!("{}m", duration.num_minutes())
    } else {
        "now".to_string()
    }
}
