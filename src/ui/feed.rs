use chrono::Utc;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::App;
use crate::feed::FeedStatus;
use crate::sensor::{CARD_HEIGHT, MIN_ROWS, SENTINEL_HEIGHT};
use crate::types::Article;

use super::{format_age, truncate};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" News (page {}) ", app.feed.page()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let articles = app.feed.articles();
    let mut y = inner.y;
    let bottom = inner.y + inner.height;

    // Too short for a whole card and the sentinel: clip the last card.
    let pinned = inner.height < MIN_ROWS
        && inner.height >= SENTINEL_HEIGHT
        && app.offset + 1 == articles.len()
        && app.sentinel_shown();

    for (i, article) in articles.iter().enumerate().skip(app.offset) {
        if pinned {
            let height = bottom - SENTINEL_HEIGHT - y;
            let card = Rect::new(inner.x, y, inner.width, height);
            render_card(frame, article, i == app.selected && !app.panel.open, card);
            y += height;
            break;
        }
        if y + CARD_HEIGHT > bottom {
            // More cards below the fold, so the tail row is off screen too.
            return;
        }
        let card = Rect::new(inner.x, y, inner.width, CARD_HEIGHT);
        render_card(frame, article, i == app.selected && !app.panel.open, card);
        y += CARD_HEIGHT;
    }

    if y + SENTINEL_HEIGHT > bottom {
        return;
    }
    let tail = Rect::new(inner.x, y, inner.width, SENTINEL_HEIGHT);

    let line = match app.feed.status() {
        FeedStatus::HasMore | FeedStatus::Loading => Line::from(Span::styled(
            "Loading more...",
            Style::default().fg(Color::Yellow),
        )),
        FeedStatus::Exhausted if articles.is_empty() => Line::from(Span::styled(
            "No news found",
            Style::default().fg(Color::Gray),
        )),
        FeedStatus::Exhausted => Line::from(Span::styled(
            "End of feed",
            Style::default().fg(Color::DarkGray),
        )),
        FeedStatus::Errored => Line::from(Span::styled(
            format!("{} Press r to retry.", app.feed.error().unwrap_or_default()),
            Style::default().fg(Color::Red),
        )),
    };
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), tail);
}

fn render_card(frame: &mut Frame, article: &Article, selected: bool, area: Rect) {
    let width = area.width as usize;

    let title_style = if selected {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    let marker = if selected { "> " } else { "  " };

    let mut meta = Vec::new();
    if let Some(source) = &article.source_name {
        meta.push(Span::styled(source.clone(), Style::default().fg(Color::Cyan)));
        meta.push(Span::raw("  "));
    }
    if let Some(published) = article.published_at {
        meta.push(Span::styled(
            format_age(published, Utc::now()),
            Style::default().fg(Color::DarkGray),
        ));
        meta.push(Span::raw("  "));
    }
    meta.push(Span::styled(
        truncate(&article.url, width.saturating_sub(30).max(10)),
        Style::default()
            .fg(Color::Blue)
            .add_modifier(Modifier::UNDERLINED),
    ));

    let mut meta_line = vec![Span::raw("  ")];
    meta_line.extend(meta);

    let lines = vec![
        Line::from(vec![
            Span::styled(marker, title_style),
            Span::styled(truncate(&article.title, width.saturating_sub(2)), title_style),
        ]),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(
                truncate(article.description_or_default(), width.saturating_sub(2)),
                Style::default().fg(Color::Gray),
            ),
        ]),
        Line::from(meta_line),
        Line::from(""),
    ];

    let style = if selected {
        Style::default().bg(Color::Black)
    } else {
        Style::default()
    };
    frame.render_widget(Paragraph::new(lines).style(style), area);
}
