use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, Cell, Clear, Row, Table, TableState};
use ratatui::Frame;

use crate::app::App;
use crate::types::BANKS;

/// Render the loan interest rate table as a centered popup
pub fn render(frame: &mut Frame, app: &App) {
    let height = (BANKS.len() + 4) as u16; // borders + header + spacer
    let area = centered_rect(110, height, frame.area());
    frame.render_widget(Clear, area);

    let header = Row::new(["Bank Name", "Interest Rate", "Processing Fee", "Link"])
        .style(
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::BOLD),
        )
        .bottom_margin(1);

    let rows = BANKS.iter().map(|bank| {
        Row::new(vec![
            Cell::from(bank.name).style(Style::default().add_modifier(Modifier::BOLD)),
            Cell::from(bank.rate),
            Cell::from(bank.fee),
            Cell::from(bank.link).style(
                Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::UNDERLINED),
            ),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(22),
            Constraint::Percentage(35),
            Constraint::Length(28),
            Constraint::Min(20),
        ],
    )
    .header(header)
    .block(
        Block::default().borders(Borders::ALL).title(Span::styled(
            " Interest Rates ",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).fg(Color::Yellow));

    let mut state = TableState::default();
    state.select(Some(app.panel.index));
    frame.render_stateful_widget(table, area, &mut state);
}

/// Centered rect of at most `width` x `height` inside `outer`
fn centered_rect(width: u16, height: u16, outer: Rect) -> Rect {
    let popup_width = width.min(outer.width);
    let popup_height = height.min(outer.height);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((outer.height.saturating_sub(popup_height)) / 2),
            Constraint::Length(popup_height),
            Constraint::Min(0),
        ])
        .split(outer);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((outer.width.saturating_sub(popup_width)) / 2),
            Constraint::Length(popup_width),
            Constraint::Min(0),
        ])
        .split(vertical[1]);

    horizontal[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_fits_inside() {
        let outer = Rect::new(0, 0, 200, 50);
        let r = centered_rect(110, 11, outer);
        assert_eq!((r.x, r.y, r.width, r.height), (45, 19, 110, 11));
    }

    #[test]
    fn centered_rect_clamps_to_small_screen() {
        let outer = Rect::new(0, 0, 80, 8);
        let r = centered_rect(110, 11, outer);
        assert_eq!((r.width, r.height), (80, 8));
    }
}
