use super::card::card_text;
use crate::app::{App, InputMode};
use crate::filter::Facet;
use crate::view::ResultsView;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use unicode_width::UnicodeWidthStr;

pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();

    // Layout: header(3) + filters(3) + cards(min) + status(1)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

    // ── Header ──
    let header_text = format!(
        " People Directory   [{} of {} people]",
        app.filtered_indices.len(),
        app.rows.len()
    );
    let header = Paragraph::new(header_text)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    frame.render_widget(header, chunks[0]);

    render_filter_bar(app, frame, chunks[1]);

    // ── Cards ──
    match app.results_view() {
        ResultsView::Empty => render_empty(frame, chunks[2]),
        ResultsView::Cards(cards) => {
            let inner_width = chunks[2].width.saturating_sub(4) as usize;
            let items: Vec<ListItem> = cards
                .iter()
                .map(|card| ListItem::new(card_text(card, inner_width)))
                .collect();

            let position = format!(" {} of {} ", app.selected + 1, cards.len());
            let list_widget = List::new(items)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::DarkGray))
                        .title(" People ")
                        .title_bottom(Line::from(position).alignment(Alignment::Right)),
                )
                .highlight_style(Style::default().bg(Color::Rgb(40, 40, 40)))
                .highlight_symbol("▸ ");

            let mut list_state = ListState::default();
            list_state.select(Some(app.selected));
            frame.render_stateful_widget(list_widget, chunks[2], &mut list_state);
        }
    }

    // ── Status bar ──
    let key = |k: &'static str| {
        Span::styled(k, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
    };
    let status_line = Line::from(vec![
        key(" ↑↓"),
        Span::raw(" Navigate  "),
        key("Space"),
        Span::raw(" Expand  "),
        key("/"),
        Span::raw(" Search  "),
        key("c/t"),
        Span::raw(" Country/Type  "),
        key("x"),
        Span::raw(" Clear  "),
        key("?"),
        Span::raw(" Help  "),
        key("q"),
        Span::raw(" Quit  "),
        Span::styled(app.status_msg.as_str(), Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(status_line), chunks[3]);
}

fn render_filter_bar(app: &App, frame: &mut Frame, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(30),
            Constraint::Percentage(40),
        ])
        .split(area);

    for (facet, key, column) in [
        (Facet::Country, "c", columns[0]),
        (Facet::Category, "t", columns[1]),
    ] {
        let selected = app.criteria.selected(facet);
        let (summary, style) = if selected.is_empty() {
            ("All".to_string(), Style::default().fg(Color::DarkGray))
        } else {
            (
                selected.iter().cloned().collect::<Vec<_>>().join(", "),
                Style::default().fg(Color::White),
            )
        };
        let width = column.width.saturating_sub(2) as usize;
        let widget = Paragraph::new(truncate_str(&summary, width)).style(style).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(format!(" {} ({}) ", facet.label(), key)),
        );
        frame.render_widget(widget, column);
    }

    // ── Search box ──
    let search_style = match app.input_mode {
        InputMode::Editing => Style::default().fg(Color::Yellow),
        InputMode::Normal => Style::default().fg(Color::DarkGray),
    };
    let title = if app.search_debounce.is_pending() {
        " Search (/) … "
    } else {
        " Search (/) "
    };
    let label = " 🔍 ";
    let search = Paragraph::new(format!("{}{}", label, app.search_input))
        .style(search_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(search_style)
                .title(title),
        );
    frame.render_widget(search, columns[2]);

    // Set cursor position when editing
    if app.input_mode == InputMode::Editing {
        let cursor_x = search_cursor_x(columns[2], label.width() + app.search_input.width());
        let cursor_y = columns[2].y + 1;
        frame.set_cursor_position((cursor_x, cursor_y));
    }
}

/// Column after `text_width` cells inside a bordered box, kept off the right border.
fn search_cursor_x(area: Rect, text_width: usize) -> u16 {
    let offset = u16::try_from(text_width).unwrap_or(u16::MAX);
    let last_inner = area.right().saturating_sub(2).max(area.x);
    area.x.saturating_add(1).saturating_add(offset).min(last_inner)
}

fn render_empty(frame: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "No people found",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Try adjusting your filters or search terms.",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        Line::from(vec![
            Span::raw("Press "),
            Span::styled("x", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw(" to clear all filters"),
        ]),
    ];
    let placeholder = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    frame.render_widget(placeholder, area);
}

/// Truncate a string to `max_width` columns, adding "…" if truncated.
pub fn truncate_str(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    for c in s.chars() {
        let next = format!("{}{}", result, c);
        if next.width() + 1 > max_width {
            break;
        }
        result = next;
    }
    result.push('…');
    result
}
