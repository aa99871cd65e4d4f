use super::centered_rect;
use crate::app::{App, FacetPicker};
use ratatui::{
    Frame,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState},
};

/// Multi-select popup for one facet.
pub fn render(app: &App, picker: &FacetPicker, frame: &mut Frame) {
    let area = centered_rect(40, 60, frame.area());
    frame.render_widget(Clear, area);

    let selected = app.criteria.selected(picker.facet);
    let items: Vec<ListItem> = picker
        .values
        .iter()
        .map(|value| {
            let checked = selected.contains(value);
            let mark = if checked { "[x] " } else { "[ ] " };
            let style = if checked {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(Line::from(vec![
                Span::styled(mark, style),
                Span::styled(value.as_str(), style),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(format!(" Filter by {} ", picker.facet.label()))
                .title_bottom(
                    Line::from(" Space toggle · Enter/Esc close ")
                        .style(Style::default().fg(Color::DarkGray)),
                ),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("▸ ");

    let mut state = ListState::default();
    state.select(Some(picker.selected));
    frame.render_stateful_widget(list, area, &mut state);
}
