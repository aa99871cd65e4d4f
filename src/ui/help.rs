use super::centered_rect;
use ratatui::{
    Frame,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

fn section(title: &'static str) -> Line<'static> {
    Line::from(vec![Span::styled(
        format!("  {}", title),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )])
}

fn binding(keys: &'static str, action: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("    {:<10}", keys), Style::default().fg(Color::Yellow)),
        Span::raw(action),
    ])
}

pub fn render(frame: &mut Frame) {
    let area = centered_rect(70, 70, frame.area());

    // Clear the area behind the popup
    frame.render_widget(Clear, area);

    let help_text = vec![
        Line::from(""),
        section("Global"),
        binding("?", "Toggle this help"),
        binding("q", "Quit application"),
        binding("Esc", "Back / cancel"),
        Line::from(""),
        section("Cards"),
        binding("↑/k ↓/j", "Move between cards"),
        binding("PgUp/PgDn", "Move a page of cards"),
        binding("g/G", "Jump to first/last card"),
        binding("Space", "Expand or collapse the card"),
        binding("o", "Open profile link"),
        binding("w", "Open company website"),
        Line::from(""),
        section("Filters"),
        binding("/", "Search name, company, role, country, type"),
        binding("c", "Pick countries"),
        binding("t", "Pick types"),
        binding("x", "Clear all filters"),
        Line::from(""),
        section("Pickers"),
        binding("↑/↓", "Move"),
        binding("Space", "Select / unselect value"),
        binding("Enter/Esc", "Close"),
        Line::from(""),
    ];

    let help = Paragraph::new(help_text)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help: Keybindings ")
                .title_bottom(Line::from(" Press ? or Esc to close ").style(Style::default().fg(Color::DarkGray))),
        )
        .style(Style::default().fg(Color::White));

    frame.render_widget(help, area);
}
