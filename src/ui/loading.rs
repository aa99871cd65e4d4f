use super::centered_rect;
use crate::app::App;
use ratatui::{
    Frame,
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

pub fn render_loading(app: &App, frame: &mut Frame) {
    let area = centered_rect(60, 30, frame.area());
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Loading directory...",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            app.source.to_string(),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(vec![
            Span::styled("q", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw(" Quit"),
        ]),
    ];
    let widget = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    frame.render_widget(widget, area);
}

/// Startup failure screen with the retry action.
pub fn render_failed(message: &str, frame: &mut Frame) {
    let area = centered_rect(60, 40, frame.area());
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Failed to load data",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(message.to_string(), Style::default().fg(Color::Gray))),
        Line::from(""),
        Line::from(vec![
            Span::styled("r", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw(" Retry   "),
            Span::styled("q", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw(" Quit"),
        ]),
    ];
    let widget = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        );
    frame.render_widget(widget, area);
}

#[cfg(test)]
mod tests {
    use crate::app::App;
    use crate::assets::Assets;
    use crate::loader::{LoadError, Source};
    use crate::ui::test_support::{contains, draw};
    use std::time::Duration;

    fn new_app() -> App {
        App::new(
            Source::File("people.csv".into()),
            Duration::from_secs(1),
            Duration::from_millis(300),
            Assets::default(),
        )
    }

    #[test]
    fn test_loading_screen() {
        let app = new_app();
        let buffer = draw(&app, 80, 24);
        assert!(contains(&buffer, "Loading directory..."));
        assert!(contains(&buffer, "q Quit"));
        assert!(!contains(&buffer, "People Directory"));
    }

    #[test]
    fn test_failed_screen_offers_retry() {
        let mut app = new_app();
        app.finish_load(Err(LoadError::Status {
            status: 404,
            url: "https://example.com/people.csv".to_string(),
        }));
        let buffer = draw(&app, 100, 30);
        assert!(contains(&buffer, "Failed to load data"));
        assert!(contains(&buffer, "HTTP 404"));
        assert!(contains(&buffer, "Retry"));
    }
}
