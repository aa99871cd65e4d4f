mod card;
mod help;
mod list;
mod loading;
mod picker;

use crate::app::{App, LoadState};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
};

/// Top-level render dispatch.
pub fn render(app: &App, frame: &mut Frame) {
    match app.load_state {
        LoadState::Loading => loading::render_loading(app, frame),
        LoadState::Failed(ref message) => loading::render_failed(message, frame),
        LoadState::Ready => {
            list::render(app, frame);
            if let Some(ref p) = app.picker {
                picker::render(app, p, frame);
            }
        }
    }

    // Render help overlay on top if active
    if app.show_help {
        help::render(frame);
    }
}

/// Create a centered rectangle using percentage of parent area.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}

#[cfg(test)]
pub(crate) mod test_support {
    use ratatui::{Terminal, backend::TestBackend, buffer::Buffer};

    /// Draw one frame of `app` into an in-memory buffer.
    pub fn draw(app: &crate::app::App, width: u16, height: u16) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| super::render(app, frame)).unwrap();
        terminal.backend().buffer().clone()
    }

    /// Buffer contents as one string per row.
    pub fn lines(buffer: &Buffer) -> Vec<String> {
        let area = buffer.area;
        (area.top()..area.bottom())
            .map(|y| {
                (area.left()..area.right())
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect()
    }

    pub fn contains(buffer: &Buffer, needle: &str) -> bool {
        lines(buffer).iter().any(|l| l.contains(needle))
    }
}
