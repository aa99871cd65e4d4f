use crate::assets::Avatar;
use crate::view::{CardState, CardView, Company, ProfileLink};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
};

const PLACEHOLDER_GLYPH: &str = "◌";
const INDENT: &str = "      ";

/// Lines for one card. `width` is the inner width available.
pub fn card_text(card: &CardView, width: usize) -> Text<'static> {
    let mut lines = Vec::new();

    // avatar, name, flag, category
    let avatar = match &card.avatar {
        Avatar::Image(_) if !card.initials.is_empty() => Span::styled(
            format!("[{:^2}]", card.initials),
            Style::default().fg(Color::Black).bg(Color::Cyan),
        ),
        _ => Span::styled(
            format!("[{:^2}]", PLACEHOLDER_GLYPH),
            Style::default().fg(Color::DarkGray),
        ),
    };
    let mut head = vec![
        avatar,
        Span::raw(" "),
        Span::styled(
            card.name.clone(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
    ];
    if let Some(flag) = card.flag {
        head.push(Span::raw(format!("{} ", flag.glyph)));
    }
    head.push(Span::styled(
        format!(" {} ", card.category),
        Style::default().fg(Color::Black).bg(Color::Magenta),
    ));
    lines.push(Line::from(head));

    // role @ company
    let company_style = match card.company {
        Company::Link { .. } => Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
        Company::Plain(_) => Style::default().fg(Color::Gray),
    };
    let company = Span::styled(card.company.name().to_string(), company_style);
    lines.push(Line::from(vec![
        Span::raw(INDENT),
        Span::styled(card.role.clone(), Style::default().fg(Color::Yellow)),
        Span::styled(" @ ", Style::default().fg(Color::DarkGray)),
        company,
    ]));

    let wrap_width = width.saturating_sub(INDENT.len()).max(10);
    for chunk in wrap(&card.short_description, wrap_width) {
        lines.push(Line::from(vec![Span::raw(INDENT), Span::raw(chunk)]));
    }

    if let Some(ref long) = card.long_description {
        for paragraph in long.lines() {
            for chunk in wrap(paragraph, wrap_width) {
                lines.push(Line::from(vec![
                    Span::raw(INDENT),
                    Span::styled(chunk, Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC)),
                ]));
            }
        }
    }

    // controls
    let expand_style = match card.state {
        CardState::Collapsed => Style::default().fg(Color::Cyan),
        CardState::Expanded => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    };
    let profile = match card.profile {
        ProfileLink::Active(_) => Span::styled(
            "[ Profile ]",
            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
        ),
        ProfileLink::Disabled => Span::styled(
            "[ Profile n/a ]",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM),
        ),
    };
    lines.push(Line::from(vec![
        Span::raw(INDENT),
        Span::styled(format!("[ {} ]", card.state.control_label()), expand_style),
        Span::raw("  "),
        profile,
    ]));
    lines.push(Line::from(""));

    Text::from(lines)
}

/// Greedy word wrap on display width.
fn wrap(text: &str, width: usize) -> Vec<String> {
    use unicode_width::UnicodeWidthStr;

    let mut out = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.width()
        } else {
            current.width() + 1 + word.width()
        };
        if needed > width && !current.is_empty() {
            out.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}
