//! Detail view for the open email.

use mailview_core::EmailSummary;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

fn header(label: &str, value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{label}: "),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(value.to_string()),
    ])
}

/// Draw the open email.
pub fn draw_email_view(frame: &mut Frame, email: &EmailSummary, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" Email {} (Esc to close) ", email.id));

    let mut lines = Vec::new();

    let subject = if email.subject.is_empty() {
        "(no subject)"
    } else {
        email.subject.as_str()
    };
    lines.push(header("Subject", subject));
    lines.push(header("From", &email.sender));
    if let Some(recipient) = &email.recipient {
        lines.push(header("To", recipient));
    }
    if !email.date.is_empty() {
        lines.push(header("Date", &email.date));
    }
    if email.unread {
        lines.push(Line::from(vec![
            Span::styled("Status: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled("UNREAD", Style::default().fg(Color::Yellow)),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "---",
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(""));

    if email.body.is_empty() {
        lines.push(Line::from(Span::styled(
            "(empty message)",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    } else {
        lines.extend(email.body.lines().map(|line| Line::from(line.to_string())));
    }

    let para = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });

    frame.render_widget(para, area);
}
