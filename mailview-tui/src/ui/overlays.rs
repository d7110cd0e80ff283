//! Modal overlay widgets (help, delete confirm).

use mailview_core::MailBackend;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use super::centered_rect;
use crate::app::App;

/// Draw the help overlay.
pub fn draw_help<B: MailBackend>(frame: &mut Frame, app: &App<B>, area: Rect) {
    let popup_area = centered_rect(70, 90, area);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(" Help (press Esc to close) ");

    let lines: Vec<Line> = help_text()
        .lines()
        .skip(app.help_scroll)
        .map(|line| {
            if line.starts_with('#') {
                Line::from(Span::styled(
                    line,
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ))
            } else if let Some((key, description)) = line.split_once(':') {
                Line::from(vec![
                    Span::styled(format!("{key}:"), Style::default().fg(Color::Yellow)),
                    Span::raw(description),
                ])
            } else {
                Line::from(line)
            }
        })
        .collect();

    let para = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });

    frame.render_widget(para, popup_area);
}

/// Draw the delete confirmation dialog for the email under the cursor.
pub fn draw_delete_confirm<B: MailBackend>(frame: &mut Frame, app: &App<B>, area: Rect) {
    let popup_area = centered_rect(50, 20, area);

    frame.render_widget(Clear, popup_area);

    let message = match app.cursor_email() {
        Some(email) if !email.subject.is_empty() => format!("Delete \"{}\"?", email.subject),
        Some(email) => format!("Delete email {}?", email.id),
        None => "Delete this email?".to_string(),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Confirm Delete ");

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            message,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("[y]", Style::default().fg(Color::Green)),
            Span::raw(" Yes   "),
            Span::styled("[n]", Style::default().fg(Color::Red)),
            Span::raw(" No"),
        ]),
    ];

    let para = Paragraph::new(lines).block(block);
    frame.render_widget(para, popup_area);
}

fn help_text() -> &'static str {
    r#"# Navigation

j / Down      : Move down
k / Up        : Move up
gg            : Go to top
G             : Go to bottom
Ctrl-d / PgDn : Page down
Ctrl-u / PgUp : Page up

# Reading

Enter         : Open email (marks it read)
Esc / x       : Close the open email
u             : Mark email under cursor unread
d             : Delete email under cursor
r             : Refresh now

# Compose

c / Tab       : Focus the compose form
Tab / S-Tab   : Next / previous field
Enter         : Next field (newline in message)
Ctrl-s        : Send
Esc           : Back to the list (draft is kept)

# Other

?             : Show this help
q / Ctrl-c    : Quit
"#
}
