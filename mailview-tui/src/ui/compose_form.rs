//! Compose form pane.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::{ComposeField, ComposeForm};

/// Draw the compose form. `active` is true while it has keyboard focus.
pub fn draw_compose_form(frame: &mut Frame, form: &ComposeForm, active: bool, area: Rect) {
    let (border_style, title) = if active {
        (
            Style::default().fg(Color::Green),
            " Compose (Tab: next field | Ctrl-s: send | Esc: back) ",
        )
    } else {
        (Style::default().fg(Color::DarkGray), " Compose (c) ")
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title);

    let mut lines = Vec::new();
    for field in ComposeField::ALL {
        let focused = active && form.field == field;
        let label_style = if focused {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        let cursor = if focused { "_" } else { "" };
        let value = form.value(field);

        if field == ComposeField::Message {
            lines.push(Line::from(Span::styled(
                format!("{}:", field.label()),
                label_style,
            )));
            let mut body: Vec<Line> = value.split('\n').map(|l| Line::from(l.to_string())).collect();
            if let Some(last) = body.last_mut() {
                last.push_span(Span::raw(cursor));
            }
            lines.extend(body);
        } else {
            lines.push(Line::from(vec![
                Span::styled(format!("{:>8}: ", field.label()), label_style),
                Span::raw(value.to_string()),
                Span::raw(cursor),
            ]));
        }
    }

    let para = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(para, area);
}
