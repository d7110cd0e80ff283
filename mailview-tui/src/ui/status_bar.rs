//! Status bar at the bottom of the screen.

use mailview_core::MailBackend;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::{App, AppMode};

/// Draw the status bar.
pub fn draw_status_bar<B: MailBackend>(frame: &mut Frame, app: &App<B>, area: Rect) {
    let mut spans = Vec::new();

    let (mode_text, mode_color) = get_mode_info(app.mode);
    spans.push(Span::styled(
        format!(" {mode_text} "),
        Style::default()
            .fg(Color::Black)
            .bg(mode_color)
            .add_modifier(Modifier::BOLD),
    ));

    let state = app.view.state();
    spans.push(Span::raw(" "));
    if state.emails().is_empty() {
        spans.push(Span::styled("Empty", Style::default().fg(Color::DarkGray)));
    } else {
        spans.push(Span::styled(
            format!("{}/{} unread", state.unread_count(), state.emails().len()),
            Style::default().fg(Color::Cyan),
        ));
        spans.push(Span::raw(format!(" | row {}", app.cursor.index + 1)));
    }

    if app.view.in_flight() > 0 {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled("working", Style::default().fg(Color::DarkGray)));
    }

    if app.g_prefix {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled("g-", Style::default().fg(Color::Yellow)));
    }

    if let Some(msg) = &app.status_message {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(msg.as_str(), Style::default().fg(Color::Yellow)));
    }

    // Right-aligned help hint
    let help_text = get_help_hint(app.mode);
    let content_width: usize = spans.iter().map(|s| s.content.chars().count()).sum();
    let padding = (area.width as usize)
        .saturating_sub(content_width)
        .saturating_sub(help_text.len() + 1);
    if padding > 0 {
        spans.push(Span::raw(" ".repeat(padding)));
    }
    spans.push(Span::styled(help_text, Style::default().fg(Color::DarkGray)));

    let para = Paragraph::new(Line::from(spans));
    frame.render_widget(para, area);
}

fn get_mode_info(mode: AppMode) -> (&'static str, Color) {
    match mode {
        AppMode::Normal => ("NORMAL", Color::Blue),
        AppMode::Compose => ("COMPOSE", Color::Green),
        AppMode::Delete => ("DELETE", Color::Red),
        AppMode::Help => ("HELP", Color::Magenta),
    }
}

fn get_help_hint(mode: AppMode) -> &'static str {
    match mode {
        AppMode::Normal => "? help | q quit",
        AppMode::Compose => "Ctrl-s: send | Esc: back",
        AppMode::Delete => "y: confirm | n: cancel",
        AppMode::Help => "j/k: scroll | Esc: close",
    }
}
