//! Email list pane.

use chrono::{DateTime, Datelike, Local};
use mailview_core::MailBackend;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
};

use crate::app::{App, AppMode};

/// Format a server date to a short human-readable string for the list view.
///
/// Dates the server sends in a shape we do not recognise are shown as-is.
fn format_date_short(raw: &str) -> String {
    let parsed = DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .map(|dt| dt.with_timezone(&Local));

    let local = match parsed {
        Ok(dt) => dt,
        Err(_) => return raw.chars().take(10).collect(),
    };

    let now = Local::now();
    let today = now.date_naive();
    let date = local.date_naive();

    if date == today {
        local.format("%H:%M").to_string()
    } else if date == today.pred_opt().unwrap_or(today) {
        "Yesterday".to_string()
    } else if (today - date).num_days() < 7 {
        local.format("%a").to_string()
    } else if date.year() == today.year() {
        local.format("%b %-d").to_string()
    } else {
        local.format("%b %Y").to_string()
    }
}

/// Draw the email list.
pub fn draw_email_list<B: MailBackend>(frame: &mut Frame, app: &App<B>, area: Rect) {
    let is_focused = app.mode != AppMode::Compose;
    let state = app.view.state();
    let emails = state.emails();

    let border_style = if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let title = format!(" Inbox ({}) ", emails.len());

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title);

    if emails.is_empty() {
        let items = vec![ListItem::new(Line::from(Span::styled(
            "  No emails",
            Style::default().fg(Color::DarkGray),
        )))];
        let list = List::new(items).block(block);
        frame.render_widget(list, area);
        return;
    }

    let inner_height = area.height.saturating_sub(2) as usize;
    let offset = app.cursor.offset.min(emails.len());
    let selected = state.selected_id();

    let items: Vec<ListItem> = emails
        .iter()
        .enumerate()
        .skip(offset)
        .take(inner_height)
        .map(|(i, email)| {
            let is_cursor = i == app.cursor.index;
            let is_open = selected == Some(&email.id);

            let open = if is_open { ">" } else { " " };
            let unread = if email.unread { "*" } else { " " };
            let date = format_date_short(&email.date);
            let from: String = email.sender.chars().take(18).collect();

            let fixed_width = 2 + 1 + 18 + 1 + 10 + 1 + 2;
            let max_subject_len = (area.width as usize).saturating_sub(fixed_width);
            let subject = if email.subject.is_empty() {
                "(no subject)"
            } else {
                email.subject.as_str()
            };
            let subject: String = subject.chars().take(max_subject_len.max(10)).collect();

            let content = format!("{open}{unread} {from:18} {date:10} {subject}");

            let style = if is_cursor && is_focused {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else if is_open {
                Style::default().fg(Color::Cyan)
            } else if email.unread {
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };

            ListItem::new(Line::from(Span::styled(content, style)))
        })
        .collect();

    let list = List::new(items).block(block);

    let mut list_state = ListState::default();
    if is_focused {
        list_state.select(Some(app.cursor.index.saturating_sub(offset)));
    }

    frame.render_stateful_widget(list, area, &mut list_state);
}
