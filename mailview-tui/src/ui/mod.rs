//! UI rendering module for the TUI.
//!
//! The list sits on the left. On the right the open email (if any) is shown
//! above the compose form. A status bar and modal overlays complete the screen.

mod compose_form;
mod email_list;
mod email_view;
mod overlays;
mod status_bar;

pub use compose_form::draw_compose_form;
pub use email_list::draw_email_list;
pub use email_view::draw_email_view;
pub use overlays::{draw_delete_confirm, draw_help};
pub use status_bar::draw_status_bar;

use mailview_core::MailBackend;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
};

use crate::app::{App, AppMode};

/// Height of the compose form when it shares the column with an open email.
const COMPOSE_HEIGHT: u16 = 12;

/// Draw the main application UI.
pub fn draw<B: MailBackend>(frame: &mut Frame, app: &App<B>) {
    let area = frame.area();

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let content_area = main_layout[0];
    let status_area = main_layout[1];

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(content_area);

    draw_email_list(frame, app, panes[0]);

    let composing = app.mode == AppMode::Compose;
    match app.view.state().selected_email() {
        Some(email) => {
            let right = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(5), Constraint::Length(COMPOSE_HEIGHT)])
                .split(panes[1]);
            draw_email_view(frame, email, right[0]);
            draw_compose_form(frame, &app.compose, composing, right[1]);
        }
        None => draw_compose_form(frame, &app.compose, composing, panes[1]),
    }

    draw_status_bar(frame, app, status_area);

    match app.mode {
        AppMode::Help => draw_help(frame, app, area),
        AppMode::Delete => draw_delete_confirm(frame, app, area),
        AppMode::Normal | AppMode::Compose => {}
    }
}

/// Create a centered rectangle for popups.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
