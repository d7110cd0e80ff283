//! Key event handlers for the TUI.

mod key_action;

pub use key_action::KeyAction;

use mailview_core::MailBackend;

use crate::app::{App, AppMode, ComposeField};

/// Rows moved by page navigation in the list.
const PAGE_SIZE: usize = 20;

/// Handle a key action in the application.
/// Returns true if the app should quit.
pub fn handle_key<B: MailBackend>(app: &mut App<B>, action: KeyAction) -> bool {
    // Any key other than a second 'g' cancels the gg prefix.
    if app.mode == AppMode::Normal && action != KeyAction::Input('g') {
        app.g_prefix = false;
    }

    match app.mode {
        AppMode::Normal => handle_normal_mode(app, action),
        AppMode::Compose => handle_compose_mode(app, action),
        AppMode::Delete => handle_delete_mode(app, action),
        AppMode::Help => handle_help_mode(app, action),
    }
}

fn handle_normal_mode<B: MailBackend>(app: &mut App<B>, action: KeyAction) -> bool {
    let len = app.emails().len();
    match action {
        KeyAction::Quit | KeyAction::Input('q') => return true,

        // Navigation
        KeyAction::Down | KeyAction::Input('j') => app.cursor.next(len, PAGE_SIZE),
        KeyAction::Up | KeyAction::Input('k') => app.cursor.previous(),
        KeyAction::Input('g') => {
            if app.g_prefix {
                app.cursor.top();
                app.g_prefix = false;
            } else {
                app.g_prefix = true;
            }
        }
        KeyAction::Input('G') => app.cursor.bottom(len, PAGE_SIZE),
        KeyAction::PageDown => app.cursor.page_down(len, PAGE_SIZE),
        KeyAction::PageUp => app.cursor.page_up(PAGE_SIZE),

        // Actions
        KeyAction::Open => app.open_cursor_email(),
        KeyAction::Input('x') => app.close_email(),
        KeyAction::Back => {
            if app.view.state().selected_id().is_some() {
                app.close_email();
            } else {
                app.clear_status();
            }
        }
        KeyAction::Input('u') => app.mark_cursor_unread(),
        KeyAction::Input('d') => app.enter_delete(),
        KeyAction::Input('c') | KeyAction::FocusNext => app.enter_compose(),
        KeyAction::Input('r') => app.refresh(),
        KeyAction::Input('?') => app.enter_help(),

        _ => {}
    }
    false
}

fn handle_compose_mode<B: MailBackend>(app: &mut App<B>, action: KeyAction) -> bool {
    match action {
        KeyAction::Quit => return true,
        KeyAction::Back => app.return_to_normal(),
        KeyAction::Send => app.submit_compose(),
        KeyAction::FocusNext | KeyAction::Down => {
            app.compose.field = app.compose.field.next();
        }
        KeyAction::FocusPrev | KeyAction::Up => {
            app.compose.field = app.compose.field.previous();
        }
        KeyAction::Open => {
            if app.compose.field == ComposeField::Message {
                app.compose.push('\n');
            } else {
                app.compose.field = app.compose.field.next();
            }
        }
        KeyAction::Erase => app.compose.backspace(),
        KeyAction::Input(c) => app.compose.push(c),
        _ => {}
    }
    false
}

fn handle_delete_mode<B: MailBackend>(app: &mut App<B>, action: KeyAction) -> bool {
    match action {
        KeyAction::Input('y') | KeyAction::Input('Y') => {
            app.delete_cursor_email();
            app.return_to_normal();
        }
        KeyAction::Input('n') | KeyAction::Input('N') | KeyAction::Back => {
            app.return_to_normal();
        }
        _ => {}
    }
    false
}

fn handle_help_mode<B: MailBackend>(app: &mut App<B>, action: KeyAction) -> bool {
    match action {
        KeyAction::Back | KeyAction::Input('q') | KeyAction::Input('?') => app.return_to_normal(),
        KeyAction::Down | KeyAction::Input('j') => {
            app.help_scroll = app.help_scroll.saturating_add(1);
        }
        KeyAction::Up | KeyAction::Input('k') => {
            app.help_scroll = app.help_scroll.saturating_sub(1);
        }
        KeyAction::PageDown => {
            app.help_scroll = app.help_scroll.saturating_add(10);
        }
        KeyAction::PageUp => {
            app.help_scroll = app.help_scroll.saturating_sub(10);
        }
        KeyAction::Input('g') => app.help_scroll = 0,
        _ => {}
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, FakeService, app_with, loaded_app};
    use mailview_core::EmailId;

    fn type_str<B: MailBackend>(app: &mut App<B>, text: &str) {
        for c in text.chars() {
            handle_key(app, KeyAction::Input(c));
        }
    }

    mod normal_mode {
        use super::*;

        #[test]
        fn test_quit_on_q() {
            let mut app = app_with(FakeService::default());
            assert!(handle_key(&mut app, KeyAction::Input('q')));
        }

        #[test]
        fn test_quit_on_ctrl_c() {
            let mut app = app_with(FakeService::default());
            assert!(handle_key(&mut app, KeyAction::Quit));
        }

        #[tokio::test]
        async fn test_navigation() {
            let (mut app, _service) = loaded_app(3).await;

            handle_key(&mut app, KeyAction::Input('j'));
            handle_key(&mut app, KeyAction::Down);
            assert_eq!(app.cursor.index, 2);
            handle_key(&mut app, KeyAction::Input('j'));
            assert_eq!(app.cursor.index, 2);

            handle_key(&mut app, KeyAction::Input('k'));
            assert_eq!(app.cursor.index, 1);
        }

        #[tokio::test]
        async fn test_gg_and_shift_g() {
            let (mut app, _service) = loaded_app(10).await;

            handle_key(&mut app, KeyAction::Input('G'));
            assert_eq!(app.cursor.index, 9);

            handle_key(&mut app, KeyAction::Input('g'));
            assert!(app.g_prefix);
            handle_key(&mut app, KeyAction::Input('g'));
            assert_eq!(app.cursor.index, 0);
            assert!(!app.g_prefix);
        }

        #[test]
        fn test_g_prefix_resets_on_non_g_key() {
            let mut app = app_with(FakeService::default());
            app.g_prefix = true;

            handle_key(&mut app, KeyAction::Input('j'));
            assert!(!app.g_prefix);
        }

        #[tokio::test]
        async fn test_enter_opens_and_marks_read() {
            let (mut app, service) = loaded_app(2).await;
            handle_key(&mut app, KeyAction::Down);

            handle_key(&mut app, KeyAction::Open);
            assert_eq!(app.view.state().selected_id(), Some(&EmailId::from(2)));

            app.view.settle().await;
            let open = app.view.state().selected_email().map(|e| e.unread);
            assert_eq!(open, Some(false));
            assert!(service.calls().contains(&Call::SetUnread(EmailId::from(2), false)));
        }

        #[tokio::test]
        async fn test_escape_closes_open_email() {
            let (mut app, _service) = loaded_app(1).await;
            handle_key(&mut app, KeyAction::Open);
            app.view.settle().await;

            handle_key(&mut app, KeyAction::Back);
            assert!(app.view.state().selected_email().is_none());
            assert_eq!(app.view.in_flight(), 0);
        }

        #[tokio::test]
        async fn test_u_marks_cursor_email_unread() {
            let (mut app, service) = loaded_app(1).await;

            handle_key(&mut app, KeyAction::Input('u'));
            app.view.settle().await;
            assert!(app.emails()[0].unread);
            assert!(service.calls().contains(&Call::SetUnread(EmailId::from(1), true)));
        }

        #[test]
        fn test_delete_needs_an_email() {
            let mut app = app_with(FakeService::default());
            handle_key(&mut app, KeyAction::Input('d'));
            assert_eq!(app.mode, AppMode::Normal);
        }

        #[test]
        fn test_enter_help_and_compose() {
            let mut app = app_with(FakeService::default());
            handle_key(&mut app, KeyAction::Input('?'));
            assert_eq!(app.mode, AppMode::Help);
            handle_key(&mut app, KeyAction::Back);

            handle_key(&mut app, KeyAction::Input('c'));
            assert_eq!(app.mode, AppMode::Compose);
        }

        #[tokio::test]
        async fn test_refresh_fetches() {
            let (mut app, service) = loaded_app(1).await;
            let before = service.list_calls();

            handle_key(&mut app, KeyAction::Input('r'));
            app.view.settle().await;
            assert_eq!(service.list_calls(), before + 1);
        }
    }

    mod compose_mode {
        use super::*;

        #[test]
        fn test_typing_and_field_cycle() {
            let mut app = app_with(FakeService::default());
            app.enter_compose();

            type_str(&mut app, "you@example.com");
            handle_key(&mut app, KeyAction::FocusNext);
            type_str(&mut app, "quick question");
            handle_key(&mut app, KeyAction::Erase);

            assert_eq!(app.compose.draft.recipient, "you@example.com");
            assert_eq!(app.compose.draft.subject, "quick questio");
            assert_eq!(app.compose.field, ComposeField::Subject);
        }

        #[test]
        fn test_q_is_text_not_quit() {
            let mut app = app_with(FakeService::default());
            app.enter_compose();
            assert!(!handle_key(&mut app, KeyAction::Input('q')));
            assert_eq!(app.compose.draft.recipient, "q");
        }

        #[test]
        fn test_enter_in_message_inserts_newline() {
            let mut app = app_with(FakeService::default());
            app.enter_compose();
            app.compose.field = ComposeField::Message;

            type_str(&mut app, "hi");
            handle_key(&mut app, KeyAction::Open);
            type_str(&mut app, "there");
            assert_eq!(app.compose.draft.body, "hi\nthere");
        }

        #[test]
        fn test_submit_without_recipient_stays() {
            let mut app = app_with(FakeService::default());
            app.enter_compose();

            handle_key(&mut app, KeyAction::Send);
            assert_eq!(app.mode, AppMode::Compose);
            assert_eq!(app.view.in_flight(), 0);
            assert_eq!(app.status_message.as_deref(), Some("Recipient required"));
        }

        #[tokio::test]
        async fn test_submit_sends_and_clears() {
            let (mut app, service) = loaded_app(1).await;
            handle_key(&mut app, KeyAction::Input('c'));
            type_str(&mut app, "you@example.com");
            handle_key(&mut app, KeyAction::Open);
            type_str(&mut app, "Lunch");

            handle_key(&mut app, KeyAction::Send);
            assert_eq!(app.mode, AppMode::Normal);
            assert!(app.compose.draft.recipient.is_empty());
            assert_eq!(app.compose.draft.sender, "me@example.com");

            app.view.settle().await;
            assert_eq!(app.emails().len(), 2);
            assert_eq!(app.emails()[1].subject, "Lunch");
            assert_eq!(service.list_calls(), 2);
        }

        #[test]
        fn test_escape_keeps_draft() {
            let mut app = app_with(FakeService::default());
            app.enter_compose();
            type_str(&mut app, "draft@example.com");

            handle_key(&mut app, KeyAction::Back);
            assert_eq!(app.mode, AppMode::Normal);
            assert_eq!(app.compose.draft.recipient, "draft@example.com");
        }
    }

    mod delete_mode {
        use super::*;

        #[tokio::test]
        async fn test_confirm_delete() {
            let (mut app, service) = loaded_app(2).await;
            handle_key(&mut app, KeyAction::Input('d'));
            assert_eq!(app.mode, AppMode::Delete);

            handle_key(&mut app, KeyAction::Input('y'));
            assert_eq!(app.mode, AppMode::Normal);

            app.view.settle().await;
            assert_eq!(app.emails().len(), 1);
            assert!(service.calls().contains(&Call::Delete(EmailId::from(1))));
        }

        #[tokio::test]
        async fn test_cancel_delete() {
            let (mut app, service) = loaded_app(1).await;
            handle_key(&mut app, KeyAction::Input('d'));

            handle_key(&mut app, KeyAction::Input('n'));
            assert_eq!(app.mode, AppMode::Normal);
            assert_eq!(app.view.in_flight(), 0);
            assert!(!service.calls().iter().any(|c| matches!(c, Call::Delete(_))));
        }
    }

    mod help_mode {
        use super::*;

        #[test]
        fn test_scroll_in_help() {
            let mut app = app_with(FakeService::default());
            app.enter_help();

            handle_key(&mut app, KeyAction::Input('j'));
            handle_key(&mut app, KeyAction::Input('j'));
            assert_eq!(app.help_scroll, 2);
            handle_key(&mut app, KeyAction::Input('k'));
            assert_eq!(app.help_scroll, 1);
            handle_key(&mut app, KeyAction::Input('g'));
            assert_eq!(app.help_scroll, 0);
        }

        #[test]
        fn test_q_leaves_help_without_quitting() {
            let mut app = app_with(FakeService::default());
            app.enter_help();
            assert!(!handle_key(&mut app, KeyAction::Input('q')));
            assert_eq!(app.mode, AppMode::Normal);
        }
    }
}
