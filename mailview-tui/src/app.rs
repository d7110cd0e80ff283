//! Application state and mode management for the TUI.

use mailview_core::{EmailSummary, MailBackend, MailView, NewEmail, ServiceClient};

/// Application modes for the modal TUI system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Browsing the list.
    Normal,
    /// Editing the compose form.
    Compose,
    /// Confirmation for deleting the email under the cursor.
    Delete,
    /// Scrollable help overlay.
    Help,
}

/// Cursor state for the email list.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Current cursor position.
    pub index: usize,
    /// Viewport scroll offset.
    pub offset: usize,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move cursor down, adjusting offset if necessary.
    pub fn next(&mut self, max: usize, page_size: usize) {
        if max == 0 {
            return;
        }
        if self.index < max.saturating_sub(1) {
            self.index += 1;
            if self.index >= self.offset + page_size {
                self.offset = self.index.saturating_sub(page_size.saturating_sub(1));
            }
        }
    }

    /// Move cursor up, adjusting offset if necessary.
    pub fn previous(&mut self) {
        if self.index > 0 {
            self.index -= 1;
            if self.index < self.offset {
                self.offset = self.index;
            }
        }
    }

    /// Jump to the top of the list.
    pub fn top(&mut self) {
        self.index = 0;
        self.offset = 0;
    }

    /// Jump to the bottom of the list.
    pub fn bottom(&mut self, max: usize, page_size: usize) {
        if max == 0 {
            return;
        }
        self.index = max.saturating_sub(1);
        self.offset = self.index.saturating_sub(page_size.saturating_sub(1));
    }

    /// Move down by page size.
    pub fn page_down(&mut self, max: usize, page_size: usize) {
        if max == 0 {
            return;
        }
        self.index = (self.index + page_size).min(max.saturating_sub(1));
        if self.index >= self.offset + page_size {
            self.offset = self.index.saturating_sub(page_size.saturating_sub(1));
        }
    }

    /// Move up by page size.
    pub fn page_up(&mut self, page_size: usize) {
        self.index = self.index.saturating_sub(page_size);
        if self.index < self.offset {
            self.offset = self.index;
        }
    }

    /// Keep the cursor inside a list that may have shrunk.
    pub fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.top();
            return;
        }
        if self.index >= len {
            self.index = len - 1;
        }
        if self.offset > self.index {
            self.offset = self.index;
        }
    }
}

/// Compose form fields, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComposeField {
    From,
    #[default]
    To,
    Subject,
    Message,
}

impl ComposeField {
    pub const ALL: [ComposeField; 4] = [
        ComposeField::From,
        ComposeField::To,
        ComposeField::Subject,
        ComposeField::Message,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ComposeField::From => "From",
            ComposeField::To => "To",
            ComposeField::Subject => "Subject",
            ComposeField::Message => "Message",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            ComposeField::From => ComposeField::To,
            ComposeField::To => ComposeField::Subject,
            ComposeField::Subject => ComposeField::Message,
            ComposeField::Message => ComposeField::From,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            ComposeField::From => ComposeField::Message,
            ComposeField::To => ComposeField::From,
            ComposeField::Subject => ComposeField::To,
            ComposeField::Message => ComposeField::Subject,
        }
    }
}

/// The compose form's buffer.
#[derive(Debug, Clone, Default)]
pub struct ComposeForm {
    pub draft: NewEmail,
    pub field: ComposeField,
}

impl ComposeForm {
    pub fn new(default_from: &str) -> Self {
        Self {
            draft: NewEmail {
                sender: default_from.to_string(),
                ..NewEmail::default()
            },
            field: ComposeField::default(),
        }
    }

    pub fn value(&self, field: ComposeField) -> &str {
        match field {
            ComposeField::From => &self.draft.sender,
            ComposeField::To => &self.draft.recipient,
            ComposeField::Subject => &self.draft.subject,
            ComposeField::Message => &self.draft.body,
        }
    }

    fn current_mut(&mut self) -> &mut String {
        match self.field {
            ComposeField::From => &mut self.draft.sender,
            ComposeField::To => &mut self.draft.recipient,
            ComposeField::Subject => &mut self.draft.subject,
            ComposeField::Message => &mut self.draft.body,
        }
    }

    pub fn push(&mut self, c: char) {
        self.current_mut().push(c);
    }

    pub fn backspace(&mut self) {
        self.current_mut().pop();
    }

    /// Take the draft out, leaving the sender in place for the next one.
    pub fn take(&mut self) -> NewEmail {
        let sender = self.draft.sender.clone();
        self.field = ComposeField::default();
        std::mem::replace(
            &mut self.draft,
            NewEmail {
                sender,
                ..NewEmail::default()
            },
        )
    }
}

/// Application state.
pub struct App<B: MailBackend = ServiceClient> {
    /// View controller owning the email list and open email.
    pub view: MailView<B>,
    /// Current mode.
    pub mode: AppMode,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// List cursor.
    pub cursor: Selection,
    /// Compose form buffer.
    pub compose: ComposeForm,
    /// Help scroll offset.
    pub help_scroll: usize,
    /// Status message (ephemeral).
    pub status_message: Option<String>,
    /// The status message describes requests still in flight.
    status_pending: bool,
    /// G-prefix state for vim gg command.
    pub g_prefix: bool,
}

impl<B: MailBackend> App<B> {
    pub fn new(view: MailView<B>, default_from: &str) -> Self {
        Self {
            view,
            mode: AppMode::Normal,
            should_quit: false,
            cursor: Selection::new(),
            compose: ComposeForm::new(default_from),
            help_scroll: 0,
            status_message: None,
            status_pending: false,
            g_prefix: false,
        }
    }

    pub fn emails(&self) -> &[EmailSummary] {
        self.view.state().emails()
    }

    /// Email under the list cursor.
    pub fn cursor_email(&self) -> Option<&EmailSummary> {
        self.emails().get(self.cursor.index)
    }

    /// Apply finished requests and keep the cursor in range.
    pub fn sync(&mut self) {
        if self.view.process_pending() > 0 {
            let len = self.emails().len();
            self.cursor.clamp(len);
        }
        if self.status_pending && self.view.in_flight() == 0 {
            self.clear_status();
        }
    }

    /// Set a status message.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_pending = false;
    }

    /// Set a status message that clears once the view has no requests in flight.
    fn set_pending_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_pending = true;
    }

    /// Clear the status message.
    pub fn clear_status(&mut self) {
        self.status_message = None;
        self.status_pending = false;
    }

    /// Open the email under the cursor (marks it read).
    pub fn open_cursor_email(&mut self) {
        if let Some(id) = self.cursor_email().map(|e| e.id.clone()) {
            self.view.select_email(id);
        }
    }

    pub fn close_email(&mut self) {
        self.view.close_email();
    }

    pub fn mark_cursor_unread(&mut self) {
        if let Some(id) = self.cursor_email().map(|e| e.id.clone()) {
            self.set_pending_status(format!("Marking {id} unread..."));
            self.view.mark_unread(id);
        }
    }

    pub fn delete_cursor_email(&mut self) {
        if let Some(id) = self.cursor_email().map(|e| e.id.clone()) {
            self.set_pending_status(format!("Deleting {id}..."));
            self.view.delete_email(id);
        }
    }

    /// Send the compose form. Requires a recipient.
    pub fn submit_compose(&mut self) {
        if self.compose.draft.recipient.trim().is_empty() {
            self.set_status("Recipient required");
            self.compose.field = ComposeField::To;
            return;
        }
        let draft = self.compose.take();
        self.set_pending_status(format!("Sending \"{}\"...", draft.subject));
        self.view.send_email(draft);
        self.return_to_normal();
    }

    pub fn refresh(&mut self) {
        self.set_pending_status("Refreshing...");
        self.view.refresh();
    }

    /// Enter help mode.
    pub fn enter_help(&mut self) {
        self.mode = AppMode::Help;
        self.help_scroll = 0;
    }

    /// Enter delete confirmation mode.
    pub fn enter_delete(&mut self) {
        if self.emails().is_empty() {
            return;
        }
        self.mode = AppMode::Delete;
    }

    /// Enter compose mode.
    pub fn enter_compose(&mut self) {
        self.mode = AppMode::Compose;
    }

    /// Return to normal mode.
    pub fn return_to_normal(&mut self) {
        self.mode = AppMode::Normal;
        self.g_prefix = false;
    }
}
