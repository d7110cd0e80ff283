//! In-memory mail service for TUI tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use mailview_core::{Ack, EmailId, EmailSummary, MailBackend, MailView, NewEmail, Result};

use crate::app::App;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List,
    Create(NewEmail),
    SetUnread(EmailId, bool),
    Delete(EmailId),
}

#[derive(Default)]
struct Store {
    emails: Vec<EmailSummary>,
    calls: Vec<Call>,
}

#[derive(Clone, Default)]
pub struct FakeService {
    store: Arc<Mutex<Store>>,
}

impl FakeService {
    pub fn with_emails(count: u64) -> Self {
        let service = Self::default();
        service.store.lock().unwrap().emails = (1..=count).map(sample_email).collect();
        service
    }

    pub fn calls(&self) -> Vec<Call> {
        self.store.lock().unwrap().calls.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.calls().iter().filter(|c| **c == Call::List).count()
    }
}

impl MailBackend for FakeService {
    async fn list_emails(&self) -> Result<Vec<EmailSummary>> {
        let mut store = self.store.lock().unwrap();
        store.calls.push(Call::List);
        Ok(store.emails.clone())
    }

    async fn create_email(&self, draft: &NewEmail) -> Result<Ack> {
        let mut store = self.store.lock().unwrap();
        store.calls.push(Call::Create(draft.clone()));
        let id = EmailId::from(store.emails.len() as i64 + 1000);
        let email = EmailSummary::from_draft(draft, id, "Mon, 1 Jan 2024 09:00:00 +0000".into());
        store.emails.push(email);
        Ok(Ack { success: true })
    }

    async fn set_unread(&self, id: &EmailId, unread: bool) -> Result<Ack> {
        let mut store = self.store.lock().unwrap();
        store.calls.push(Call::SetUnread(id.clone(), unread));
        if let Some(email) = store.emails.iter_mut().find(|e| &e.id == id) {
            email.unread = unread;
        }
        Ok(Ack { success: true })
    }

    async fn delete_email(&self, id: &EmailId) -> Result<Ack> {
        let mut store = self.store.lock().unwrap();
        store.calls.push(Call::Delete(id.clone()));
        store.emails.retain(|e| &e.id != id);
        Ok(Ack { success: true })
    }
}

pub fn sample_email(id: u64) -> EmailSummary {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "from": format!("sender{id}@example.com"),
        "to": "me@example.com",
        "subject": format!("Subject {id}"),
        "date": "2024-01-15T10:30:00Z",
        "unread": id % 2 == 1,
        "message": format!("Body of message {id}."),
    }))
    .unwrap()
}

pub fn app_with(service: FakeService) -> App<FakeService> {
    App::new(
        MailView::new(service, Duration::from_millis(2000)),
        "me@example.com",
    )
}

/// App whose list already holds `count` emails with ids 1..=count.
pub async fn loaded_app(count: u64) -> (App<FakeService>, FakeService) {
    let service = FakeService::with_emails(count);
    let mut app = app_with(service.clone());
    app.view.refresh();
    app.view.settle().await;
    app.clear_status();
    (app, service)
}

/// Render into an off-screen terminal and return the buffer as text, one line per row.
pub fn render<F>(width: u16, height: u16, draw: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, ratatui::layout::Rect),
{
    let backend = ratatui::backend::TestBackend::new(width, height);
    let mut terminal = ratatui::Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            draw(frame, area);
        })
        .unwrap();
    let buffer = terminal.backend().buffer();
    buffer
        .content
        .chunks(width as usize)
        .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}
