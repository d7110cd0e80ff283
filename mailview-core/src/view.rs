//! View state and its optimistic-update state machine.
//!
//! `ViewState` never performs I/O. User actions return the [`Request`] the
//! host must run, and completed requests come back as an [`Outcome`] passed to
//! [`ViewState::apply`]. A successful mutation patches the local list right
//! away and asks for a full [`Request::FetchAll`], so the server list
//! overwrites whatever the patch approximated.

use chrono::{DateTime, Local};

use crate::error::{Error, Result};
use crate::types::{Ack, EmailId, EmailSummary, NewEmail};

/// A side effect the view wants performed against the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Re-fetch the whole collection.
    FetchAll,
    /// Set `unread = false`.
    MarkRead(EmailId),
    /// Set `unread = true`.
    MarkUnread(EmailId),
    Delete(EmailId),
    Send(NewEmail),
}

impl Request {
    /// Short name used in log records.
    pub fn label(&self) -> &'static str {
        match self {
            Request::FetchAll => "fetch",
            Request::MarkRead(_) => "mark-read",
            Request::MarkUnread(_) => "mark-unread",
            Request::Delete(_) => "delete",
            Request::Send(_) => "send",
        }
    }

    /// Message logged when the backend answers `success: false`.
    pub fn describe_failure(&self) -> String {
        match self {
            Request::FetchAll => "Unable to fetch emails.".to_string(),
            Request::MarkRead(id) => format!("Unable to mark email ID #{id} as read."),
            Request::MarkUnread(id) => format!("Unable to mark email ID {id} unread."),
            Request::Delete(id) => format!("Unable to delete email ID {id}."),
            Request::Send(_) => "Unable to send email!".to_string(),
        }
    }
}

/// A completed request, fed back into the state machine.
#[derive(Debug)]
pub enum Outcome {
    Fetched(Result<Vec<EmailSummary>>),
    Acked { request: Request, result: Result<Ack> },
}

/// Emails plus the currently open one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    emails: Vec<EmailSummary>,
    /// `None` means no email is open.
    selected: Option<EmailId>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emails(&self) -> &[EmailSummary] {
        &self.emails
    }

    pub fn selected_id(&self) -> Option<&EmailId> {
        self.selected.as_ref()
    }

    /// The open email, if its id is still in the list.
    pub fn selected_email(&self) -> Option<&EmailSummary> {
        let id = self.selected.as_ref()?;
        self.emails.iter().find(|e| &e.id == id)
    }

    pub fn unread_count(&self) -> usize {
        self.emails.iter().filter(|e| e.unread).count()
    }

    /// Open an email. Returns the mark-as-read request, or `None` if it was already open.
    pub fn select(&mut self, id: EmailId) -> Option<Request> {
        if self.selected.as_ref() == Some(&id) {
            return None;
        }
        self.selected = Some(id.clone());
        Some(Request::MarkRead(id))
    }

    /// Close the open email. Local only.
    pub fn close(&mut self) {
        self.selected = None;
    }

    /// Ask for an email to be flagged unread. The list changes once the backend acks.
    pub fn mark_unread(&self, id: EmailId) -> Request {
        Request::MarkUnread(id)
    }

    pub fn delete(&self, id: EmailId) -> Request {
        Request::Delete(id)
    }

    pub fn send(&self, draft: NewEmail) -> Request {
        Request::Send(draft)
    }

    /// Apply a completed request. Returns the reconciliation fetch after a
    /// successful mutation.
    pub fn apply(&mut self, outcome: Outcome, now: DateTime<Local>) -> Option<Request> {
        match outcome {
            Outcome::Fetched(Ok(emails)) => {
                log::debug!("fetched {} emails", emails.len());
                self.emails = emails;
                None
            }
            Outcome::Fetched(Err(e)) => {
                log::error!("failed to fetch emails: {e}");
                None
            }
            Outcome::Acked {
                request,
                result: Ok(Ack { success: true }),
            } => {
                self.patch(&request, now);
                Some(Request::FetchAll)
            }
            Outcome::Acked {
                request,
                result: Ok(Ack { success: false }),
            } => {
                let err = Error::Rejected(request.describe_failure());
                log::error!("{err}");
                None
            }
            Outcome::Acked {
                request,
                result: Err(e),
            } => {
                log::error!("{} request failed: {e}", request.label());
                None
            }
        }
    }

    /// Optimistic local change for an acknowledged mutation.
    fn patch(&mut self, request: &Request, now: DateTime<Local>) {
        match request {
            Request::FetchAll => {}
            Request::MarkRead(id) => self.set_unread(id, false),
            Request::MarkUnread(id) => self.set_unread(id, true),
            Request::Delete(id) => self.emails.retain(|e| &e.id != id),
            Request::Send(draft) => {
                let id = self.next_local_id(now);
                let email = EmailSummary::from_draft(draft, id, now.to_rfc2822());
                self.emails.push(email);
            }
        }
    }

    fn set_unread(&mut self, id: &EmailId, unread: bool) {
        if let Some(email) = self.emails.iter_mut().find(|e| &e.id == id) {
            email.unread = unread;
        }
    }

    /// Epoch-millisecond id, bumped until it is unused in the list.
    fn next_local_id(&self, now: DateTime<Local>) -> EmailId {
        let mut candidate = now.timestamp_millis();
        while self.emails.iter().any(|e| e.id == EmailId::from(candidate)) {
            candidate += 1;
        }
        EmailId::from(candidate)
    }

    #[cfg(test)]
    pub(crate) fn with_emails(emails: Vec<EmailSummary>) -> Self {
        Self {
            emails,
            selected: None,
        }
    }
}
