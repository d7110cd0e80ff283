//! The mail view controller: state, backend, and poller wired together.

use std::time::Duration;

use chrono::Local;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::poller::Poller;
use crate::service::MailBackend;
use crate::types::{EmailId, NewEmail};
use crate::view::{Outcome, Request, ViewState};

/// A finished request on its way back to the view.
struct Completion {
    outcome: Outcome,
    /// Dispatched by the view itself (counted in `in_flight`) rather than by the poller.
    tracked: bool,
}

/// Owns the view state and is its only writer.
///
/// Requests run on the tokio runtime and report back through a channel;
/// the host drains it with [`MailView::process_pending`] (or awaits
/// [`MailView::next_outcome`]) on the thread that owns the view.
pub struct MailView<B: MailBackend> {
    state: ViewState,
    backend: B,
    poll_interval: Duration,
    tx: UnboundedSender<Completion>,
    rx: UnboundedReceiver<Completion>,
    poller: Option<Poller>,
    in_flight: usize,
}

impl<B: MailBackend> MailView<B> {
    pub fn new(backend: B, poll_interval: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: ViewState::new(),
            backend,
            poll_interval,
            tx,
            rx,
            poller: None,
            in_flight: 0,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn is_mounted(&self) -> bool {
        self.poller.is_some()
    }

    /// Requests dispatched by the view that have not been applied yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Start polling. Calling it again while mounted does nothing.
    pub fn mount(&mut self) {
        if self.poller.is_some() {
            return;
        }
        let backend = self.backend.clone();
        let tx = self.tx.clone();
        self.poller = Some(Poller::start(self.poll_interval, move || {
            let backend = backend.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let outcome = run(&backend, Request::FetchAll).await;
                let _ = tx.send(Completion {
                    outcome,
                    tracked: false,
                });
            });
        }));
        log::info!("mounted, polling every {:?}", self.poll_interval);
    }

    /// Stop polling. Calling it again while unmounted does nothing.
    pub fn unmount(&mut self) {
        if let Some(mut poller) = self.poller.take() {
            poller.stop();
            log::info!("unmounted, polling stopped");
        }
    }

    /// Open an email and mark it read. Returns false if it was already open.
    pub fn select_email(&mut self, id: EmailId) -> bool {
        match self.state.select(id) {
            Some(request) => {
                self.dispatch(request);
                true
            }
            None => false,
        }
    }

    pub fn close_email(&mut self) {
        self.state.close();
    }

    pub fn mark_unread(&mut self, id: EmailId) {
        let request = self.state.mark_unread(id);
        self.dispatch(request);
    }

    pub fn delete_email(&mut self, id: EmailId) {
        let request = self.state.delete(id);
        self.dispatch(request);
    }

    pub fn send_email(&mut self, draft: NewEmail) {
        let request = self.state.send(draft);
        self.dispatch(request);
    }

    /// Fetch the list now, outside the poll schedule.
    pub fn refresh(&mut self) {
        self.dispatch(Request::FetchAll);
    }

    /// Apply every completion that has already arrived. Never blocks.
    pub fn process_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.rx.try_recv() {
            self.handle(completion);
            applied += 1;
        }
        applied
    }

    /// Wait for one completion and apply it.
    pub async fn next_outcome(&mut self) {
        // The view holds a sender, so the channel never closes while we wait.
        if let Some(completion) = self.rx.recv().await {
            self.handle(completion);
        }
    }

    /// Wait until every request the view dispatched, including follow-up
    /// fetches, has been applied.
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            self.next_outcome().await;
        }
    }

    fn handle(&mut self, completion: Completion) {
        if completion.tracked {
            self.in_flight = self.in_flight.saturating_sub(1);
        }
        if let Some(follow_up) = self.state.apply(completion.outcome, Local::now()) {
            self.dispatch(follow_up);
        }
    }

    fn dispatch(&mut self, request: Request) {
        log::debug!("dispatching {} request", request.label());
        self.in_flight += 1;
        let backend = self.backend.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = run(&backend, request).await;
            let _ = tx.send(Completion {
                outcome,
                tracked: true,
            });
        });
    }
}

impl<B: MailBackend> Drop for MailView<B> {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Perform one request against the backend.
async fn run<B: MailBackend>(backend: &B, request: Request) -> Outcome {
    let result = match &request {
        Request::FetchAll => return Outcome::Fetched(backend.list_emails().await),
        Request::MarkRead(id) => backend.set_unread(id, false).await,
        Request::MarkUnread(id) => backend.set_unread(id, true).await,
        Request::Delete(id) => backend.delete_email(id).await,
        Request::Send(draft) => backend.create_email(draft).await,
    };
    Outcome::Acked { request, result }
}
