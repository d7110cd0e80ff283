//! Cancellable fixed-interval polling task.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Handle to a running poll loop. The loop stops on [`Poller::stop`] or drop.
#[derive(Debug)]
pub struct Poller {
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    /// Spawn the loop on the current tokio runtime. `tick` runs immediately
    /// and then once per `interval`.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn start<F>(interval: Duration, mut tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let period = interval.max(Duration::from_millis(1));
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                log::trace!("poll tick");
                tick();
            }
        });
        Self {
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Abort the loop. Later calls do nothing.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}
