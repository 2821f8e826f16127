use std::future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::{sleep, Instant, Sleep};

/// Single-shot timer owned by a channel.
///
/// Holds at most one pending deadline. Scheduling while a deadline is pending
/// keeps the existing one.
#[derive(Debug)]
pub(crate) struct ReconnectTimer {
    delay: Duration,
    pending: Option<Pin<Box<Sleep>>>,
}

impl ReconnectTimer {
    pub(crate) fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    /// Start the timer. Returns false if one was already pending.
    pub(crate) fn schedule(&mut self) -> bool {
        if self.pending.is_some() {
            return false;
        }
        self.pending = Some(Box::pin(sleep(self.delay)));
        true
    }

    pub(crate) fn cancel(&mut self) {
        self.pending = None;
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub(crate) fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|sleep| sleep.deadline())
    }

    /// Resolves when the pending deadline passes and clears it. Never
    /// resolves while nothing is scheduled.
    pub(crate) async fn expired(&mut self) {
        if let Some(sleep) = self.pending.as_mut() {
            sleep.as_mut().await;
            self.pending = None;
        } else {
            future::pending::<()>().await;
        }
    }
}
