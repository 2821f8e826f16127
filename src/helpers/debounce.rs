use std::sync::{Arc, Mutex};
use std::time::Duration;
use log::{error, trace};
use tokio::task::JoinHandle;

/// Collapses bursts of calls into a single delayed call with the latest value.
///
/// Every [`call`](Debouncer::call) cancels the pending invocation, if any, and
/// schedules a new one `delay` later. Needs a tokio runtime.
pub struct Debouncer<T> {
    delay: Duration,
    action: Arc<dyn Fn(T) + Send + Sync>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F>(delay: Duration, action: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self {
            delay,
            action: Arc::new(action),
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `value`, replacing anything still waiting
    pub fn call(&self, value: T) {
        let Ok(mut pending) = self.pending.lock() else {
            error!("Failed to acquire lock on debouncer state");
            return;
        };

        if let Some(previous) = pending.take() {
            trace!("Replacing pending debounced call");
            previous.abort();
        }

        let action = self.action.clone();
        let delay = self.delay;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action(value);
        }));
    }

    /// Drop the pending invocation without running it
    pub fn cancel(&self) {
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(previous) = pending.take() {
                previous.abort();
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        match self.pending.lock() {
            Ok(pending) => pending.as_ref().map_or(false, |task| !task.is_finished()),
            Err(_) => false,
        }
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(task) = pending.take() {
                task.abort();
            }
        }
    }
}
