use std::sync::{Arc, RwLock, Weak};
use log::{debug, error, trace, warn};
use serde_json::Value;

use crate::channel::MessageHandler;
use crate::data::{InboundMessage, Notification, RemoteState, SharedRemoteState};
use super::notifier::NotificationSink;

/// Trait for objects that want to hear about remote state changes
pub trait StateListener: Send + Sync {
    /// Called after `attribute` has been set to `value`
    fn on_state_changed(&self, attribute: &str, value: &Value);
}

/// Applies pushed messages to the shared [`RemoteState`].
///
/// Messages are applied one at a time in the order they are handed in, each
/// exactly once. `player` updates overwrite the attribute unconditionally;
/// notifications are passed to the sink and not stored.
pub struct StateSynchronizer {
    state: SharedRemoteState,
    notifier: Arc<dyn NotificationSink>,
    listeners: RwLock<Vec<Weak<dyn StateListener>>>,
}

impl StateSynchronizer {
    pub fn new(state: SharedRemoteState, notifier: Arc<dyn NotificationSink>) -> Self {
        Self {
            state,
            notifier,
            listeners: RwLock::new(Vec::new()),
        }
    }

    pub fn state(&self) -> SharedRemoteState {
        self.state.clone()
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> RemoteState {
        match self.state.read() {
            Ok(state) => state.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Register a listener. Only a weak reference is kept.
    pub fn register_listener(&self, listener: Weak<dyn StateListener>) {
        if let Ok(mut listeners) = self.listeners.write() {
            listeners.push(listener);
        } else {
            error!("Failed to acquire lock on state listeners");
        }
    }

    pub fn apply(&self, message: InboundMessage) {
        match message {
            InboundMessage::Player { attribute, value } => self.apply_player_update(attribute, value),
            InboundMessage::Notification { level, message } => {
                self.notifier.notify(Notification::new(level, message));
            }
        }
    }

    fn apply_player_update(&self, attribute: String, value: Value) {
        debug!("Player attribute {} = {}", attribute, value);

        match self.state.write() {
            Ok(mut state) => {
                state.set(attribute.as_str(), value.clone());
            }
            Err(poisoned) => {
                warn!("Remote state lock was poisoned, recovering");
                poisoned.into_inner().set(attribute.as_str(), value.clone());
            }
        }

        self.notify_listeners(&attribute, &value);
    }

    fn notify_listeners(&self, attribute: &str, value: &Value) {
        let listeners: Vec<Arc<dyn StateListener>> = match self.listeners.write() {
            Ok(mut listeners) => {
                listeners.retain(|listener| listener.strong_count() > 0);
                listeners.iter().filter_map(Weak::upgrade).collect()
            }
            Err(_) => {
                error!("Failed to acquire lock on state listeners");
                return;
            }
        };

        trace!("Notifying {} state listeners about {}", listeners.len(), attribute);
        for listener in listeners {
            listener.on_state_changed(attribute, value);
        }
    }
}

impl MessageHandler for StateSynchronizer {
    fn on_message(&self, text: &str) {
        match InboundMessage::parse(text) {
            Ok(Some(message)) => self.apply(message),
            Ok(None) => {}
            Err(e) => warn!("Ignoring malformed event {}: {}", text, e),
        }
    }
}
