//! Auto-reconnecting message channel.
//!
//! A [`Channel`] keeps one logical connection to an endpoint alive across
//! drops. Each channel is driven by its own task which owns the current
//! [`Transport`](crate::transport::Transport) and the reconnect timer, so two
//! channels never share either.
//!
//! ```text
//!  send()/on_message()/close()          frames from transport
//!            │                                   │
//!            ▼                                   ▼
//!     ┌──────────────────────────────────────────────────┐
//!     │ ChannelDriver (one task per channel)             │
//!     │  control queue │ transport.recv() │ timer expiry │
//!     └──────────────────────────────────────────────────┘
//!                          │
//!                          ▼
//!                   MessageHandler
//! ```

mod driver;
mod timer;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use log::debug;
use serde::{Serialize, Deserialize};
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use url::Url;

use crate::data::PlayerCommand;
use crate::transport::Connector;
use driver::{ChannelDriver, Control};

/// Default pause between a connection drop and the next connection attempt
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Channel to {0} has been shut down")]
    Shutdown(String),

    #[error("Channel to {endpoint} did not open within {timeout:?}")]
    OpenTimeout { endpoint: String, timeout: Duration },
}

/// Connection state of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Open,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Open => write!(f, "open"),
        }
    }
}

/// Receives every text message arriving on a channel, in arrival order
pub trait MessageHandler: Send + Sync {
    fn on_message(&self, text: &str);
}

/// Channel tuning
#[derive(Debug, Clone)]
pub struct ChannelOptions {
    /// Fixed delay before each reconnection attempt
    pub reconnect_delay: Duration,
}

impl Default for ChannelOptions {
    fn default() -> Self {
        Self {
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }
}

/// Counters kept by the channel driver
#[derive(Debug, Default)]
pub(crate) struct ChannelCounters {
    pub(crate) connect_attempts: AtomicU64,
    pub(crate) connections: AtomicU64,
    pub(crate) connections_lost: AtomicU64,
    pub(crate) reconnects_scheduled: AtomicU64,
    pub(crate) messages_received: AtomicU64,
    pub(crate) messages_sent: AtomicU64,
    pub(crate) sends_dropped: AtomicU64,
}

impl ChannelCounters {
    pub(crate) fn increment(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> ChannelStats {
        ChannelStats {
            connect_attempts: self.connect_attempts.load(Ordering::Relaxed),
            connections: self.connections.load(Ordering::Relaxed),
            connections_lost: self.connections_lost.load(Ordering::Relaxed),
            reconnects_scheduled: self.reconnects_scheduled.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            sends_dropped: self.sends_dropped.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of a channel's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChannelStats {
    /// Transports requested from the connector, including failed ones
    pub connect_attempts: u64,
    /// Transports successfully opened
    pub connections: u64,
    /// Open transports that closed or failed
    pub connections_lost: u64,
    /// Reconnect timers started
    pub reconnects_scheduled: u64,
    pub messages_received: u64,
    pub messages_sent: u64,
    /// Sends discarded because no transport was open, including sends made
    /// while a connection attempt was in progress
    pub sends_dropped: u64,
}

/// Handle to a resilient channel.
///
/// Dropping the handle stops the channel. Use [`Channel::close`] to flush
/// queued sends first.
pub struct Channel {
    endpoint: Url,
    control: mpsc::UnboundedSender<Control>,
    state: watch::Receiver<ConnectionState>,
    counters: Arc<ChannelCounters>,
    task: JoinHandle<()>,
}

impl Channel {
    /// Open a channel and start connecting immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn open(endpoint: Url, connector: Arc<dyn Connector>, options: ChannelOptions) -> Self {
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        let counters = Arc::new(ChannelCounters::default());

        let driver = ChannelDriver::new(
            endpoint.clone(),
            connector,
            options,
            control_rx,
            state_tx,
            counters.clone(),
        );
        let task = tokio::spawn(driver.run());

        debug!("Channel to {} opened", endpoint);
        Self {
            endpoint,
            control: control_tx,
            state: state_rx,
            counters,
            task,
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Queue a text message. It is dropped if no transport is open when the
    /// driver gets to it, including while a connection attempt is running.
    pub fn send(&self, text: impl Into<String>) -> Result<(), ChannelError> {
        self.control_request(Control::Send(text.into()))
    }

    /// Encode and send a player command
    pub fn send_command(&self, command: &PlayerCommand) -> Result<(), ChannelError> {
        debug!("Sending command {} to {}", command, self.endpoint);
        self.send(command.encode())
    }

    /// Set the handler for inbound messages. It stays registered across
    /// reconnects; a later call replaces it.
    pub fn on_message(&self, handler: Arc<dyn MessageHandler>) -> Result<(), ChannelError> {
        self.control_request(Control::SetHandler(handler))
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Watch connection state changes
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    pub fn stats(&self) -> ChannelStats {
        self.counters.snapshot()
    }

    pub(crate) fn counters(&self) -> Arc<ChannelCounters> {
        self.counters.clone()
    }

    /// Wait until a transport is open
    pub async fn wait_until_open(&self, timeout: Duration) -> Result<(), ChannelError> {
        let mut state = self.state.clone();
        let opened = async move {
            let open = state.wait_for(|s| *s == ConnectionState::Open).await;
            open.map(|_| ())
        };
        match tokio::time::timeout(timeout, opened).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(ChannelError::Shutdown(self.endpoint.to_string())),
            Err(_) => Err(ChannelError::OpenTimeout {
                endpoint: self.endpoint.to_string(),
                timeout,
            }),
        }
    }

    /// Deliver everything queued so far, close the transport and stop
    /// reconnecting. A connection attempt in progress is abandoned. Resolves
    /// once the driver has finished.
    pub async fn close(&self) {
        if self.control.send(Control::Close).is_err() {
            debug!("Channel to {} already stopped", self.endpoint);
            return;
        }
        // The driver owns the state sender, so the watch ends with it
        let mut state = self.state.clone();
        while state.changed().await.is_ok() {}
    }

    fn control_request(&self, request: Control) -> Result<(), ChannelError> {
        self.control
            .send(request)
            .map_err(|_| ChannelError::Shutdown(self.endpoint.to_string()))
    }
}

impl Drop for Channel {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("endpoint", &self.endpoint.as_str())
            .field("state", &self.state())
            .finish()
    }
}
