use std::future;
use std::sync::Arc;
use log::{debug, info, trace, warn};
use tokio::sync::{mpsc, watch};
use url::Url;

use super::timer::ReconnectTimer;
use super::{ChannelCounters, ChannelOptions, ConnectionState, MessageHandler};
use crate::transport::{Connector, Transport, TransportError};

/// Requests from the channel handle to its driver
pub(crate) enum Control {
    Send(String),
    SetHandler(Arc<dyn MessageHandler>),
    Close,
}

/// Owns the transport and the reconnect timer of one channel and reacts to
/// one event at a time
pub(crate) struct ChannelDriver {
    endpoint: Url,
    connector: Arc<dyn Connector>,
    transport: Option<Box<dyn Transport>>,
    handler: Option<Arc<dyn MessageHandler>>,
    timer: ReconnectTimer,
    control: mpsc::UnboundedReceiver<Control>,
    state: watch::Sender<ConnectionState>,
    counters: Arc<ChannelCounters>,
}

impl ChannelDriver {
    pub(crate) fn new(
        endpoint: Url,
        connector: Arc<dyn Connector>,
        options: ChannelOptions,
        control: mpsc::UnboundedReceiver<Control>,
        state: watch::Sender<ConnectionState>,
        counters: Arc<ChannelCounters>,
    ) -> Self {
        Self {
            endpoint,
            connector,
            transport: None,
            handler: None,
            timer: ReconnectTimer::new(options.reconnect_delay),
            control,
            state,
            counters,
        }
    }

    pub(crate) async fn run(mut self) {
        if self.connect().await {
            loop {
                tokio::select! {
                    // Control requests first so a handler registered right after
                    // opening sees the first message
                    biased;

                    request = self.control.recv() => match request {
                        Some(Control::Send(text)) => self.send(text).await,
                        Some(Control::SetHandler(handler)) => self.handler = Some(handler),
                        Some(Control::Close) | None => break,
                    },

                    frame = next_frame(&mut self.transport) => match frame {
                        Some(Ok(text)) => self.deliver(&text),
                        Some(Err(e)) => {
                            warn!("Error on connection to {}: {}", self.endpoint, e);
                            self.connection_lost();
                        }
                        None => {
                            info!("Connection to {} closed", self.endpoint);
                            self.connection_lost();
                        }
                    },

                    _ = self.timer.expired() => {
                        debug!("Reconnecting to {}", self.endpoint);
                        if !self.connect().await {
                            break;
                        }
                    }
                }
            }
        }

        self.shutdown().await;
    }

    /// Run one connection attempt while still serving control requests.
    /// Returns false if the channel was closed during the attempt.
    async fn connect(&mut self) -> bool {
        self.set_state(ConnectionState::Connecting);
        ChannelCounters::increment(&self.counters.connect_attempts);

        let connector = self.connector.clone();
        let endpoint = self.endpoint.clone();
        let attempt = connector.connect(&endpoint);
        tokio::pin!(attempt);

        let result = loop {
            tokio::select! {
                biased;

                request = self.control.recv() => match request {
                    Some(Control::Send(text)) => self.drop_send(&text),
                    Some(Control::SetHandler(handler)) => self.handler = Some(handler),
                    Some(Control::Close) | None => {
                        debug!("Connection attempt to {} abandoned", self.endpoint);
                        return false;
                    }
                },

                result = &mut attempt => break result,
            }
        };

        match result {
            Ok(transport) => {
                self.transport = Some(transport);
                self.timer.cancel();
                ChannelCounters::increment(&self.counters.connections);
                self.set_state(ConnectionState::Open);
                info!("Connected to {}", self.endpoint);
            }
            Err(e) => {
                warn!("{}", e);
                self.connection_lost();
            }
        }
        true
    }

    /// Drop the current transport and schedule the next attempt
    fn connection_lost(&mut self) {
        if self.transport.take().is_some() {
            ChannelCounters::increment(&self.counters.connections_lost);
        }
        self.set_state(ConnectionState::Disconnected);

        if self.timer.schedule() {
            ChannelCounters::increment(&self.counters.reconnects_scheduled);
            debug!("Reconnect to {} scheduled at {:?}", self.endpoint, self.timer.deadline());
        } else {
            trace!("Reconnect to {} already pending", self.endpoint);
        }
    }

    async fn send(&mut self, text: String) {
        let Some(transport) = self.transport.as_mut() else {
            self.drop_send(&text);
            return;
        };

        match transport.send(text).await {
            Ok(()) => ChannelCounters::increment(&self.counters.messages_sent),
            Err(e) => {
                warn!("Sending to {} failed: {}", self.endpoint, e);
                ChannelCounters::increment(&self.counters.sends_dropped);
                self.connection_lost();
            }
        }
    }

    fn drop_send(&self, text: &str) {
        debug!("Not connected to {}, dropping message {}", self.endpoint, text);
        ChannelCounters::increment(&self.counters.sends_dropped);
    }

    fn deliver(&self, text: &str) {
        ChannelCounters::increment(&self.counters.messages_received);
        trace!("{} -> {}", self.endpoint, text);

        match &self.handler {
            Some(handler) => handler.on_message(text),
            None => debug!("No handler registered on {}, discarding message", self.endpoint),
        }
    }

    async fn shutdown(&mut self) {
        self.timer.cancel();
        if let Some(mut transport) = self.transport.take() {
            if let Err(e) = transport.close().await {
                debug!("Closing connection to {} failed: {}", self.endpoint, e);
            }
        }
        self.set_state(ConnectionState::Disconnected);
        debug!("Channel to {} stopped", self.endpoint);
    }

    fn set_state(&self, state: ConnectionState) {
        self.state.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });
    }
}

async fn next_frame(transport: &mut Option<Box<dyn Transport>>) -> Option<Result<String, TransportError>> {
    match transport {
        Some(transport) => transport.recv().await,
        None => future::pending().await,
    }
}
