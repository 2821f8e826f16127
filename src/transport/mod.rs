//! Message oriented duplex connections underneath a [`Channel`](crate::channel::Channel).
//!
//! A transport is single use: once it reports closure it is dropped and the
//! channel asks its [`Connector`] for a fresh one.

pub mod websocket;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

pub use websocket::{WebSocketConnector, WebSocketTransport};

/// Errors reported by transports
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Failed to connect to {endpoint}: {reason}")]
    Connect { endpoint: String, reason: String },

    #[error("Failed to send message: {0}")]
    Send(String),

    #[error("Failed to receive message: {0}")]
    Receive(String),

    #[error("Connection closed")]
    Closed,
}

/// One live connection
#[async_trait]
pub trait Transport: Send {
    /// Send one text message
    async fn send(&mut self, text: String) -> Result<(), TransportError>;

    /// Wait for the next text message.
    ///
    /// `None` means the connection is closed and no further messages will
    /// arrive. Must be cancel safe.
    async fn recv(&mut self) -> Option<Result<String, TransportError>>;

    /// Close the connection
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Factory for transports to a given endpoint
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, endpoint: &Url) -> Result<Box<dyn Transport>, TransportError>;
}
