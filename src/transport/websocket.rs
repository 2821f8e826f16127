use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use log::{debug, trace};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use url::Url;

use super::{Connector, Transport, TransportError};

/// Opens WebSocket connections
#[derive(Debug, Clone, Default)]
pub struct WebSocketConnector;

impl WebSocketConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for WebSocketConnector {
    async fn connect(&self, endpoint: &Url) -> Result<Box<dyn Transport>, TransportError> {
        debug!("Opening WebSocket connection to {}", endpoint);

        let (stream, response) = connect_async(endpoint.as_str())
            .await
            .map_err(|e| TransportError::Connect {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;

        debug!("WebSocket connected to {} (status {})", endpoint, response.status());
        Ok(Box::new(WebSocketTransport { stream }))
    }
}

/// A single WebSocket connection
pub struct WebSocketTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn send(&mut self, text: String) -> Result<(), TransportError> {
        self.stream
            .send(Message::Text(text))
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }

    async fn recv(&mut self) -> Option<Result<String, TransportError>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text)),
                Ok(Message::Binary(data)) => {
                    return Some(Ok(String::from_utf8_lossy(&data).into_owned()));
                }
                Ok(Message::Close(frame)) => {
                    debug!("WebSocket closed by server: {:?}", frame);
                    return None;
                }
                // Pings are answered by tungstenite itself
                Ok(other) => trace!("Ignoring WebSocket frame {:?}", other),
                Err(e) => return Some(Err(TransportError::Receive(e.to_string()))),
            }
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.stream
            .close(None)
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }
}
