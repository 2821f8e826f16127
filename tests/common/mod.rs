// Common helpers for integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::Instant;
use url::Url;

use mediaremote::channel::{Channel, ConnectionState, MessageHandler};
use mediaremote::data::Notification;
use mediaremote::remote::NotificationSink;
use mediaremote::transport::{Connector, Transport, TransportError};

/// Server side of one mock connection
pub struct MockPeer {
    pub endpoint: Url,
    incoming: Mutex<Option<mpsc::UnboundedSender<String>>>,
    sent: Mutex<Vec<String>>,
    closed_by_client: AtomicBool,
}

impl MockPeer {
    /// Push a frame to the client
    pub fn push(&self, text: &str) {
        if let Some(tx) = self.incoming.lock().unwrap().as_ref() {
            let _ = tx.send(text.to_string());
        }
    }

    /// Drop the connection from the server side
    pub fn close(&self) {
        self.incoming.lock().unwrap().take();
    }

    /// Frames the client sent over this connection
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn closed_by_client(&self) -> bool {
        self.closed_by_client.load(Ordering::SeqCst)
    }
}

/// Connector handing out in-memory transports
#[derive(Default)]
pub struct MockConnector {
    attempts: Mutex<Vec<(Url, Instant)>>,
    fail_next: AtomicUsize,
    connect_delay: Mutex<Option<Duration>>,
    hang: AtomicBool,
    live: Arc<AtomicUsize>,
    peers: Mutex<Vec<Arc<MockPeer>>>,
}

impl MockConnector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Let the next `count` connection attempts fail
    pub fn fail_next(&self, count: usize) {
        self.fail_next.store(count, Ordering::SeqCst);
    }

    /// Make every connection attempt take `delay` before it completes
    pub fn set_connect_delay(&self, delay: Duration) {
        *self.connect_delay.lock().unwrap() = Some(delay);
    }

    /// Make connection attempts never complete, like a blackholed host
    pub fn hang_connects(&self) {
        self.hang.store(true, Ordering::SeqCst);
    }

    pub fn attempts(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }

    /// Times of the attempts made for one endpoint
    pub fn attempt_times(&self, endpoint: &Url) -> Vec<Instant> {
        self.attempts
            .lock()
            .unwrap()
            .iter()
            .filter(|(url, _)| url == endpoint)
            .map(|(_, at)| *at)
            .collect()
    }

    /// Transports created and not yet dropped
    pub fn live_transports(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn peers(&self, endpoint: &Url) -> Vec<Arc<MockPeer>> {
        self.peers
            .lock()
            .unwrap()
            .iter()
            .filter(|peer| &peer.endpoint == endpoint)
            .cloned()
            .collect()
    }

    pub fn latest_peer(&self, endpoint: &Url) -> Arc<MockPeer> {
        self.peers(endpoint).pop().expect("no connection made to endpoint")
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, endpoint: &Url) -> Result<Box<dyn Transport>, TransportError> {
        self.attempts.lock().unwrap().push((endpoint.clone(), Instant::now()));

        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        let delay = *self.connect_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failing = self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(TransportError::Connect {
                endpoint: endpoint.to_string(),
                reason: "connection refused".to_string(),
            });
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let peer = Arc::new(MockPeer {
            endpoint: endpoint.clone(),
            incoming: Mutex::new(Some(tx)),
            sent: Mutex::new(Vec::new()),
            closed_by_client: AtomicBool::new(false),
        });
        self.peers.lock().unwrap().push(peer.clone());
        self.live.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(MockTransport {
            incoming: rx,
            peer,
            live: self.live.clone(),
        }))
    }
}

pub struct MockTransport {
    incoming: mpsc::UnboundedReceiver<String>,
    peer: Arc<MockPeer>,
    live: Arc<AtomicUsize>,
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, text: String) -> Result<(), TransportError> {
        if self.peer.incoming.lock().unwrap().is_none() {
            return Err(TransportError::Closed);
        }
        self.peer.sent.lock().unwrap().push(text);
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<String, TransportError>> {
        self.incoming.recv().await.map(Ok)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.peer.closed_by_client.store(true, Ordering::SeqCst);
        Ok(())
    }
}

impl Drop for MockTransport {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Handler recording every message it receives
#[derive(Default)]
pub struct RecordingHandler {
    messages: Mutex<Vec<String>>,
}

impl RecordingHandler {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl MessageHandler for RecordingHandler {
    fn on_message(&self, text: &str) {
        self.messages.lock().unwrap().push(text.to_string());
    }
}

/// Notification sink recording everything it is given
#[derive(Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.notifications().into_iter().map(|n| n.message).collect()
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}

pub fn endpoint(path: &str) -> Url {
    Url::parse("ws://mediacenter:5000/").unwrap().join(path).unwrap()
}

/// Let spawned tasks process whatever is queued for them
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

/// Wait until the channel reaches the given state
pub async fn wait_for_state(channel: &Channel, expected: ConnectionState) {
    let mut state = channel.subscribe_state();
    tokio::time::timeout(Duration::from_secs(10), state.wait_for(|s| *s == expected))
        .await
        .unwrap_or_else(|_| panic!("channel never became {}", expected))
        .expect("channel stopped");
}
