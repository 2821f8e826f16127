//! Integration tests for the reconnecting channel, driven by in-memory transports

#[path = "common/mod.rs"]
mod common;

#[cfg(test)]
mod tests {
    use super::common::*;
    use std::sync::Arc;
    use std::time::Duration;

    use mediaremote::channel::{Channel, ChannelOptions, ConnectionState, DEFAULT_RECONNECT_DELAY};
    use mediaremote::data::{MediaType, PlayerCommand};

    fn open(connector: &Arc<MockConnector>, path: &str) -> Channel {
        Channel::open(endpoint(path), connector.clone(), ChannelOptions::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_connects_on_open() {
        let connector = MockConnector::new();
        let channel = open(&connector, "ws/remote/");

        wait_for_state(&channel, ConnectionState::Open).await;
        assert!(channel.is_open());
        assert_eq!(connector.attempts(), 1);
        assert_eq!(connector.live_transports(), 1);

        let stats = channel.stats();
        assert_eq!(stats.connect_attempts, 1);
        assert_eq!(stats.connections, 1);
        assert_eq!(stats.reconnects_scheduled, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_close_schedules_one_reconnect() {
        let connector = MockConnector::new();
        let url = endpoint("ws/remote/");
        let channel = open(&connector, "ws/remote/");
        wait_for_state(&channel, ConnectionState::Open).await;

        for round in 1..=3u64 {
            connector.latest_peer(&url).close();
            wait_for_state(&channel, ConnectionState::Disconnected).await;
            assert_eq!(channel.stats().reconnects_scheduled, round);

            // Nothing happens before the delay is over
            tokio::time::sleep(DEFAULT_RECONNECT_DELAY - Duration::from_millis(1)).await;
            assert_eq!(connector.attempts(), round as usize);

            wait_for_state(&channel, ConnectionState::Open).await;
            assert_eq!(connector.attempts(), round as usize + 1);
        }

        let times = connector.attempt_times(&url);
        assert_eq!(times.len(), 4);
        for pair in times.windows(2) {
            assert!(pair[1] - pair[0] >= DEFAULT_RECONNECT_DELAY);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_attempts_retry_at_fixed_interval() {
        let connector = MockConnector::new();
        connector.fail_next(3);
        let url = endpoint("ws/events/");
        let channel = open(&connector, "ws/events/");

        wait_for_state(&channel, ConnectionState::Open).await;

        let stats = channel.stats();
        assert_eq!(stats.connect_attempts, 4);
        assert_eq!(stats.connections, 1);
        assert_eq!(stats.reconnects_scheduled, 3);

        let times = connector.attempt_times(&url);
        for pair in times.windows(2) {
            let gap = pair[1] - pair[0];
            assert!(gap >= DEFAULT_RECONNECT_DELAY);
            assert!(gap < DEFAULT_RECONNECT_DELAY * 2);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_reconnect_delay() {
        let connector = MockConnector::new();
        connector.fail_next(1);
        let options = ChannelOptions {
            reconnect_delay: Duration::from_secs(2),
        };
        let channel = Channel::open(endpoint("ws/remote/"), connector.clone(), options);

        settle().await;
        assert_eq!(channel.state(), ConnectionState::Disconnected);

        tokio::time::sleep(Duration::from_millis(1999)).await;
        assert_eq!(connector.attempts(), 1);

        wait_for_state(&channel, ConnectionState::Open).await;
        assert_eq!(connector.attempts(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_failure_and_close_count_as_one_loss() {
        let connector = MockConnector::new();
        let url = endpoint("ws/remote/");
        let channel = open(&connector, "ws/remote/");
        wait_for_state(&channel, ConnectionState::Open).await;

        let peer = connector.latest_peer(&url);
        peer.close();
        channel.send("lost").unwrap();
        settle().await;

        let stats = channel.stats();
        assert_eq!(stats.reconnects_scheduled, 1);
        assert_eq!(stats.sends_dropped, 1);
        assert!(peer.sent().is_empty());

        wait_for_state(&channel, ConnectionState::Open).await;
        assert_eq!(connector.attempts(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_live_transport_never_reused() {
        let connector = MockConnector::new();
        let url = endpoint("ws/remote/");
        let channel = open(&connector, "ws/remote/");

        for _ in 0..3 {
            wait_for_state(&channel, ConnectionState::Open).await;
            assert_eq!(connector.live_transports(), 1);

            connector.latest_peer(&url).close();
            wait_for_state(&channel, ConnectionState::Disconnected).await;
            assert_eq!(connector.live_transports(), 0);
        }

        wait_for_state(&channel, ConnectionState::Open).await;
        let peers = connector.peers(&url);
        assert_eq!(peers.len(), 4);

        channel.send("hello").unwrap();
        settle().await;

        // Only the newest connection carries traffic
        for peer in &peers[..3] {
            assert!(peer.sent().is_empty());
        }
        assert_eq!(peers[3].sent(), vec!["hello".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_while_disconnected_is_dropped() {
        let connector = MockConnector::new();
        let url = endpoint("ws/remote/");
        let channel = open(&connector, "ws/remote/");
        wait_for_state(&channel, ConnectionState::Open).await;

        connector.latest_peer(&url).close();
        wait_for_state(&channel, ConnectionState::Disconnected).await;

        channel.send_command(&PlayerCommand::Toggle).unwrap();
        settle().await;
        assert_eq!(channel.stats().sends_dropped, 1);

        wait_for_state(&channel, ConnectionState::Open).await;
        settle().await;
        assert!(connector.latest_peer(&url).sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_while_connecting_is_dropped() {
        let connector = MockConnector::new();
        connector.set_connect_delay(Duration::from_secs(1));
        let url = endpoint("ws/remote/");
        let channel = open(&connector, "ws/remote/");
        settle().await;
        assert_eq!(channel.state(), ConnectionState::Connecting);

        channel.send("sent-while-connecting").unwrap();
        settle().await;
        assert_eq!(channel.stats().sends_dropped, 1);

        wait_for_state(&channel, ConnectionState::Open).await;
        settle().await;
        assert!(connector.latest_peer(&url).sent().is_empty());
        assert_eq!(channel.stats().messages_sent, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_handler_registered_while_connecting() {
        let connector = MockConnector::new();
        connector.set_connect_delay(Duration::from_millis(300));
        let url = endpoint("ws/events/");
        let channel = open(&connector, "ws/events/");
        settle().await;

        let handler = Arc::new(RecordingHandler::default());
        channel.on_message(handler.clone()).unwrap();
        wait_for_state(&channel, ConnectionState::Open).await;

        connector.latest_peer(&url).push("first");
        settle().await;
        assert_eq!(handler.messages(), vec!["first"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_abandons_hanging_connect() {
        let connector = MockConnector::new();
        connector.hang_connects();
        let channel = open(&connector, "ws/remote/");
        settle().await;
        assert_eq!(channel.state(), ConnectionState::Connecting);

        tokio::time::timeout(Duration::from_secs(1), channel.close())
            .await
            .expect("close waited for the connection attempt");

        assert_eq!(channel.state(), ConnectionState::Disconnected);
        assert_eq!(connector.attempts(), 1);
        assert!(channel.send("too late").is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_lost_connections_are_counted() {
        let connector = MockConnector::new();
        connector.fail_next(1);
        let url = endpoint("ws/remote/");
        let channel = open(&connector, "ws/remote/");
        wait_for_state(&channel, ConnectionState::Open).await;
        assert_eq!(channel.stats().connections_lost, 0);

        connector.latest_peer(&url).close();
        wait_for_state(&channel, ConnectionState::Disconnected).await;
        assert_eq!(channel.stats().connections_lost, 1);
        assert_eq!(channel.stats().reconnects_scheduled, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_commands_are_sent_encoded() {
        let connector = MockConnector::new();
        let url = endpoint("ws/remote/");
        let channel = open(&connector, "ws/remote/");
        wait_for_state(&channel, ConnectionState::Open).await;

        channel
            .send_command(&PlayerCommand::Play {
                id: "42".to_string(),
                media_type: MediaType::Movie,
            })
            .unwrap();
        channel.send_command(&PlayerCommand::Stop).unwrap();
        settle().await;

        assert_eq!(
            connector.latest_peer(&url).sent(),
            vec![
                r#"{"command":"play","arguments":{"id":"42","type":"movie"}}"#.to_string(),
                r#"{"command":"stop","arguments":{}}"#.to_string(),
            ]
        );
        assert_eq!(channel.stats().messages_sent, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_handler_survives_reconnects() {
        let connector = MockConnector::new();
        let url = endpoint("ws/events/");
        let channel = open(&connector, "ws/events/");
        let handler = Arc::new(RecordingHandler::default());
        channel.on_message(handler.clone()).unwrap();
        wait_for_state(&channel, ConnectionState::Open).await;

        let first = connector.latest_peer(&url);
        first.push("one");
        first.push("two");
        settle().await;
        first.close();
        wait_for_state(&channel, ConnectionState::Disconnected).await;

        wait_for_state(&channel, ConnectionState::Open).await;
        connector.latest_peer(&url).push("three");
        settle().await;

        assert_eq!(handler.messages(), vec!["one", "two", "three"]);
        assert_eq!(channel.stats().messages_received, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_channels_reconnect_independently() {
        let connector = MockConnector::new();
        let commands_url = endpoint("ws/remote/");
        let events_url = endpoint("ws/events/");
        let commands = open(&connector, "ws/remote/");
        let events = open(&connector, "ws/events/");
        wait_for_state(&commands, ConnectionState::Open).await;
        wait_for_state(&events, ConnectionState::Open).await;

        connector.latest_peer(&events_url).close();
        wait_for_state(&events, ConnectionState::Disconnected).await;

        assert!(commands.is_open());
        assert_eq!(commands.stats().reconnects_scheduled, 0);
        assert_eq!(connector.peers(&commands_url).len(), 1);

        wait_for_state(&events, ConnectionState::Open).await;
        assert_eq!(connector.peers(&events_url).len(), 2);
        assert_eq!(connector.peers(&commands_url).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_flushes_and_stops_reconnecting() {
        let connector = MockConnector::new();
        let url = endpoint("ws/remote/");
        let channel = open(&connector, "ws/remote/");
        wait_for_state(&channel, ConnectionState::Open).await;

        channel.send("last words").unwrap();
        channel.close().await;

        let peer = connector.latest_peer(&url);
        assert_eq!(peer.sent(), vec!["last words".to_string()]);
        assert!(peer.closed_by_client());
        assert_eq!(channel.state(), ConnectionState::Disconnected);
        assert_eq!(connector.live_transports(), 0);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(connector.attempts(), 1);
        assert!(channel.send("too late").is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_cancels_pending_reconnect() {
        let connector = MockConnector::new();
        connector.fail_next(1);
        let channel = open(&connector, "ws/remote/");
        settle().await;
        assert_eq!(channel.stats().reconnects_scheduled, 1);

        channel.close().await;
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(connector.attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_until_open_after_retries() {
        let connector = MockConnector::new();
        connector.fail_next(2);
        let channel = open(&connector, "ws/remote/");

        channel.wait_until_open(Duration::from_secs(5)).await.unwrap();
        assert!(channel.is_open());
        assert_eq!(channel.stats().connect_attempts, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_until_open_times_out() {
        let connector = MockConnector::new();
        connector.fail_next(usize::MAX);
        let channel = open(&connector, "ws/remote/");

        let result = channel.wait_until_open(Duration::from_secs(2)).await;
        assert!(result.is_err());
        assert!(channel.stats().connect_attempts >= 4);
    }
}
