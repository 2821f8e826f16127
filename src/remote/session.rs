use std::sync::Arc;
use log::{debug, info};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::channel::{Channel, ChannelCounters, ConnectionState};
use crate::config::{ClientConfig, ConfigError};
use crate::data::{Notification, RemoteState, SharedRemoteState};
use crate::transport::Connector;
use super::notifier::NotificationSink;
use super::player_remote::PlayerRemote;
use super::synchronizer::StateSynchronizer;

pub const CONNECTION_LOST_MESSAGE: &str = "Connection to server lost, reconnecting...";
pub const RECONNECTED_MESSAGE: &str = "Reconnected to server";

/// A connected remote: command channel, event channel and the state they
/// maintain.
///
/// The two channels are independent; each reconnects on its own.
pub struct RemoteSession {
    player: PlayerRemote,
    commands: Arc<Channel>,
    events: Channel,
    synchronizer: Arc<StateSynchronizer>,
    connection_watch: JoinHandle<()>,
}

impl RemoteSession {
    /// Open both channels. Must be called from within a tokio runtime.
    pub fn connect(
        config: &ClientConfig,
        connector: Arc<dyn Connector>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Result<Self, ConfigError> {
        let command_endpoint = config.command_endpoint()?;
        let events_endpoint = config.events_endpoint()?;
        info!("Connecting to media center at {}", config.server);

        let synchronizer = Arc::new(StateSynchronizer::new(
            RemoteState::shared(),
            notifier.clone(),
        ));

        let events = Channel::open(events_endpoint, connector.clone(), config.channel_options());
        // Queued ahead of any frame the driver can deliver
        if let Err(e) = events.on_message(synchronizer.clone()) {
            debug!("Event channel stopped before handler registration: {}", e);
        }

        let commands = Arc::new(Channel::open(command_endpoint, connector, config.channel_options()));
        let reporter = ConnectionReporter::new(commands.counters(), notifier);
        let connection_watch = tokio::spawn(reporter.run(commands.subscribe_state()));

        let player = PlayerRemote::new(commands.clone(), config.volume_debounce());

        Ok(Self {
            player,
            commands,
            events,
            synchronizer,
            connection_watch,
        })
    }

    pub fn player(&self) -> &PlayerRemote {
        &self.player
    }

    pub fn state(&self) -> SharedRemoteState {
        self.synchronizer.state()
    }

    pub fn synchronizer(&self) -> &Arc<StateSynchronizer> {
        &self.synchronizer
    }

    pub fn command_channel(&self) -> &Channel {
        &self.commands
    }

    pub fn event_channel(&self) -> &Channel {
        &self.events
    }

    /// Flush pending commands and close both channels
    pub async fn close(self) {
        // A deliberate close is not a lost connection
        self.connection_watch.abort();
        self.player.cancel_volume_change();
        self.commands.close().await;
        self.events.close().await;
        debug!("Remote session closed");
    }
}

/// Tells the user when the command channel goes down and when it is back.
///
/// Outages are detected from the channel's lost-connection counter rather
/// than from state edges, since a watch only keeps the latest state and a
/// quick Disconnected -> Open may never be observed.
struct ConnectionReporter {
    counters: Arc<ChannelCounters>,
    notifier: Arc<dyn NotificationSink>,
    reported_losses: u64,
    outage: bool,
}

impl ConnectionReporter {
    fn new(counters: Arc<ChannelCounters>, notifier: Arc<dyn NotificationSink>) -> Self {
        let reported_losses = counters.snapshot().connections_lost;
        Self {
            counters,
            notifier,
            reported_losses,
            outage: false,
        }
    }

    fn observe(&mut self, state: ConnectionState) {
        let losses = self.counters.snapshot().connections_lost;
        if losses > self.reported_losses {
            self.reported_losses = losses;
            if !self.outage {
                self.notifier.notify(Notification::warning(CONNECTION_LOST_MESSAGE));
                self.outage = true;
            }
        }

        if self.outage && state == ConnectionState::Open {
            self.notifier.notify(Notification::success(RECONNECTED_MESSAGE));
            self.outage = false;
        }
    }

    async fn run(mut self, mut state: watch::Receiver<ConnectionState>) {
        while state.changed().await.is_ok() {
            let current = *state.borrow_and_update();
            self.observe(current);
        }
    }
}
