/// Data exchanged with the media center: commands, events, remote state
pub mod data;

/// Duplex connections underneath the channels
pub mod transport;

/// Auto-reconnecting channels
pub mod channel;

/// Player remote, state synchronizer and session wiring
pub mod remote;

/// Helper utilities for timers and endpoints
pub mod helpers;

pub mod config;
pub mod logging;

pub use channel::{Channel, ChannelOptions, ConnectionState};
pub use config::ClientConfig;
pub use data::{InboundMessage, MediaType, PlayerCommand, RemoteState};
pub use remote::{PlayerRemote, RemoteSession, StateSynchronizer};
