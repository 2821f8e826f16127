// Remote control built on top of the channels

pub mod actions;
pub mod notifier;
pub mod player_remote;
pub mod session;
pub mod synchronizer;

pub use actions::RemoteAction;
pub use notifier::{LogNotifier, NotificationSink};
pub use player_remote::{PlayerRemote, DEFAULT_VOLUME_DEBOUNCE};
pub use session::RemoteSession;
pub use synchronizer::{StateListener, StateSynchronizer};
