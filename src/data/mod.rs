// Data structures exchanged with the media center

pub mod inbound_message;
pub mod notification;
pub mod player_command;
pub mod remote_state;

// Re-export types from child modules
pub use inbound_message::*;
pub use notification::*;
pub use player_command::*;
pub use remote_state::{RemoteState, SharedRemoteState, attributes};
