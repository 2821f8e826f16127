use strum_macros::{Display, EnumIter, EnumString};

use crate::channel::ChannelError;
use super::player_remote::PlayerRemote;

/// Player actions that can be triggered by name, e.g. from key bindings or
/// lines typed into the monitor.
///
/// Names resolve through this closed set only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum RemoteAction {
    #[strum(to_string = "toggle", serialize = "pause", serialize = "play_pause")]
    Toggle,
    Next,
    #[strum(to_string = "previous", serialize = "prev")]
    Previous,
    Stop,
    #[strum(to_string = "seek_forward", serialize = "ff")]
    SeekForward,
    #[strum(to_string = "seek_backward", serialize = "rew")]
    SeekBackward,
}

impl RemoteAction {
    pub fn perform(self, remote: &PlayerRemote) -> Result<(), ChannelError> {
        match self {
            RemoteAction::Toggle => remote.toggle(),
            RemoteAction::Next => remote.next(),
            RemoteAction::Previous => remote.previous(),
            RemoteAction::Stop => remote.stop(),
            RemoteAction::SeekForward => remote.seek_forward(),
            RemoteAction::SeekBackward => remote.seek_backward(),
        }
    }
}
