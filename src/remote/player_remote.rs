use std::sync::Arc;
use std::time::Duration;
use log::warn;

use crate::channel::{Channel, ChannelError};
use crate::data::{MediaType, PlayerCommand};
use crate::helpers::Debouncer;

/// Default quiet period before a volume change is sent
pub const DEFAULT_VOLUME_DEBOUNCE: Duration = Duration::from_millis(100);

/// Sends player commands over the command channel.
///
/// All methods return immediately; a command issued while the channel is
/// reconnecting is dropped.
pub struct PlayerRemote {
    channel: Arc<Channel>,
    volume: Debouncer<i64>,
}

impl PlayerRemote {
    pub fn new(channel: Arc<Channel>, volume_debounce: Duration) -> Self {
        let volume_channel = channel.clone();
        let volume = Debouncer::new(volume_debounce, move |volume| {
            if let Err(e) = volume_channel.send_command(&PlayerCommand::Volume { volume }) {
                warn!("Could not send volume change: {}", e);
            }
        });

        Self { channel, volume }
    }

    pub fn channel(&self) -> &Arc<Channel> {
        &self.channel
    }

    pub fn send(&self, command: PlayerCommand) -> Result<(), ChannelError> {
        self.channel.send_command(&command)
    }

    pub fn set_subtitle(&self, sid: impl Into<String>) -> Result<(), ChannelError> {
        self.send(PlayerCommand::Subtitle { sid: sid.into() })
    }

    pub fn set_audio(&self, aid: impl Into<String>) -> Result<(), ChannelError> {
        self.send(PlayerCommand::Audio { aid: aid.into() })
    }

    pub fn play(&self, id: impl Into<String>, media_type: MediaType) -> Result<(), ChannelError> {
        self.send(PlayerCommand::Play { id: id.into(), media_type })
    }

    pub fn queue(&self, id: impl Into<String>, media_type: MediaType) -> Result<(), ChannelError> {
        self.send(PlayerCommand::Queue { id: id.into(), media_type })
    }

    pub fn play_season(&self, series_id: impl Into<String>, season: u32) -> Result<(), ChannelError> {
        self.send(PlayerCommand::PlaySeason { id: series_id.into(), season })
    }

    pub fn queue_season(&self, series_id: impl Into<String>, season: u32) -> Result<(), ChannelError> {
        self.send(PlayerCommand::QueueSeason { id: series_id.into(), season })
    }

    /// Send a volume change right away
    pub fn set_volume(&self, volume: i64) -> Result<(), ChannelError> {
        self.send(PlayerCommand::Volume { volume })
    }

    /// Volume change from continuous input such as a slider. Only the last
    /// value of a burst is sent, once the input has been quiet for the
    /// debounce period.
    pub fn adjust_volume(&self, volume: i64) {
        self.volume.call(volume);
    }

    /// Drop a volume change that has not been sent yet
    pub fn cancel_volume_change(&self) {
        self.volume.cancel();
    }

    pub fn seek_forward(&self) -> Result<(), ChannelError> {
        self.send(PlayerCommand::SeekForward)
    }

    pub fn seek_backward(&self) -> Result<(), ChannelError> {
        self.send(PlayerCommand::SeekBackward)
    }

    pub fn toggle(&self) -> Result<(), ChannelError> {
        self.send(PlayerCommand::Toggle)
    }

    pub fn previous(&self) -> Result<(), ChannelError> {
        self.send(PlayerCommand::Previous)
    }

    pub fn next(&self) -> Result<(), ChannelError> {
        self.send(PlayerCommand::Next)
    }

    pub fn stop(&self) -> Result<(), ChannelError> {
        self.send(PlayerCommand::Stop)
    }
}
