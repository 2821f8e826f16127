// Player commands that are sent to the media center over the command channel
use serde::{Serialize, Deserialize};
use serde_json::{Map, Value};
use strum_macros::{Display, EnumString, IntoStaticStr};

/// Kind of video a play/queue command refers to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MediaType {
    /// A single movie
    Movie,

    /// A TV series episode
    Tv,
}

/// Closed set of commands understood by the player backend.
///
/// Every variant encodes to `{"command": <tag>, "arguments": {...}}`, see
/// [`PlayerCommand::encode`].
#[derive(Debug, Clone, PartialEq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum PlayerCommand {
    /// Select a subtitle stream
    Subtitle { sid: String },

    /// Select an audio stream
    Audio { aid: String },

    /// Play a video immediately
    Play { id: String, media_type: MediaType },

    /// Append a video to the playlist
    Queue { id: String, media_type: MediaType },

    /// Play all episodes of a season
    PlaySeason { id: String, season: u32 },

    /// Append all episodes of a season to the playlist
    QueueSeason { id: String, season: u32 },

    /// Set the absolute volume
    Volume { volume: i64 },

    SeekForward,
    SeekBackward,
    Toggle,
    Previous,
    Next,
    Stop,
}

/// Wire representation of a command
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandMessage {
    pub command: String,

    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl PlayerCommand {
    /// Stable wire name of the command
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// Argument mapping sent alongside the command name
    pub fn arguments(&self) -> Map<String, Value> {
        let mut arguments = Map::new();
        match self {
            PlayerCommand::Subtitle { sid } => {
                arguments.insert("sid".to_string(), Value::from(sid.as_str()));
            }
            PlayerCommand::Audio { aid } => {
                arguments.insert("aid".to_string(), Value::from(aid.as_str()));
            }
            PlayerCommand::Play { id, media_type } | PlayerCommand::Queue { id, media_type } => {
                arguments.insert("id".to_string(), Value::from(id.as_str()));
                arguments.insert("type".to_string(), Value::from(media_type.to_string()));
            }
            PlayerCommand::PlaySeason { id, season } | PlayerCommand::QueueSeason { id, season } => {
                arguments.insert("id".to_string(), Value::from(id.as_str()));
                arguments.insert("season".to_string(), Value::from(*season));
            }
            PlayerCommand::Volume { volume } => {
                arguments.insert("volume".to_string(), Value::from(*volume));
            }
            PlayerCommand::SeekForward
            | PlayerCommand::SeekBackward
            | PlayerCommand::Toggle
            | PlayerCommand::Previous
            | PlayerCommand::Next
            | PlayerCommand::Stop => {}
        }
        arguments
    }

    /// Convert to the wire message structure
    pub fn to_message(&self) -> CommandMessage {
        CommandMessage {
            command: self.name().to_string(),
            arguments: self.arguments(),
        }
    }

    /// Encode the command as a JSON text frame
    pub fn encode(&self) -> String {
        // A struct of a string and a string-keyed map always serializes
        serde_json::to_string(&self.to_message()).unwrap_or_default()
    }
}

impl std::fmt::Display for PlayerCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerCommand::Subtitle { sid } => write!(f, "subtitle:{}", sid),
            PlayerCommand::Audio { aid } => write!(f, "audio:{}", aid),
            PlayerCommand::Play { id, media_type } => write!(f, "play:{}:{}", media_type, id),
            PlayerCommand::Queue { id, media_type } => write!(f, "queue:{}:{}", media_type, id),
            PlayerCommand::PlaySeason { id, season } => write!(f, "play_season:{}:{}", id, season),
            PlayerCommand::QueueSeason { id, season } => write!(f, "queue_season:{}:{}", id, season),
            PlayerCommand::Volume { volume } => write!(f, "volume:{}", volume),
            other => write!(f, "{}", other.name()),
        }
    }
}
