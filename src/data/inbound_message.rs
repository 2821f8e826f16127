use serde::{Serialize, Deserialize};
use serde_json::Value;
use log::debug;

use super::Severity;

/// Messages pushed by the server over the event channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InboundMessage {
    /// A single player attribute changed
    Player {
        attribute: String,

        #[serde(default)]
        value: Value,
    },

    /// Something the user should see
    Notification {
        #[serde(default)]
        level: Severity,

        #[serde(default)]
        message: String,
    },
}

impl InboundMessage {
    pub fn player(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        InboundMessage::Player {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    pub fn notification(level: impl Into<Severity>, message: impl Into<String>) -> Self {
        InboundMessage::Notification {
            level: level.into(),
            message: message.into(),
        }
    }

    /// Parse a text frame.
    ///
    /// Returns `Ok(None)` for well-formed JSON carrying a message type this
    /// client does not handle.
    pub fn parse(text: &str) -> Result<Option<Self>, serde_json::Error> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Interpret an already decoded JSON value
    pub fn from_value(value: Value) -> Result<Option<Self>, serde_json::Error> {
        match value.get("type").and_then(Value::as_str) {
            Some("player") | Some("notification") => serde_json::from_value(value).map(Some),
            other => {
                debug!("Ignoring event of type {:?}", other);
                Ok(None)
            }
        }
    }
}
