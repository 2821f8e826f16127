use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use serde::{Serialize, Deserialize};
use serde_json::Value;

/// Attribute names the player backend is known to push
pub mod attributes {
    pub const VOLUME: &str = "volume";
    pub const NOW_PLAYING: &str = "now_playing";
    pub const PROGRESS_PERCENT: &str = "progress_percent";
    pub const PROGRESS_TEXT: &str = "progress_text";
    pub const SELECTED_SUBTITLE: &str = "selected_subtitle";
    pub const SELECTED_AUDIO: &str = "selected_audio";
    pub const AVAILABLE_SUBTITLES: &str = "available_subtitles";
    pub const AVAILABLE_AUDIO: &str = "available_audio";
}

/// Local mirror of the remote player's state.
///
/// Attributes are stored exactly as received. Nothing is validated, so
/// attributes added by newer servers show up here without code changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteState {
    attributes: HashMap<String, Value>,
}

/// RemoteState shared between the synchronizer (writer) and readers
pub type SharedRemoteState = Arc<RwLock<RemoteState>>;

impl RemoteState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedRemoteState {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Overwrite an attribute, returning the previous value
    pub fn set(&mut self, attribute: impl Into<String>, value: Value) -> Option<Value> {
        self.attributes.insert(attribute.into(), value)
    }

    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.attributes.get(attribute)
    }

    pub fn contains(&self, attribute: &str) -> bool {
        self.attributes.contains_key(attribute)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.attributes.iter()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn volume(&self) -> Option<f64> {
        self.get(attributes::VOLUME).and_then(Value::as_f64)
    }

    pub fn now_playing(&self) -> Option<&str> {
        self.get_str(attributes::NOW_PLAYING)
    }

    pub fn progress_percent(&self) -> Option<f64> {
        self.get(attributes::PROGRESS_PERCENT).and_then(Value::as_f64)
    }

    pub fn progress_text(&self) -> Option<&str> {
        self.get_str(attributes::PROGRESS_TEXT)
    }

    /// Selected subtitle stream. The server sends ids as strings but older
    /// versions pushed numbers, so both are accepted.
    pub fn selected_subtitle(&self) -> Option<String> {
        self.get(attributes::SELECTED_SUBTITLE).and_then(value_as_id)
    }

    pub fn selected_audio(&self) -> Option<String> {
        self.get(attributes::SELECTED_AUDIO).and_then(value_as_id)
    }

    pub fn available_subtitles(&self) -> Option<&Value> {
        self.get(attributes::AVAILABLE_SUBTITLES)
    }

    pub fn available_audio(&self) -> Option<&Value> {
        self.get(attributes::AVAILABLE_AUDIO)
    }

    fn get_str(&self, attribute: &str) -> Option<&str> {
        self.get(attribute).and_then(Value::as_str)
    }
}

fn value_as_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
