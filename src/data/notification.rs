use std::fmt;
use std::time::Duration;
use serde::{Serialize, Deserialize};

/// Severity of a notification pushed by the server.
///
/// Unknown levels are kept verbatim so they can still be displayed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    Success,
    #[default]
    Info,
    Error,
    Warning,
    Other(String),
}

impl Severity {
    /// Icon shown in front of the message, if the level has one
    pub fn icon(&self) -> Option<&'static str> {
        match self {
            Severity::Success => Some("✔"),
            Severity::Info => Some("ℹ"),
            Severity::Error => Some("✖"),
            Severity::Warning => Some("!"),
            Severity::Other(_) => None,
        }
    }

    /// How long the message stays visible
    pub fn ttl(&self) -> Duration {
        match self {
            Severity::Success => Duration::from_secs(2),
            Severity::Info | Severity::Other(_) => Duration::from_secs(3),
            Severity::Error => Duration::from_secs(5),
            Severity::Warning => Duration::from_secs(10),
        }
    }

    /// Log level used when a notification is written to the log
    pub fn log_level(&self) -> log::Level {
        match self {
            Severity::Error => log::Level::Error,
            Severity::Warning => log::Level::Warn,
            _ => log::Level::Info,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Severity::Success => "success",
            Severity::Info => "info",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Other(level) => level,
        }
    }
}

impl From<&str> for Severity {
    fn from(level: &str) -> Self {
        match level {
            "success" => Severity::Success,
            "info" => Severity::Info,
            "error" => Severity::Error,
            "warning" => Severity::Warning,
            other => Severity::Other(other.to_string()),
        }
    }
}

impl From<String> for Severity {
    fn from(level: String) -> Self {
        Severity::from(level.as_str())
    }
}

impl From<Severity> for String {
    fn from(severity: Severity) -> Self {
        severity.as_str().to_string()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A transient message for the user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
    pub icon: Option<&'static str>,
    pub ttl: Duration,
}

impl Notification {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            icon: severity.icon(),
            ttl: severity.ttl(),
            severity,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Severity::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Message text with the icon prepended
    pub fn display_text(&self) -> String {
        match self.icon {
            Some(icon) => format!("{} {}", icon, self.message),
            None => self.message.clone(),
        }
    }
}
