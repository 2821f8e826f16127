use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use env_logger::{Builder, Target, WriteStyle};
use log::{debug, info, LevelFilter};
use serde::{Deserialize, Serialize};
use strum_macros::{EnumIter, EnumString};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to read logging config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse logging config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unknown logging target: {0}")]
    UnknownTarget(String),

    #[error("Failed to initialize logger: {0}")]
    Init(#[from] log::SetLoggerError),
}

/// Logging subsystems of the remote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LoggingSubsystem {
    /// Binary and session setup
    Main,
    /// Reconnecting channels
    Channel,
    /// WebSocket transports
    Transport,
    /// State synchronizer, player remote and notifications
    Remote,
    /// Configuration loading
    Config,
    /// Third-party dependencies
    #[strum(serialize = "deps", serialize = "dependencies")]
    Deps,
}

impl LoggingSubsystem {
    /// Module prefixes covered by this subsystem
    pub fn module_prefixes(&self) -> &'static [&'static str] {
        match self {
            LoggingSubsystem::Main => &["mediaremote"],
            LoggingSubsystem::Channel => &["mediaremote::channel"],
            LoggingSubsystem::Transport => &["mediaremote::transport", "tokio_tungstenite", "tungstenite"],
            LoggingSubsystem::Remote => &["mediaremote::remote"],
            LoggingSubsystem::Config => &["mediaremote::config", "mediaremote::helpers::endpoint"],
            LoggingSubsystem::Deps => &["tokio", "mio", "tungstenite"],
        }
    }
}

/// Logging configuration, usually the "logging" block of the client config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Global log level (off, error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output target (stdout, stderr)
    #[serde(default = "default_target")]
    pub target: String,

    #[serde(default = "default_true")]
    pub timestamps: bool,

    #[serde(default = "default_true")]
    pub colors: bool,

    /// Per-subsystem levels; unknown names are used as module paths
    #[serde(default)]
    pub subsystems: HashMap<String, String>,

    #[serde(default)]
    pub include_module_path: bool,

    #[serde(default)]
    pub include_line_numbers: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_target() -> String {
    "stderr".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            target: default_target(),
            timestamps: true,
            colors: true,
            subsystems: HashMap::new(),
            include_module_path: false,
            include_line_numbers: false,
        }
    }
}

impl LoggingConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoggingError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, LoggingError> {
        Ok(serde_json::from_str(json)?)
    }

    fn parse_log_level(level: &str) -> LevelFilter {
        LevelFilter::from_str(level).unwrap_or_else(|_| {
            eprintln!("Warning: Unknown log level '{}', defaulting to 'info'", level);
            LevelFilter::Info
        })
    }

    /// (module, level) pairs for all configured subsystems
    fn module_filters(&self) -> Vec<(String, LevelFilter)> {
        let mut filters = Vec::new();
        for (name, level) in &self.subsystems {
            let level = Self::parse_log_level(level);
            match LoggingSubsystem::from_str(name) {
                Ok(subsystem) => {
                    for prefix in subsystem.module_prefixes() {
                        filters.push((prefix.to_string(), level));
                    }
                }
                // Allow custom module specifications
                Err(_) => filters.push((name.clone(), level)),
            }
        }
        filters.sort();
        filters
    }

    /// Filter in env_logger/RUST_LOG syntax
    pub fn build_filter_string(&self) -> String {
        let mut parts = vec![self.level.clone()];
        for (module, level) in self.module_filters() {
            parts.push(format!("{}={}", module, level.as_str().to_lowercase()));
        }
        parts.join(",")
    }

    pub fn initialize_logger(&self) -> Result<(), LoggingError> {
        let mut builder = Builder::new();
        builder.parse_env("RUST_LOG");
        builder.filter(None, Self::parse_log_level(&self.level));
        for (module, level) in self.module_filters() {
            builder.filter(Some(&module), level);
        }

        builder.write_style(if self.colors { WriteStyle::Auto } else { WriteStyle::Never });

        match self.target.to_lowercase().as_str() {
            "stdout" => builder.target(Target::Stdout),
            "stderr" => builder.target(Target::Stderr),
            other => return Err(LoggingError::UnknownTarget(other.to_string())),
        };

        let timestamps = self.timestamps;
        let include_module_path = self.include_module_path;
        let include_line_numbers = self.include_line_numbers;

        builder.format(move |buf, record| {
            if timestamps {
                write!(buf, "[{}] ", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"))?;
            }
            write!(buf, "[{}] ", record.level())?;
            if include_module_path {
                if let Some(module) = record.module_path() {
                    write!(buf, "[{}] ", module)?;
                }
            }
            if include_line_numbers {
                if let (Some(file), Some(line)) = (record.file(), record.line()) {
                    write!(buf, "[{}:{}] ", file, line)?;
                }
            }
            writeln!(buf, "{}", record.args())
        });

        builder.try_init()?;
        info!("Logging initialized with filter: {}", self.build_filter_string());
        Ok(())
    }
}

/// Initialize logging from command line flags and an optional config
///
/// `--debug`/`-d` and `--verbose`/`-v` raise the global level to debug.
pub fn initialize_logging_with_args(args: &[String], config: Option<&LoggingConfig>) -> Result<(), LoggingError> {
    let debug_mode = args.iter().any(|arg| arg == "--debug" || arg == "-d");
    let verbose_mode = args.iter().any(|arg| arg == "--verbose" || arg == "-v");

    let mut config = config.cloned().unwrap_or_default();
    if debug_mode || verbose_mode {
        config.level = "debug".to_string();
    }

    config.initialize_logger()?;
    if debug_mode {
        debug!("Debug mode enabled via command line");
    } else if verbose_mode {
        debug!("Verbose mode enabled via command line");
    }
    Ok(())
}
