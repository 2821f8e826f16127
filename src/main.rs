use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use clap::{Parser, Subcommand};
use log::{debug, error, info, warn};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};

use mediaremote::channel::Channel;
use mediaremote::config::ClientConfig;
use mediaremote::data::{MediaType, Notification, PlayerCommand};
use mediaremote::logging;
use mediaremote::remote::{NotificationSink, PlayerRemote, RemoteAction, RemoteSession, StateListener};
use mediaremote::transport::WebSocketConnector;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Remote control for the media center player", long_about = None)]
struct Args {
    /// Media center web address, e.g. http://mediacenter:5000/
    #[clap(long, short)]
    server: Option<String>,

    /// JSON configuration file
    #[clap(long, short)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[clap(long, short)]
    debug: bool,

    /// Enable verbose logging
    #[clap(long, short)]
    verbose: bool,

    #[clap(subcommand)]
    command: RemoteCommand,
}

#[derive(Subcommand, Debug)]
enum RemoteCommand {
    /// Show player state and notifications pushed by the server
    Monitor {
        /// Read action names (toggle, next, ...) and "volume <n>" from stdin
        #[clap(long, short)]
        interactive: bool,
    },
    /// Play a video
    Play {
        id: String,
        /// movie or tv
        #[clap(long = "type", default_value = "movie")]
        media_type: MediaType,
    },
    /// Append a video to the playlist
    Queue {
        id: String,
        #[clap(long = "type", default_value = "movie")]
        media_type: MediaType,
    },
    /// Play a whole season of a series
    PlaySeason { series_id: String, season: u32 },
    /// Append a whole season of a series to the playlist
    QueueSeason { series_id: String, season: u32 },
    /// Set the volume
    Volume { volume: i64 },
    /// Select a subtitle stream
    Subtitle { sid: String },
    /// Select an audio stream
    Audio { aid: String },
    SeekForward,
    SeekBackward,
    /// Pause or resume playback
    Toggle,
    Previous,
    Next,
    Stop,
}

impl RemoteCommand {
    fn into_player_command(self) -> Option<PlayerCommand> {
        let command = match self {
            RemoteCommand::Monitor { .. } => return None,
            RemoteCommand::Play { id, media_type } => PlayerCommand::Play { id, media_type },
            RemoteCommand::Queue { id, media_type } => PlayerCommand::Queue { id, media_type },
            RemoteCommand::PlaySeason { series_id, season } => PlayerCommand::PlaySeason { id: series_id, season },
            RemoteCommand::QueueSeason { series_id, season } => PlayerCommand::QueueSeason { id: series_id, season },
            RemoteCommand::Volume { volume } => PlayerCommand::Volume { volume },
            RemoteCommand::Subtitle { sid } => PlayerCommand::Subtitle { sid },
            RemoteCommand::Audio { aid } => PlayerCommand::Audio { aid },
            RemoteCommand::SeekForward => PlayerCommand::SeekForward,
            RemoteCommand::SeekBackward => PlayerCommand::SeekBackward,
            RemoteCommand::Toggle => PlayerCommand::Toggle,
            RemoteCommand::Previous => PlayerCommand::Previous,
            RemoteCommand::Next => PlayerCommand::Next,
            RemoteCommand::Stop => PlayerCommand::Stop,
        };
        Some(command)
    }
}

/// Prints notifications to the terminal
struct ConsoleNotifier;

impl NotificationSink for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        println!("[{}] {}", notification.severity, notification.display_text());
    }
}

/// Prints every state change
struct StatePrinter;

impl StateListener for StatePrinter {
    fn on_state_changed(&self, attribute: &str, value: &Value) {
        println!("{} = {}", attribute, value);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match ClientConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Could not load {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => ClientConfig::default(),
    };
    if let Some(server) = args.server {
        config.server = server;
    }

    let mut log_args = Vec::new();
    if args.debug {
        log_args.push("--debug".to_string());
    }
    if args.verbose {
        log_args.push("--verbose".to_string());
    }
    if let Err(e) = logging::initialize_logging_with_args(&log_args, config.logging.as_ref()) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let result = match args.command {
        RemoteCommand::Monitor { interactive } => monitor(&config, interactive).await,
        command => match command.into_player_command() {
            Some(command) => send_once(&config, command).await,
            None => Ok(()),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("✗ {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Connect, send a single command and disconnect
async fn send_once(config: &ClientConfig, command: PlayerCommand) -> Result<(), Box<dyn Error>> {
    let channel = Arc::new(Channel::open(
        config.command_endpoint()?,
        Arc::new(WebSocketConnector::new()),
        config.channel_options(),
    ));
    channel.wait_until_open(config.connect_timeout()).await?;

    let remote = PlayerRemote::new(channel.clone(), config.volume_debounce());
    remote.send(command.clone())?;
    channel.close().await;

    println!("✓ Sent {}", command);
    Ok(())
}

async fn monitor(config: &ClientConfig, interactive: bool) -> Result<(), Box<dyn Error>> {
    let session = RemoteSession::connect(config, Arc::new(WebSocketConnector::new()), Arc::new(ConsoleNotifier))?;

    let printer: Arc<dyn StateListener> = Arc::new(StatePrinter);
    session.synchronizer().register_listener(Arc::downgrade(&printer));

    info!("Monitoring {}, press Ctrl+C to exit", config.server);

    if interactive {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => break,
                line = lines.next_line() => match line? {
                    Some(line) => handle_input(session.player(), line.trim()),
                    None => break,
                },
            }
        }
    } else {
        tokio::signal::ctrl_c().await?;
    }

    println!("\nShutting down...");
    session.close().await;
    drop(printer);
    Ok(())
}

fn handle_input(remote: &PlayerRemote, line: &str) {
    if line.is_empty() {
        return;
    }

    if let Some(volume) = line.strip_prefix("volume ") {
        match volume.trim().parse::<i64>() {
            Ok(volume) => remote.adjust_volume(volume),
            Err(_) => warn!("Invalid volume '{}'", volume),
        }
        return;
    }

    match RemoteAction::from_str(line) {
        Ok(action) => {
            debug!("Performing {}", action);
            if let Err(e) = action.perform(remote) {
                warn!("{} failed: {}", action, e);
            }
        }
        Err(_) => println!("Unknown action '{}'", line),
    }
}
