//! Client CLI implementation.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser, ValueEnum};

use txp_core::constants::{
    DEFAULT_HEARTBEAT_SECS, DEFAULT_IDLE_TIMEOUT_SECS, DEFAULT_MAX_CHUNK, DEFAULT_MAX_FRAME,
    DEFAULT_MAX_WINDOW, FEAT_AUTHENTICATED_FRAME, FEAT_CHECKSUM, FEAT_COMPRESSION,
    FEAT_CUMULATIVE_ACK, FEAT_IDLE_HEARTBEAT, FEAT_RESUME, FEAT_TRANSPORT_SECURITY, NONCE_LEN,
};
use txp_core::handshake::ClientParams;

/// Log output format for CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CliLogFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// Structured JSON output.
    Json,
}

impl From<CliLogFormat> for txp_core::LogFormat {
    fn from(fmt: CliLogFormat) -> Self {
        match fmt {
            CliLogFormat::Text => txp_core::LogFormat::Text,
            CliLogFormat::Json => txp_core::LogFormat::Json,
        }
    }
}

/// Negotiable protocol feature, selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Feature {
    CumulativeAck,
    Resume,
    Checksum,
    AuthenticatedFrame,
    Compression,
    IdleHeartbeat,
    TransportSecurity,
}

impl Feature {
    /// The feature's bit in the negotiation masks.
    pub fn bit(self) -> u32 {
        match self {
            Feature::CumulativeAck => FEAT_CUMULATIVE_ACK,
            Feature::Resume => FEAT_RESUME,
            Feature::Checksum => FEAT_CHECKSUM,
            Feature::AuthenticatedFrame => FEAT_AUTHENTICATED_FRAME,
            Feature::Compression => FEAT_COMPRESSION,
            Feature::IdleHeartbeat => FEAT_IDLE_HEARTBEAT,
            Feature::TransportSecurity => FEAT_TRANSPORT_SECURITY,
        }
    }
}

/// txp client - sends a file over the framed TCP protocol.
#[derive(Debug, Parser)]
#[command(
    name = "txp",
    version,
    about = "txp client - sends a file over the framed TCP protocol"
)]
pub struct Cli {
    /// File to send
    pub file: PathBuf,

    /// Host to connect to
    #[arg(short = 'H', long = "host", default_value = "localhost")]
    pub host: String,

    /// Port to connect to
    #[arg(short = 'p', long = "port", default_value = "8080")]
    pub port: u16,

    /// Feature the session cannot work without (repeatable)
    #[arg(long = "require", value_enum, action = ArgAction::Append, value_name = "NAME")]
    pub required: Vec<Feature>,

    /// Feature requested best-effort (repeatable)
    #[arg(long = "request", value_enum, action = ArgAction::Append, value_name = "NAME")]
    pub requested: Vec<Feature>,

    /// Largest frame this side is willing to handle, in bytes
    #[arg(long = "max-frame", default_value_t = DEFAULT_MAX_FRAME)]
    pub max_frame: u32,

    /// Largest data chunk this side is willing to handle, in bytes
    /// (0 lets the server pick)
    #[arg(long = "max-chunk", default_value_t = DEFAULT_MAX_CHUNK)]
    pub max_chunk: u32,

    /// Largest window, in outstanding chunks
    #[arg(long = "max-window", default_value_t = DEFAULT_MAX_WINDOW)]
    pub max_window: u32,

    /// Idle timeout in seconds (0 takes the server default)
    #[arg(long = "idle-timeout", default_value_t = DEFAULT_IDLE_TIMEOUT_SECS)]
    pub idle_timeout: u16,

    /// Heartbeat interval in seconds (0 takes the server default)
    #[arg(long = "heartbeat", default_value_t = DEFAULT_HEARTBEAT_SECS)]
    pub heartbeat: u16,

    /// Bound on the whole handshake exchange, in seconds
    #[arg(long = "handshake-timeout", default_value = "10", value_name = "SECONDS")]
    pub handshake_timeout_secs: u64,

    /// Disable the progress bar
    #[arg(long = "no-progress")]
    pub no_progress: bool,

    /// Increase verbosity (can be repeated: -v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Log to file instead of stderr
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Log output format
    #[arg(long = "log-format", default_value = "text")]
    pub log_format: CliLogFormat,
}

impl Cli {
    fn mask(features: &[Feature]) -> u8 {
        features.iter().fold(0u32, |mask, f| mask | f.bit()) as u8
    }

    /// Handshake parameters derived from the arguments. The nonce is left
    /// zero so a fresh random one is generated per connection.
    pub fn client_params(&self) -> ClientParams {
        ClientParams {
            required_features: Self::mask(&self.required),
            optional_features: Self::mask(&self.requested),
            max_frame: self.max_frame,
            max_chunk: self.max_chunk,
            max_window: self.max_window,
            idle_timeout_secs: self.idle_timeout,
            heartbeat_secs: self.heartbeat,
            nonce: [0; NONCE_LEN],
            handshake_timeout: Duration::from_secs(self.handshake_timeout_secs),
            ..ClientParams::default()
        }
    }
}
