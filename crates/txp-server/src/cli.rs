//! Server CLI implementation.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser, ValueEnum};

use txp_core::constants::{
    DEFAULT_HEARTBEAT_SECS, DEFAULT_IDLE_TIMEOUT_SECS, DEFAULT_MAX_CHUNK, DEFAULT_MAX_FRAME,
    DEFAULT_MAX_WINDOW, FEAT_ALL, FEAT_AUTHENTICATED_FRAME, FEAT_CHECKSUM, FEAT_COMPRESSION,
    FEAT_CUMULATIVE_ACK, FEAT_IDLE_HEARTBEAT, FEAT_RESUME, FEAT_TRANSPORT_SECURITY,
};
use txp_core::handshake::ServerParams;
use txp_core::protocol::ServerLimits;

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

/// txp server - receives files over the framed TCP protocol.
#[derive(Debug, Parser)]
#[command(
    name = "txp-server",
    version,
    about = "txp server - receives files over the framed TCP protocol"
)]
pub struct Cli {
    /// Address to listen on
    #[arg(short = 'b', long = "bind", default_value = "0.0.0.0")]
    pub bind_addr: IpAddr,

    /// Port to listen on
    #[arg(short = 'p', long = "port", default_value = "8080")]
    pub port: u16,

    /// Directory received files are written into
    #[arg(short = 'o', long = "output-dir", default_value = "received")]
    pub output_dir: PathBuf,

    /// Feature to advertise as supported (repeatable; all when omitted)
    #[arg(long = "feature", value_enum, action = ArgAction::Append, value_name = "NAME")]
    pub features: Vec<Feature>,

    /// Largest frame accepted from a peer, in bytes
    #[arg(long = "max-frame", default_value_t = DEFAULT_MAX_FRAME)]
    pub max_frame: u32,

    /// Largest data chunk accepted from a peer, in bytes
    #[arg(long = "max-chunk", default_value_t = DEFAULT_MAX_CHUNK)]
    pub max_chunk: u32,

    /// Largest window, in outstanding chunks
    #[arg(long = "max-window", default_value_t = DEFAULT_MAX_WINDOW)]
    pub max_window: u32,

    /// Idle timeout granted when the peer leaves it unset, in seconds
    #[arg(long = "idle-timeout", default_value_t = DEFAULT_IDLE_TIMEOUT_SECS)]
    pub idle_timeout: u16,

    /// Heartbeat interval granted when the peer leaves it unset, in seconds
    #[arg(long = "heartbeat", default_value_t = DEFAULT_HEARTBEAT_SECS)]
    pub heartbeat: u16,

    /// Bound on each handshake read and write, in seconds
    #[arg(long = "handshake-timeout", default_value = "10", value_name = "SECONDS")]
    pub handshake_timeout_secs: u64,

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
    /// The socket address to bind to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }

    /// The supported-feature mask: the listed features, or every defined
    /// bit when none were listed.
    pub fn supported_features(&self) -> u32 {
        if self.features.is_empty() {
            FEAT_ALL
        } else {
            self.features.iter().fold(0, |mask, f| mask | f.bit())
        }
    }

    /// Handshake parameters derived from the arguments.
    pub fn server_params(&self) -> ServerParams {
        let timeout = Duration::from_secs(self.handshake_timeout_secs);
        ServerParams {
            limits: ServerLimits {
                supported_features: self.supported_features(),
                max_frame: self.max_frame,
                max_chunk: self.max_chunk,
                max_window: self.max_window,
                idle_timeout_secs: self.idle_timeout,
                heartbeat_secs: self.heartbeat,
            },
            read_timeout: timeout,
            write_timeout: timeout,
        }
    }
}
