//! Protocol and configuration constants for txp.

use std::time::Duration;

// =============================================================================
// Wire Constants
// =============================================================================

/// Magic constant identifying the protocol family (`b"TXT1"` big-endian).
pub const WIRE_MAGIC: u32 = u32::from_be_bytes(*b"TXT1");

/// Current protocol version.
pub const PROTOCOL_VERSION: u8 = 1;

/// Current protocol minor version offered in the Hello proposal.
pub const PROTO_MINOR: u8 = 1;

/// Frame header length in bytes, declared inside every header.
pub const HEADER_LEN: u8 = 11;

/// Maximum frame payload length (1 MiB).
pub const MAX_PAYLOAD_LEN: u32 = 1 << 20;

/// Connection nonce length in bytes.
pub const NONCE_LEN: usize = 16;

// =============================================================================
// Feature Bits
// =============================================================================

/// Cumulative acknowledgements for Data frames.
pub const FEAT_CUMULATIVE_ACK: u32 = 1 << 0;

/// Transfer resumption.
pub const FEAT_RESUME: u32 = 1 << 1;

/// Per-chunk checksums.
pub const FEAT_CHECKSUM: u32 = 1 << 2;

/// Authenticated frames.
pub const FEAT_AUTHENTICATED_FRAME: u32 = 1 << 3;

/// Payload compression.
pub const FEAT_COMPRESSION: u32 = 1 << 4;

/// Heartbeats while the connection is idle.
pub const FEAT_IDLE_HEARTBEAT: u32 = 1 << 5;

/// Peer demands the connection run over a secured transport.
pub const FEAT_TRANSPORT_SECURITY: u32 = 1 << 6;

/// Every feature bit currently assigned.
///
/// The bits are negotiated and reported but none of them enables a mechanism
/// yet; the session only accounts for them.
pub const FEAT_ALL: u32 = FEAT_CUMULATIVE_ACK
    | FEAT_RESUME
    | FEAT_CHECKSUM
    | FEAT_AUTHENTICATED_FRAME
    | FEAT_COMPRESSION
    | FEAT_IDLE_HEARTBEAT
    | FEAT_TRANSPORT_SECURITY;

// =============================================================================
// Timing Constants
// =============================================================================

/// Default bound on handshake reads and writes.
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

// =============================================================================
// Default Session Limits
// =============================================================================

/// Default maximum frame size (one 64 KiB chunk plus its header).
pub const DEFAULT_MAX_FRAME: u32 = (1 << 16) + HEADER_LEN as u32;

/// Default maximum chunk size.
pub const DEFAULT_MAX_CHUNK: u32 = 1 << 16;

/// Default maximum window, in outstanding chunks.
pub const DEFAULT_MAX_WINDOW: u32 = 64;

/// Default idle timeout in seconds.
pub const DEFAULT_IDLE_TIMEOUT_SECS: u16 = 30;

/// Default heartbeat interval in seconds.
pub const DEFAULT_HEARTBEAT_SECS: u16 = 10;
