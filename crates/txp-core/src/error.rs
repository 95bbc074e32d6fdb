//! Error types for txp-core.

use thiserror::Error;

/// Main error type for txp operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from the underlying transport, including short reads.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A frame handed to the encoder carries a fixed field that does not
    /// match its protocol constant.
    #[error("invalid frame: bad {field}")]
    InvalidFrame { field: &'static str },

    /// Incoming frame header does not start with the protocol magic.
    #[error("bad magic: {found:#010x}")]
    BadMagic { found: u32 },

    /// Incoming frame header declares an unknown protocol version.
    #[error("bad version: {found}")]
    BadVersion { found: u8 },

    /// Incoming frame header declares a header length other than the
    /// protocol constant.
    #[error("bad header length: {found}")]
    BadHeaderLength { found: u8 },

    /// Declared payload length exceeds the configured maximum.
    #[error("payload of {length} bytes exceeds maximum {max}")]
    PayloadTooLarge { length: u32, max: u32 },

    /// Hello payload is not exactly the fixed proposal size.
    #[error("bad Hello payload length: {length}")]
    BadProposalLength { length: usize },

    /// HelloAck payload is not exactly the fixed acknowledgement size.
    #[error("bad HelloAck payload length: {length}")]
    BadAckLength { length: usize },

    /// A reserved byte or block in a handshake payload is non-zero.
    #[error("reserved bytes must be zero")]
    ReservedFieldNonZero,

    /// A frame of a specific type was required but another arrived.
    #[error("unexpected frame type: expected {expected}, got {found}")]
    UnexpectedFrameType { expected: u8, found: u8 },

    /// The acknowledgement echoed a nonce that differs from the one sent.
    #[error("nonce echo mismatch")]
    NonceMismatch,

    /// The proposal requires feature bits the responder does not support.
    #[error("unsupported required features: {mask:#04x}")]
    UnsupportedRequiredFeature { mask: u32 },

    /// The acknowledgement dropped feature bits the initiator required.
    #[error("required features rejected by peer: {mask:#04x}")]
    RequiredFeatureRejected { mask: u32 },

    /// The negotiated chunk size cannot fit inside the negotiated frame
    /// alongside its header.
    #[error("chunk size {chunk} does not fit frame size {frame}")]
    ChunkExceedsFrame { chunk: u32, frame: u32 },

    /// A deadline-bounded handshake read or write expired.
    #[error("handshake timed out")]
    Timeout,

    /// File transfer error outside the protocol core.
    #[error("transfer error: {message}")]
    Transfer { message: String },
}

impl Error {
    /// Returns true for frame-level corruption: the stream is either corrupt
    /// or the peer speaks an incompatible protocol. Never worth retrying on
    /// the same connection.
    pub fn is_malformed_frame(&self) -> bool {
        matches!(
            self,
            Error::InvalidFrame { .. }
                | Error::BadMagic { .. }
                | Error::BadVersion { .. }
                | Error::BadHeaderLength { .. }
                | Error::PayloadTooLarge { .. }
        )
    }

    /// Returns true when the peer broke the handshake contract.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            Error::UnexpectedFrameType { .. }
                | Error::NonceMismatch
                | Error::UnsupportedRequiredFeature { .. }
                | Error::RequiredFeatureRejected { .. }
                | Error::ChunkExceedsFrame { .. }
                | Error::BadProposalLength { .. }
                | Error::BadAckLength { .. }
        )
    }

    /// Returns true when reserved forward-compatibility space was not zero.
    pub fn is_reserved_violation(&self) -> bool {
        matches!(self, Error::ReservedFieldNonZero)
    }

    /// Returns true for transport failures. The attempt is dead but a fresh
    /// connection may succeed; any retry policy belongs to the caller.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Io(_) | Error::Timeout)
    }
}

/// Convenience result type for txp operations.
pub type Result<T> = std::result::Result<T, Error>;
