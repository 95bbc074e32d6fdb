//! Capability-negotiation handshake for txp connections.
//!
//! # Flow
//!
//! - **Initiator** ([`connect`]): sends Hello, receives and validates HelloAck
//! - **Responder** ([`accept`]): receives Hello, negotiates, sends HelloAck
//!
//! Both sides end up holding an equivalent [`Approved`] view; the initiator
//! trusts the responder's stated results but independently re-validates the
//! required-feature subset and the chunk-fits-in-frame constraint.
//!
//! All reads and writes here are deadline-bounded. A deadline expiry
//! surfaces as [`Error::Timeout`] and is fatal to the attempt; any retry
//! policy belongs to the caller on a fresh connection.

use std::time::Duration;

use tokio::time::timeout;
use tracing::debug;

use crate::constants::{
    DEFAULT_HEARTBEAT_SECS, DEFAULT_IDLE_TIMEOUT_SECS, DEFAULT_MAX_CHUNK, DEFAULT_MAX_FRAME,
    DEFAULT_MAX_WINDOW, HANDSHAKE_TIMEOUT, HEADER_LEN, NONCE_LEN, PROTO_MINOR,
};
use crate::error::{Error, Result};
use crate::protocol::{
    negotiate, FrameType, HelloAcknowledgement, HelloProposal, Negotiated, ServerLimits,
};
use crate::transport::{FrameStream, Transport};

/// Parameters for the initiating side of the handshake.
#[derive(Debug, Clone, Copy)]
pub struct ClientParams {
    /// Protocol minor version to offer.
    pub proto_minor: u8,
    /// Feature bits the session cannot work without.
    pub required_features: u8,
    /// Feature bits requested best-effort.
    pub optional_features: u8,
    /// Largest frame this side is willing to handle.
    pub max_frame: u32,
    /// Largest chunk this side is willing to handle, zero for the
    /// responder's default.
    pub max_chunk: u32,
    /// Largest window in outstanding chunks.
    pub max_window: u32,
    /// Idle timeout in seconds, zero for the responder's default.
    pub idle_timeout_secs: u16,
    /// Heartbeat interval in seconds, zero for the responder's default.
    pub heartbeat_secs: u16,
    /// Connection nonce. Leave all-zero to have a fresh random nonce
    /// generated per connection.
    pub nonce: [u8; NONCE_LEN],
    /// Bound on the whole exchange. Zero falls back to the default.
    pub handshake_timeout: Duration,
}

impl Default for ClientParams {
    fn default() -> Self {
        Self {
            proto_minor: PROTO_MINOR,
            required_features: 0,
            optional_features: 0,
            max_frame: DEFAULT_MAX_FRAME,
            max_chunk: DEFAULT_MAX_CHUNK,
            max_window: DEFAULT_MAX_WINDOW,
            idle_timeout_secs: DEFAULT_IDLE_TIMEOUT_SECS,
            heartbeat_secs: DEFAULT_HEARTBEAT_SECS,
            nonce: [0; NONCE_LEN],
            handshake_timeout: HANDSHAKE_TIMEOUT,
        }
    }
}

/// Parameters for the responding side of the handshake.
#[derive(Debug, Clone, Copy)]
pub struct ServerParams {
    /// Supported features and ceilings fed to the negotiator.
    pub limits: ServerLimits,
    /// Bound on reading the proposal. Zero falls back to the default.
    pub read_timeout: Duration,
    /// Bound on writing the acknowledgement. Zero falls back to the default.
    pub write_timeout: Duration,
}

impl Default for ServerParams {
    fn default() -> Self {
        Self {
            limits: ServerLimits::default(),
            read_timeout: HANDSHAKE_TIMEOUT,
            write_timeout: HANDSHAKE_TIMEOUT,
        }
    }
}

/// The agreed session description both sides derive after a successful
/// handshake.
///
/// Immutable once constructed; the transfer phase uses it to size its chunk
/// buffer and respect the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Approved {
    /// Accepted protocol minor version.
    pub proto_minor: u8,
    /// Feature bits in effect for the session.
    pub features: u32,
    /// Agreed maximum frame size.
    pub max_frame: u32,
    /// Agreed maximum chunk size.
    pub max_chunk: u32,
    /// Agreed maximum window.
    pub max_window: u32,
    /// Agreed idle timeout in seconds.
    pub idle_timeout_secs: u16,
    /// Agreed heartbeat interval in seconds.
    pub heartbeat_secs: u16,
    /// The connection nonce bound to this session.
    pub nonce: [u8; NONCE_LEN],
}

impl Approved {
    fn from_negotiated(negotiated: &Negotiated, nonce: [u8; NONCE_LEN]) -> Self {
        Self {
            proto_minor: negotiated.proto_minor,
            features: negotiated.accepted_features,
            max_frame: negotiated.max_frame,
            max_chunk: negotiated.max_chunk,
            max_window: negotiated.max_window,
            idle_timeout_secs: negotiated.idle_timeout_secs,
            heartbeat_secs: negotiated.heartbeat_secs,
            nonce,
        }
    }
}

fn bounded(duration: Duration) -> Duration {
    if duration.is_zero() {
        HANDSHAKE_TIMEOUT
    } else {
        duration
    }
}

/// Perform the handshake as the initiating side.
///
/// Sends Hello, receives and validates HelloAck. The whole exchange is
/// bounded by `params.handshake_timeout`; afterwards the stream carries no
/// deadline.
pub async fn connect<S: Transport>(
    stream: &mut FrameStream<S>,
    params: &ClientParams,
) -> Result<Approved> {
    match timeout(bounded(params.handshake_timeout), connect_inner(stream, params)).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout),
    }
}

async fn connect_inner<S: Transport>(
    stream: &mut FrameStream<S>,
    params: &ClientParams,
) -> Result<Approved> {
    // A fresh random nonce per connection unless the caller pinned one.
    let mut nonce = params.nonce;
    if nonce == [0u8; NONCE_LEN] {
        nonce = rand::random();
    }

    let proposal = HelloProposal {
        proto_minor: params.proto_minor,
        required_features: params.required_features,
        optional_features: params.optional_features,
        max_frame: params.max_frame,
        max_chunk: params.max_chunk,
        max_window: params.max_window,
        idle_timeout_secs: params.idle_timeout_secs,
        heartbeat_secs: params.heartbeat_secs,
        nonce,
    };
    stream
        .send(FrameType::Hello, proposal.encode().to_vec())
        .await?;

    let frame = stream.recv().await?;
    if !frame.is(FrameType::HelloAck) {
        return Err(Error::UnexpectedFrameType {
            expected: FrameType::HelloAck.as_u8(),
            found: frame.kind,
        });
    }

    let ack = HelloAcknowledgement::decode(&frame.payload)?;

    // Binds the acknowledgement to this proposal.
    if ack.nonce_echo != nonce {
        return Err(Error::NonceMismatch);
    }

    let required = u32::from(params.required_features);
    let rejected = required & !ack.accepted_features;
    if rejected != 0 {
        return Err(Error::RequiredFeatureRejected { mask: rejected });
    }

    if u64::from(ack.max_chunk) + u64::from(HEADER_LEN) > u64::from(ack.max_frame) {
        return Err(Error::ChunkExceedsFrame {
            chunk: ack.max_chunk,
            frame: ack.max_frame,
        });
    }

    debug!(
        features = ack.accepted_features,
        disabled = ack.disabled_features,
        max_frame = ack.max_frame,
        max_chunk = ack.max_chunk,
        max_window = ack.max_window,
        "handshake accepted by peer"
    );

    Ok(Approved {
        proto_minor: ack.proto_minor,
        features: ack.accepted_features,
        max_frame: ack.max_frame,
        max_chunk: ack.max_chunk,
        max_window: ack.max_window,
        idle_timeout_secs: ack.idle_timeout_secs,
        heartbeat_secs: ack.heartbeat_secs,
        nonce,
    })
}

/// Perform the handshake as the responding side.
///
/// Receives Hello, negotiates, sends HelloAck. When negotiation fails no
/// acknowledgement is written; the caller should close the connection.
pub async fn accept<S: Transport>(
    stream: &mut FrameStream<S>,
    params: &ServerParams,
) -> Result<Approved> {
    let frame = match timeout(bounded(params.read_timeout), stream.recv()).await {
        Ok(result) => result?,
        Err(_) => return Err(Error::Timeout),
    };
    if !frame.is(FrameType::Hello) {
        return Err(Error::UnexpectedFrameType {
            expected: FrameType::Hello.as_u8(),
            found: frame.kind,
        });
    }

    let proposal = HelloProposal::decode(&frame.payload)?;
    let negotiated = negotiate(&proposal, &params.limits)?;

    let ack = HelloAcknowledgement {
        proto_minor: negotiated.proto_minor,
        accepted_features: negotiated.accepted_features,
        max_frame: negotiated.max_frame,
        max_chunk: negotiated.max_chunk,
        max_window: negotiated.max_window,
        idle_timeout_secs: negotiated.idle_timeout_secs,
        heartbeat_secs: negotiated.heartbeat_secs,
        nonce_echo: proposal.nonce,
        disabled_features: negotiated.disabled_features,
    };
    match timeout(
        bounded(params.write_timeout),
        stream.send(FrameType::HelloAck, ack.encode().to_vec()),
    )
    .await
    {
        Ok(result) => result?,
        Err(_) => return Err(Error::Timeout),
    }

    debug!(
        features = negotiated.accepted_features,
        disabled = negotiated.disabled_features,
        max_frame = negotiated.max_frame,
        max_chunk = negotiated.max_chunk,
        "handshake acknowledged"
    );

    Ok(Approved::from_negotiated(&negotiated, proposal.nonce))
}
