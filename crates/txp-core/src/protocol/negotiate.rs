//! Pure session parameter negotiation.
//!
//! No I/O and no side effects: the same proposal and limits always produce
//! the same negotiated tuple, so either peer can reconstruct the result
//! from the exchanged frames alone.

use crate::constants::{
    DEFAULT_HEARTBEAT_SECS, DEFAULT_IDLE_TIMEOUT_SECS, DEFAULT_MAX_CHUNK, DEFAULT_MAX_FRAME,
    DEFAULT_MAX_WINDOW, FEAT_ALL, HEADER_LEN,
};
use crate::error::{Error, Result};
use crate::protocol::hello::HelloProposal;

/// The responder's capability set and ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerLimits {
    /// Feature bits the responder supports.
    pub supported_features: u32,
    /// Largest frame the responder accepts.
    pub max_frame: u32,
    /// Largest chunk the responder accepts.
    pub max_chunk: u32,
    /// Largest window the responder accepts.
    pub max_window: u32,
    /// Idle timeout applied when the proposal leaves it at zero.
    pub idle_timeout_secs: u16,
    /// Heartbeat interval applied when the proposal leaves it at zero.
    pub heartbeat_secs: u16,
}

impl Default for ServerLimits {
    fn default() -> Self {
        Self {
            supported_features: FEAT_ALL,
            max_frame: DEFAULT_MAX_FRAME,
            max_chunk: DEFAULT_MAX_CHUNK,
            max_window: DEFAULT_MAX_WINDOW,
            idle_timeout_secs: DEFAULT_IDLE_TIMEOUT_SECS,
            heartbeat_secs: DEFAULT_HEARTBEAT_SECS,
        }
    }
}

/// The agreed session parameters computed from a proposal and limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Negotiated {
    /// Accepted protocol minor version.
    pub proto_minor: u8,
    /// Feature bits in effect.
    pub accepted_features: u32,
    /// Wanted-but-not-accepted bits, reported back for observability.
    pub disabled_features: u32,
    /// Agreed maximum frame size.
    pub max_frame: u32,
    /// Agreed maximum chunk size. Always fits a frame next to its header.
    pub max_chunk: u32,
    /// Agreed maximum window.
    pub max_window: u32,
    /// Agreed idle timeout in seconds.
    pub idle_timeout_secs: u16,
    /// Agreed heartbeat interval in seconds.
    pub heartbeat_secs: u16,
}

/// Compute the agreed session parameters.
///
/// Fails with [`Error::UnsupportedRequiredFeature`] when the proposal
/// requires bits outside the responder's support; the connection must be
/// rejected before any acknowledgement is sent. Merely optional bits that
/// are unsupported land in `disabled_features` and never cause failure.
pub fn negotiate(proposal: &HelloProposal, limits: &ServerLimits) -> Result<Negotiated> {
    let required = u32::from(proposal.required_features);
    let unsupported = required & !limits.supported_features;
    if unsupported != 0 {
        return Err(Error::UnsupportedRequiredFeature { mask: unsupported });
    }

    let wanted = required | u32::from(proposal.optional_features);
    let accepted_features = limits.supported_features & wanted;
    let disabled_features = wanted & !accepted_features;

    let header = u32::from(HEADER_LEN);

    // A frame must be able to carry at least one payload byte.
    let mut max_frame = proposal.max_frame.min(limits.max_frame);
    if max_frame < header + 1 {
        max_frame = header + 1;
    }

    let mut max_chunk = proposal.max_chunk.min(limits.max_chunk);
    if max_chunk == 0 {
        max_chunk = (1u32 << 16).min(max_frame - header);
    }
    // A chunk must fit inside a frame alongside its header.
    if u64::from(max_chunk) + u64::from(header) > u64::from(max_frame) {
        max_chunk = max_frame - header;
    }

    let max_window = proposal.max_window.min(limits.max_window);

    let idle_timeout_secs = if proposal.idle_timeout_secs != 0 {
        proposal.idle_timeout_secs
    } else {
        limits.idle_timeout_secs
    };
    let heartbeat_secs = if proposal.heartbeat_secs != 0 {
        proposal.heartbeat_secs
    } else {
        limits.heartbeat_secs
    };

    Ok(Negotiated {
        proto_minor: proposal.proto_minor,
        accepted_features,
        disabled_features,
        max_frame,
        max_chunk,
        max_window,
        idle_timeout_secs,
        heartbeat_secs,
    })
}
