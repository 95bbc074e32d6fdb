//! Protocol module for the txp wire format.
//!
//! This module provides:
//! - The frame codec (fixed big-endian header plus opaque payload)
//! - Hello/HelloAck payload (de)serialization
//! - Pure parameter negotiation

mod frame;
mod hello;
mod negotiate;

#[cfg(test)]
mod proptest;

pub use frame::{Frame, FrameType};
pub use hello::{HelloAcknowledgement, HelloProposal, ACK_LEN, PROPOSAL_LEN};
pub use negotiate::{negotiate, Negotiated, ServerLimits};
