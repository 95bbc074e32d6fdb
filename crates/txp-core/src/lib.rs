//! txp-core: shared library for the txp file transfer protocol.
//!
//! This crate provides:
//! - The wire frame codec and frame-level stream primitives
//! - Hello/HelloAck payload (de)serialization
//! - Pure session parameter negotiation
//! - The handshake initiator and responder
//! - Error taxonomy and logging setup shared by the binaries

pub mod constants;
pub mod error;
pub mod handshake;
pub mod logging;
pub mod protocol;
pub mod transport;

pub use error::{Error, Result};
pub use handshake::Approved;
pub use logging::{init_logging, LogFormat};
