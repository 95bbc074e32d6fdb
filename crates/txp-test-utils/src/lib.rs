//! In-memory transport helpers for txp tests.
//!
//! Provides connected duplex pipes so protocol logic can be exercised
//! without real sockets. The raw pair is for tests that need to inject
//! hand-crafted bytes or observe exactly what a peer wrote.

use tokio::io::{duplex, DuplexStream};

use txp_core::transport::FrameStream;

/// Buffer size for in-memory pipes, large enough that handshake traffic
/// never blocks a single-task test.
const PIPE_CAPACITY: usize = 1 << 16;

/// A connected pair of frame streams over an in-memory pipe.
pub fn frame_pair() -> (FrameStream<DuplexStream>, FrameStream<DuplexStream>) {
    let (a, b) = duplex(PIPE_CAPACITY);
    (FrameStream::new(a), FrameStream::new(b))
}

/// A connected pair of raw byte streams over an in-memory pipe.
pub fn raw_pair() -> (DuplexStream, DuplexStream) {
    duplex(PIPE_CAPACITY)
}
