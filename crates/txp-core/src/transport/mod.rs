//! Transport abstraction for txp.
//!
//! The protocol runs over any bidirectional byte stream; [`FrameStream`]
//! wraps one and exposes the frame-level send/receive primitives the
//! handshake and the transfer loop are built on.

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::Result;
use crate::protocol::{Frame, FrameType};

/// A bidirectional byte stream the protocol can run over.
///
/// Blanket-implemented for anything async-readable and async-writable, so
/// TCP sockets and in-memory duplex pipes are interchangeable.
pub trait Transport: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> Transport for T {}

/// Frame-level view of a transport stream.
#[derive(Debug)]
pub struct FrameStream<S> {
    inner: S,
}

impl<S: Transport> FrameStream<S> {
    /// Wrap a transport stream.
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Send one frame of the given type carrying the payload.
    pub async fn send(&mut self, kind: FrameType, payload: impl Into<Bytes>) -> Result<()> {
        Frame::new(kind, payload).write_to(&mut self.inner).await
    }

    /// Send an already constructed frame.
    pub async fn send_frame(&mut self, frame: &Frame) -> Result<()> {
        frame.write_to(&mut self.inner).await
    }

    /// Receive the next frame.
    pub async fn recv(&mut self) -> Result<Frame> {
        Frame::read_from(&mut self.inner).await
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Unwrap back into the underlying stream.
    pub fn into_inner(self) -> S {
        self.inner
    }
}
