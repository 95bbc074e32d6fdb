//! Wire frame codec for txp messages.
//!
//! Format: 11-byte big-endian header followed by the raw payload.
//!
//! Header layout: magic(4) | version(1) | type(1) | header-len(1) |
//! payload-len(4). The codec enforces the fixed header fields and the
//! payload bound; it attaches no meaning to the type byte. Frames whose
//! type value is unknown decode successfully and are rejected by whichever
//! layer required a specific type.

use std::fmt;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::constants::{HEADER_LEN, MAX_PAYLOAD_LEN, PROTOCOL_VERSION, WIRE_MAGIC};
use crate::error::{Error, Result};

/// Assigned frame type values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FrameType {
    /// Client proposal opening the handshake.
    Hello = 1,
    /// File name announcement, first frame after the handshake.
    FileName = 2,
    /// One chunk of file bytes.
    Data = 3,
    /// End of transfer, empty payload.
    Done = 4,
    /// Server acknowledgement closing the handshake.
    HelloAck = 5,
}

impl FrameType {
    /// The wire value of this type.
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Map a wire value back to a known type, if any.
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(FrameType::Hello),
            2 => Some(FrameType::FileName),
            3 => Some(FrameType::Data),
            4 => Some(FrameType::Done),
            5 => Some(FrameType::HelloAck),
            _ => None,
        }
    }
}

impl fmt::Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FrameType::Hello => "Hello",
            FrameType::FileName => "FileName",
            FrameType::Data => "Data",
            FrameType::Done => "Done",
            FrameType::HelloAck => "HelloAck",
        };
        f.write_str(name)
    }
}

/// One protocol message unit: header fields plus opaque payload.
///
/// The payload length is derived from the payload buffer rather than stored,
/// so the length-matches-payload invariant holds by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Protocol family magic; must equal [`WIRE_MAGIC`].
    pub magic: u32,
    /// Protocol version; must equal [`PROTOCOL_VERSION`].
    pub version: u8,
    /// Raw type discriminator.
    pub kind: u8,
    /// Declared header size; must equal [`HEADER_LEN`].
    pub header_len: u8,
    /// Opaque payload bytes.
    pub payload: Bytes,
}

impl Frame {
    /// Build a well-formed frame of the given type.
    pub fn new(kind: FrameType, payload: impl Into<Bytes>) -> Self {
        Self {
            magic: WIRE_MAGIC,
            version: PROTOCOL_VERSION,
            kind: kind.as_u8(),
            header_len: HEADER_LEN,
            payload: payload.into(),
        }
    }

    /// Declared payload length.
    pub fn payload_len(&self) -> u32 {
        self.payload.len() as u32
    }

    /// Whether this frame carries the given known type.
    pub fn is(&self, kind: FrameType) -> bool {
        self.kind == kind.as_u8()
    }

    /// Encode header and payload into a single buffer.
    ///
    /// Fails with [`Error::InvalidFrame`] when any fixed field does not
    /// equal its protocol constant.
    pub fn encode(&self) -> Result<Bytes> {
        if self.magic != WIRE_MAGIC {
            return Err(Error::InvalidFrame { field: "magic" });
        }
        if self.version != PROTOCOL_VERSION {
            return Err(Error::InvalidFrame { field: "version" });
        }
        if self.header_len != HEADER_LEN {
            return Err(Error::InvalidFrame {
                field: "header length",
            });
        }

        let mut buf = BytesMut::with_capacity(HEADER_LEN as usize + self.payload.len());
        buf.put_u32(self.magic);
        buf.put_u8(self.version);
        buf.put_u8(self.kind);
        buf.put_u8(self.header_len);
        buf.put_u32(self.payload_len());
        buf.put_slice(&self.payload);

        Ok(buf.freeze())
    }

    /// Validate a raw header and extract the type and payload length.
    ///
    /// Fixed fields are checked in wire order, and the payload bound is
    /// enforced before any payload buffer exists.
    fn parse_header(hdr: &[u8; HEADER_LEN as usize]) -> Result<(u8, u32)> {
        let mut buf = &hdr[..];

        let magic = buf.get_u32();
        if magic != WIRE_MAGIC {
            return Err(Error::BadMagic { found: magic });
        }

        let version = buf.get_u8();
        if version != PROTOCOL_VERSION {
            return Err(Error::BadVersion { found: version });
        }

        let kind = buf.get_u8();

        let header_len = buf.get_u8();
        if header_len != HEADER_LEN {
            return Err(Error::BadHeaderLength { found: header_len });
        }

        let payload_len = buf.get_u32();
        if payload_len > MAX_PAYLOAD_LEN {
            return Err(Error::PayloadTooLarge {
                length: payload_len,
                max: MAX_PAYLOAD_LEN,
            });
        }

        Ok((kind, payload_len))
    }

    /// Read exactly one frame from the stream.
    ///
    /// Reads the header first and rejects it before the payload is touched;
    /// a short read surfaces as the underlying I/O error. No frame is
    /// returned on any failure path.
    pub async fn read_from<R>(reader: &mut R) -> Result<Frame>
    where
        R: AsyncRead + Unpin,
    {
        let mut hdr = [0u8; HEADER_LEN as usize];
        reader.read_exact(&mut hdr).await?;

        let (kind, payload_len) = Self::parse_header(&hdr)?;

        let payload = if payload_len == 0 {
            Bytes::new()
        } else {
            let mut buf = vec![0u8; payload_len as usize];
            reader.read_exact(&mut buf).await?;
            Bytes::from(buf)
        };

        Ok(Frame {
            magic: WIRE_MAGIC,
            version: PROTOCOL_VERSION,
            kind,
            header_len: HEADER_LEN,
            payload,
        })
    }

    /// Write this frame to the stream.
    ///
    /// `write_all` retries partial writes internally, so from the caller's
    /// perspective the write is atomic: either the whole frame is
    /// transmitted or the transport error aborts it.
    pub async fn write_to<W>(&self, writer: &mut W) -> Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let encoded = self.encode()?;
        writer.write_all(&encoded).await?;
        writer.flush().await?;
        Ok(())
    }

    /// Decode from a complete in-memory buffer (convenience for testing).
    pub fn decode_slice(data: &[u8]) -> Result<Frame> {
        let header_len = HEADER_LEN as usize;
        if data.len() < header_len {
            return Err(short_input());
        }

        let hdr: [u8; HEADER_LEN as usize] = data[..header_len]
            .try_into()
            .expect("slice length checked above");
        let (kind, payload_len) = Self::parse_header(&hdr)?;

        let end = header_len + payload_len as usize;
        if data.len() < end {
            return Err(short_input());
        }

        Ok(Frame {
            magic: WIRE_MAGIC,
            version: PROTOCOL_VERSION,
            kind,
            header_len: HEADER_LEN,
            payload: Bytes::copy_from_slice(&data[header_len..end]),
        })
    }
}

fn short_input() -> Error {
    Error::Io(std::io::Error::new(
        std::io::ErrorKind::UnexpectedEof,
        "truncated frame",
    ))
}
