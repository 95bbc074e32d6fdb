//! Per-connection receive logic.
//!
//! Each accepted connection runs the handshake as responder and then
//! consumes exactly one file: a FileName frame, Data frames, and a Done
//! frame. Any deviation aborts the connection with a protocol error.

use std::path::PathBuf;

use tokio::io::AsyncWriteExt;
use tracing::debug;

use txp_core::error::{Error, Result};
use txp_core::handshake::{self, ServerParams};
use txp_core::protocol::FrameType;
use txp_core::transport::{FrameStream, Transport};

/// Where and under what handshake parameters files are received.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Directory received files are written into, created on demand.
    pub output_dir: PathBuf,
    /// Handshake parameters applied to every connection.
    pub handshake: ServerParams,
}

/// Summary of one received file.
#[derive(Debug)]
pub struct ReceiveReport {
    /// Sanitized file name the peer announced.
    pub name: String,
    /// Payload bytes written to disk.
    pub bytes: u64,
    /// Full path of the written file.
    pub path: PathBuf,
}

/// Handle one connection from handshake to Done.
pub async fn handle<S: Transport>(stream: S, config: &ServerConfig) -> Result<ReceiveReport> {
    let mut stream = FrameStream::new(stream);

    let approved = handshake::accept(&mut stream, &config.handshake).await?;
    debug!(
        max_chunk = approved.max_chunk,
        max_window = approved.max_window,
        features = approved.features,
        "session negotiated"
    );

    let frame = stream.recv().await?;
    if !frame.is(FrameType::FileName) {
        return Err(Error::UnexpectedFrameType {
            expected: FrameType::FileName.as_u8(),
            found: frame.kind,
        });
    }
    let name = sanitize_file_name(&frame.payload)?;

    tokio::fs::create_dir_all(&config.output_dir).await?;
    let path = config.output_dir.join(&name);
    let mut file = tokio::fs::File::create(&path).await?;
    debug!(path = %path.display(), "receiving file");

    let mut bytes = 0u64;
    loop {
        let frame = stream.recv().await?;
        match FrameType::from_raw(frame.kind) {
            Some(FrameType::Data) => {
                if frame.payload_len() > approved.max_chunk {
                    return Err(Error::Transfer {
                        message: format!(
                            "data chunk of {} bytes exceeds negotiated {}",
                            frame.payload_len(),
                            approved.max_chunk
                        ),
                    });
                }
                file.write_all(&frame.payload).await?;
                bytes += u64::from(frame.payload_len());
            }
            Some(FrameType::Done) => break,
            _ => {
                return Err(Error::UnexpectedFrameType {
                    expected: FrameType::Data.as_u8(),
                    found: frame.kind,
                });
            }
        }
    }
    file.flush().await?;

    Ok(ReceiveReport { name, bytes, path })
}

/// Reduce a peer-supplied file name to a safe base name.
///
/// Peers cannot be trusted to send plain names: anything before the last
/// path separator is discarded, and names that reduce to nothing, `.` or
/// `..` are rejected.
fn sanitize_file_name(raw: &[u8]) -> Result<String> {
    let name = std::str::from_utf8(raw).map_err(|_| Error::Transfer {
        message: "file name is not valid UTF-8".into(),
    })?;

    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    if base.is_empty() || base == "." || base == ".." {
        return Err(Error::Transfer {
            message: format!("unusable file name {name:?}"),
        });
    }

    Ok(base.to_string())
}
