//! Client-side transfer loop.
//!
//! After the handshake the file goes over as one FileName frame, Data
//! frames of at most the negotiated chunk size, and a final empty Done
//! frame. The negotiated parameters size the read buffer.

use std::path::Path;
use std::time::{Duration, Instant};

use tokio::io::AsyncReadExt;
use tracing::debug;

use txp_core::error::{Error, Result};
use txp_core::handshake::Approved;
use txp_core::protocol::FrameType;
use txp_core::transport::{FrameStream, Transport};

use crate::progress::ProgressReporter;

/// Summary of one sent file.
#[derive(Debug)]
pub struct SendReport {
    /// Payload bytes sent.
    pub bytes: u64,
    /// Number of Data frames sent.
    pub chunks: u64,
    /// Wall time spent sending.
    pub elapsed: Duration,
}

/// Send one file over an established, handshaken stream.
pub async fn send_file<S: Transport>(
    stream: &mut FrameStream<S>,
    approved: &Approved,
    path: &Path,
    show_progress: bool,
) -> Result<SendReport> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::Transfer {
            message: format!("cannot derive a file name from {}", path.display()),
        })?;

    let mut file = tokio::fs::File::open(path).await?;
    let size = file.metadata().await?.len();
    debug!(name, size, chunk = approved.max_chunk, "sending file");

    stream
        .send(FrameType::FileName, name.as_bytes().to_vec())
        .await?;

    let mut progress = ProgressReporter::new(name, size, show_progress);
    let mut buf = vec![0u8; approved.max_chunk as usize];
    let mut bytes = 0u64;
    let mut chunks = 0u64;
    let start = Instant::now();

    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        stream.send(FrameType::Data, buf[..n].to_vec()).await?;
        bytes += n as u64;
        chunks += 1;
        progress.add(n as u64);
    }

    stream.send(FrameType::Done, Vec::new()).await?;
    progress.finish();

    Ok(SendReport {
        bytes,
        chunks,
        elapsed: start.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use txp_core::constants::NONCE_LEN;
    use txp_core::protocol::Frame;
    use txp_test_utils::frame_pair;

    fn approved(max_chunk: u32) -> Approved {
        Approved {
            proto_minor: 1,
            features: 0,
            max_frame: max_chunk + 11,
            max_chunk,
            max_window: 8,
            idle_timeout_secs: 30,
            heartbeat_secs: 10,
            nonce: [0xAB; NONCE_LEN],
        }
    }

    async fn collect_frames(
        rx: &mut FrameStream<tokio::io::DuplexStream>,
        expected: usize,
    ) -> Vec<Frame> {
        let mut frames = Vec::with_capacity(expected);
        for _ in 0..expected {
            frames.push(rx.recv().await.unwrap());
        }
        frames
    }

    #[tokio::test]
    async fn sends_name_data_done_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.bin");
        let data: Vec<u8> = (0..1000u32).map(|i| (i % 251) as u8).collect();
        std::fs::File::create(&path)
            .unwrap()
            .write_all(&data)
            .unwrap();

        let (mut tx, mut rx) = frame_pair();
        let report = send_file(&mut tx, &approved(256), &path, false)
            .await
            .unwrap();
        assert_eq!(report.bytes, 1000);
        assert_eq!(report.chunks, 4);

        let frames = collect_frames(&mut rx, 6).await;
        assert!(frames[0].is(FrameType::FileName));
        assert_eq!(&frames[0].payload[..], b"payload.bin");

        let mut received = Vec::new();
        for frame in &frames[1..5] {
            assert!(frame.is(FrameType::Data));
            assert!(frame.payload_len() <= 256);
            received.extend_from_slice(&frame.payload);
        }
        assert_eq!(received, data);

        assert!(frames[5].is(FrameType::Done));
        assert!(frames[5].payload.is_empty());
    }

    #[tokio::test]
    async fn empty_file_sends_no_data_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.bin");
        std::fs::File::create(&path).unwrap();

        let (mut tx, mut rx) = frame_pair();
        let report = send_file(&mut tx, &approved(1024), &path, false)
            .await
            .unwrap();
        assert_eq!(report.bytes, 0);
        assert_eq!(report.chunks, 0);

        let frames = collect_frames(&mut rx, 2).await;
        assert!(frames[0].is(FrameType::FileName));
        assert!(frames[1].is(FrameType::Done));
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.bin");

        let (mut tx, _rx) = frame_pair();
        let err = send_file(&mut tx, &approved(1024), &path, false)
            .await
            .unwrap_err();
        assert!(err.is_transport());
    }
}
