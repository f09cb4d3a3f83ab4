//! Length-prefixed framing over any `AsyncRead`/`AsyncWrite` stream:
//! `u32` little-endian length followed by that many bytes of payload.
//! Used identically for request and response directions.

use crate::error::HlxError;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Default ceiling on a single frame's payload size. Rejects an oversized
/// length prefix before allocating a buffer for it.
pub const DEFAULT_MAX_FRAME_BYTES: u32 = 64 * 1024 * 1024;

/// Reads one length-prefixed frame. A peer that closes before the length
/// prefix or the full payload arrives yields `TransportClosed`; a length
/// prefix over `max_frame_bytes` is rejected as `LcParse` before the read
/// buffer is allocated.
pub async fn read_frame<R: AsyncRead + Unpin>(
    reader: &mut R,
    max_frame_bytes: u32,
) -> Result<Vec<u8>, HlxError> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => HlxError::TransportClosed,
        _ => HlxError::LcParse(e.to_string()),
    })?;
    let len = u32::from_le_bytes(len_buf);
    if len > max_frame_bytes {
        return Err(HlxError::LcParse(format!(
            "frame length {len} exceeds max {max_frame_bytes}"
        )));
    }

    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => HlxError::TransportClosed,
        _ => HlxError::LcParse(e.to_string()),
    })?;
    Ok(payload)
}

/// Writes one length-prefixed frame.
pub async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, payload: &[u8]) -> Result<(), HlxError> {
    let len = u32::try_from(payload.len())
        .map_err(|_| HlxError::LcParse("frame payload exceeds u32::MAX".into()))?;
    writer.write_all(&len.to_le_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[tokio::test]
    async fn round_trips_a_frame() {
        let mut buf = Vec::new();
        write_frame(&mut buf, b"hello batch").await.unwrap();

        let mut cursor = Cursor::new(buf);
        let payload = read_frame(&mut cursor, DEFAULT_MAX_FRAME_BYTES).await.unwrap();
        assert_eq!(payload, b"hello batch");
    }

    #[tokio::test]
    async fn rejects_oversized_length_prefix() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&100u32.to_le_bytes());
        let mut cursor = Cursor::new(buf);
        let result = read_frame(&mut cursor, 10).await;
        assert!(matches!(result, Err(HlxError::LcParse(_))));
    }

    #[tokio::test]
    async fn closed_mid_read_is_transport_closed() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&5u32.to_le_bytes());
        buf.extend_from_slice(b"ab"); // short of the declared 5 bytes
        let mut cursor = Cursor::new(buf);
        let result = read_frame(&mut cursor, DEFAULT_MAX_FRAME_BYTES).await;
        assert!(matches!(result, Err(HlxError::TransportClosed)));
    }

    #[tokio::test]
    async fn empty_frame_round_trips() {
        let mut buf = Vec::new();
        write_frame(&mut buf, b"").await.unwrap();
        let mut cursor = Cursor::new(buf);
        let payload = read_frame(&mut cursor, DEFAULT_MAX_FRAME_BYTES).await.unwrap();
        assert!(payload.is_empty());
    }
}
