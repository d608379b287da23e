use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Frame header: total length (4 bytes, big-endian), header included.
pub const HEADER_SIZE: usize = 4;

/// Default maximum frame size (header + payload): 16 MiB.
pub const DEFAULT_MAX_FRAME: usize = 16 * 1024 * 1024;

/// Encode a payload into the RFC 5734 wire format.
///
/// Wire format:
/// ```text
/// ┌─────────────────────┬──────────────────────────┐
/// │ Total length (4B BE)│ XML payload              │
/// │ = payload + 4       │ (total length - 4 bytes) │
/// └─────────────────────┴──────────────────────────┘
/// ```
pub fn encode_frame(payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    let total = payload.len() + HEADER_SIZE;
    if total > u32::MAX as usize {
        return Err(FrameError::PayloadTooLarge {
            size: total,
            max: u32::MAX as usize,
        });
    }
    dst.reserve(total);
    dst.put_u32(total as u32);
    dst.put_slice(payload);
    Ok(())
}

/// Encode a payload into a standalone frame.
pub fn encode(payload: &[u8]) -> Result<Bytes> {
    let mut dst = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    encode_frame(payload, &mut dst)?;
    Ok(dst.freeze())
}

/// Parse a length header and return the total frame length it announces.
///
/// Fails with [`FrameError::MalformedFrame`] when the value cannot even
/// cover the header.
pub fn decode_header(header: [u8; HEADER_SIZE]) -> Result<usize> {
    let length = u32::from_be_bytes(header);
    if (length as usize) < HEADER_SIZE {
        return Err(FrameError::MalformedFrame { length });
    }
    Ok(length as usize)
}

/// Decode one frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer and returns the payload.
pub fn decode_frame(src: &mut BytesMut, max_frame: usize) -> Result<Option<Bytes>> {
    if src.len() < HEADER_SIZE {
        return Ok(None);
    }

    let mut header = [0u8; HEADER_SIZE];
    header.copy_from_slice(&src[..HEADER_SIZE]);
    let total = decode_header(header)?;

    if total > max_frame {
        return Err(FrameError::PayloadTooLarge {
            size: total,
            max: max_frame,
        });
    }

    if src.len() < total {
        return Ok(None);
    }

    src.advance(HEADER_SIZE);
    Ok(Some(src.split_to(total - HEADER_SIZE).freeze()))
}

/// Configuration for the frame codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum frame size in bytes, header included. Default: 16 MiB.
    pub max_frame_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME,
        }
    }
}
