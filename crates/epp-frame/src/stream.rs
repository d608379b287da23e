use std::io::{ErrorKind, Read, Write};

use bytes::{Bytes, BytesMut};
use tracing::trace;

use crate::codec::{decode_header, encode_frame, FrameConfig, HEADER_SIZE};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Sends and receives complete EPP frames over one `Read + Write` stream.
///
/// Reads consume exactly one frame from the stream and never read ahead,
/// so the stream position always sits on a frame boundary between calls.
pub struct FramedStream<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Read + Write> FramedStream<T> {
    /// Create a framed stream with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a framed stream with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Read the next complete frame and return its payload (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached on a
    /// frame boundary and `Err(FrameError::Truncated)` when it is reached
    /// inside a frame.
    pub fn read_frame(&mut self) -> Result<Bytes> {
        let mut header = [0u8; HEADER_SIZE];
        let got = read_full(&mut self.inner, &mut header)?;
        if got == 0 {
            return Err(FrameError::ConnectionClosed);
        }
        if got < HEADER_SIZE {
            return Err(FrameError::Truncated {
                expected: HEADER_SIZE,
                received: got,
            });
        }

        let total = decode_header(header)?;
        if total > self.config.max_frame_size {
            return Err(FrameError::PayloadTooLarge {
                size: total,
                max: self.config.max_frame_size,
            });
        }

        let body_len = total - HEADER_SIZE;
        let mut body = vec![0u8; body_len];
        let got = read_full(&mut self.inner, &mut body)?;
        if got < body_len {
            return Err(FrameError::Truncated {
                expected: body_len,
                received: got,
            });
        }

        trace!(bytes = body_len, "frame received");
        Ok(Bytes::from(body))
    }

    /// Encode and send one payload as a frame, then flush.
    pub fn send(&mut self, payload: &[u8]) -> Result<()> {
        if payload.len() + HEADER_SIZE > self.config.max_frame_size {
            return Err(FrameError::PayloadTooLarge {
                size: payload.len() + HEADER_SIZE,
                max: self.config.max_frame_size,
            });
        }

        self.buf.clear();
        encode_frame(payload, &mut self.buf)?;

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        self.flush()?;
        trace!(bytes = payload.len(), "frame sent");
        Ok(())
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the framed stream and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update the maximum frame size for subsequent reads and writes.
    pub fn set_max_frame_size(&mut self, max_frame_size: usize) {
        self.config.max_frame_size = max_frame_size;
    }

    /// Current configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

/// Fill `buf` from `reader`, stopping early only at EOF.
///
/// Returns the number of bytes actually read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0usize;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
    Ok(filled)
}
