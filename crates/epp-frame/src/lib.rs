//! RFC 5734 message framing for EPP over TCP.
//!
//! Every EPP data unit travels as:
//! - A 4-byte big-endian total length, counting the header itself
//! - The UTF-8 XML payload
//!
//! EPP is strictly half-duplex, so reads consume exactly one frame and never
//! buffer ahead.

pub mod codec;
pub mod error;
pub mod stream;

pub use codec::{
    decode_frame, decode_header, encode, encode_frame, FrameConfig, DEFAULT_MAX_FRAME, HEADER_SIZE,
};
pub use error::{FrameError, Result};
pub use stream::FramedStream;
