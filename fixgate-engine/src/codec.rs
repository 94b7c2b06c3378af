/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Tokio codec that cuts a byte stream into whole FIX frames.
//!
//! Framing only looks at BeginString, BodyLength and the position of the
//! CheckSum trailer. Field parsing and checksum validation happen later in
//! the [`crate::MessageFactory`].

use bytes::{BufMut, BytesMut};
use fixgate_core::SOH;
use memchr::memchr;
use thiserror::Error;
use tokio_util::codec::{Decoder, Encoder};

/// Length of the `10=NNN<SOH>` trailer.
const TRAILER_LEN: usize = 7;

/// Errors that can occur while framing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The stream does not start with `8=`.
    #[error("invalid begin string: frame must start with 8=")]
    InvalidBeginString,

    /// The second field is not `9=`.
    #[error("missing body length field (tag 9)")]
    MissingBodyLength,

    /// BodyLength is not a number.
    #[error("invalid body length value: {0}")]
    InvalidBodyLength(String),

    /// The bytes where `10=NNN<SOH>` should be hold something else.
    #[error("missing checksum trailer at offset {0}")]
    MissingTrailer(usize),

    /// Frame exceeds the configured maximum.
    #[error("message too large: {size} bytes exceeds maximum {max_size}")]
    MessageTooLarge {
        /// Declared frame size.
        size: usize,
        /// Maximum allowed size.
        max_size: usize,
    },

    /// I/O error.
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// FIX framing codec.
#[derive(Debug, Clone)]
pub struct FixCodec {
    max_message_size: usize,
}

impl FixCodec {
    /// Creates a codec accepting frames up to 1 MiB.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_message_size: 1024 * 1024,
        }
    }

    /// Sets the maximum frame size.
    #[must_use]
    pub const fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    /// Computes the length of the frame at the start of `src`, or `None` if
    /// more bytes are needed to know it.
    fn frame_length(&self, src: &[u8]) -> Result<Option<usize>, CodecError> {
        if src.len() < 2 {
            return Ok(None);
        }
        if &src[..2] != b"8=" {
            return Err(CodecError::InvalidBeginString);
        }
        let Some(begin_end) = memchr(SOH, src) else {
            return Ok(None);
        };

        let length_start = begin_end + 1;
        if src.len() < length_start + 2 {
            return Ok(None);
        }
        if &src[length_start..length_start + 2] != b"9=" {
            return Err(CodecError::MissingBodyLength);
        }
        let Some(offset) = memchr(SOH, &src[length_start..]) else {
            return Ok(None);
        };
        let length_end = length_start + offset;

        let raw = &src[length_start + 2..length_end];
        let body_length: usize = std::str::from_utf8(raw)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| CodecError::InvalidBodyLength(String::from_utf8_lossy(raw).into()))?;

        let total = (length_end + 1 + TRAILER_LEN)
            .checked_add(body_length)
            .ok_or(CodecError::MessageTooLarge {
                size: usize::MAX,
                max_size: self.max_message_size,
            })?;
        if total > self.max_message_size {
            return Err(CodecError::MessageTooLarge {
                size: total,
                max_size: self.max_message_size,
            });
        }
        Ok(Some(total))
    }
}

impl Default for FixCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FixCodec {
    type Item = BytesMut;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(total) = self.frame_length(src)? else {
            return Ok(None);
        };
        if src.len() < total {
            src.reserve(total - src.len());
            return Ok(None);
        }

        let trailer = total - TRAILER_LEN;
        if &src[trailer..trailer + 3] != b"10=" || src[total - 1] != SOH {
            return Err(CodecError::MissingTrailer(trailer));
        }
        Ok(Some(src.split_to(total)))
    }
}

impl Encoder<BytesMut> for FixCodec {
    type Error = CodecError;

    fn encode(&mut self, item: BytesMut, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(item.len());
        dst.put_slice(&item);
        Ok(())
    }
}
