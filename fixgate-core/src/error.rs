/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Error types for tag=value message handling.

use thiserror::Error;

/// Errors raised while decoding a tag=value frame into a [`crate::Message`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The frame ended before a complete field could be read.
    #[error("incomplete message, need more data")]
    Incomplete,

    /// The first field is not BeginString (tag 8).
    #[error("invalid begin string: expected 8=FIX.x.y")]
    InvalidBeginString,

    /// The second field is not BodyLength (tag 9).
    #[error("missing body length field (tag 9)")]
    MissingBodyLength,

    /// BodyLength is not a non-negative integer.
    #[error("malformed body length value: {0}")]
    MalformedBodyLength(String),

    /// BodyLength does not match the bytes in the frame.
    #[error("invalid body length: declared {declared}, actual {actual}")]
    InvalidBodyLength {
        /// Value carried in tag 9.
        declared: usize,
        /// Bytes actually found between BodyLength and CheckSum.
        actual: usize,
    },

    /// The third field is not MsgType (tag 35).
    #[error("missing msg type field (tag 35)")]
    MissingMsgType,

    /// A tag could not be parsed as a positive integer.
    #[error("invalid tag format: {0}")]
    InvalidTag(String),

    /// A field value is not valid UTF-8.
    #[error("invalid utf-8 in value of tag {tag}")]
    InvalidUtf8 {
        /// The offending tag.
        tag: u32,
    },

    /// The frame has no CheckSum (tag 10) trailer.
    #[error("missing checksum field (tag 10)")]
    MissingChecksum,

    /// CheckSum is present but malformed.
    #[error("invalid checksum format: {0}")]
    InvalidChecksum(String),

    /// Calculated and declared checksums differ.
    #[error("checksum mismatch: calculated {calculated}, declared {declared}")]
    ChecksumMismatch {
        /// Calculated checksum value.
        calculated: u8,
        /// Declared checksum value in message.
        declared: u8,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_mismatch_display() {
        let err = DecodeError::ChecksumMismatch {
            calculated: 12,
            declared: 200,
        };
        assert_eq!(
            err.to_string(),
            "checksum mismatch: calculated 12, declared 200"
        );
    }

    #[test]
    fn test_body_length_display() {
        let err = DecodeError::InvalidBodyLength {
            declared: 5,
            actual: 7,
        };
        assert_eq!(err.to_string(), "invalid body length: declared 5, actual 7");
    }
}
