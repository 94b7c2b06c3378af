/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Message types and the owned FIX message.
//!
//! This module provides:
//! - [`MsgType`]: the message types the initiator distinguishes, plus a catch-all
//! - [`Field`]: one tag=value pair
//! - [`Message`]: an owned message split into header and body, with tag=value
//!   encoding and decoding

use crate::checksum;
use crate::error::DecodeError;
use crate::tags;
use bytes::{BufMut, BytesMut};
use memchr::memchr;
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

/// SOH (Start of Header) delimiter used in FIX messages.
pub const SOH: u8 = 0x01;

/// FIX message types.
///
/// Session-level types are listed individually because the engine reacts to
/// them. Application types the initiator does not know about are carried as
/// `Custom(String)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum MsgType {
    /// Heartbeat (0) - Session level.
    #[default]
    Heartbeat,
    /// Test Request (1) - Session level.
    TestRequest,
    /// Resend Request (2) - Session level.
    ResendRequest,
    /// Reject (3) - Session level.
    Reject,
    /// Sequence Reset (4) - Session level.
    SequenceReset,
    /// Logout (5) - Session level.
    Logout,
    /// Execution Report (8).
    ExecutionReport,
    /// Order Cancel Reject (9).
    OrderCancelReject,
    /// Logon (A) - Session level.
    Logon,
    /// News (B).
    News,
    /// New Order Single (D).
    NewOrderSingle,
    /// Order Cancel Request (F).
    OrderCancelRequest,
    /// Business Message Reject (j).
    BusinessMessageReject,
    /// Any other message type.
    Custom(String),
}

impl MsgType {
    /// Maps a tag 35 value to its message type.
    #[must_use]
    pub fn from_wire(value: &str) -> Self {
        match value {
            "0" => Self::Heartbeat,
            "1" => Self::TestRequest,
            "2" => Self::ResendRequest,
            "3" => Self::Reject,
            "4" => Self::SequenceReset,
            "5" => Self::Logout,
            "8" => Self::ExecutionReport,
            "9" => Self::OrderCancelReject,
            "A" => Self::Logon,
            "B" => Self::News,
            "D" => Self::NewOrderSingle,
            "F" => Self::OrderCancelRequest,
            "j" => Self::BusinessMessageReject,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Returns the tag 35 value of this message type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Heartbeat => "0",
            Self::TestRequest => "1",
            Self::ResendRequest => "2",
            Self::Reject => "3",
            Self::SequenceReset => "4",
            Self::Logout => "5",
            Self::ExecutionReport => "8",
            Self::OrderCancelReject => "9",
            Self::Logon => "A",
            Self::News => "B",
            Self::NewOrderSingle => "D",
            Self::OrderCancelRequest => "F",
            Self::BusinessMessageReject => "j",
            Self::Custom(s) => s.as_str(),
        }
    }

    /// Returns the message type name, `"Message"` for unrecognised types.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Heartbeat => "Heartbeat",
            Self::TestRequest => "TestRequest",
            Self::ResendRequest => "ResendRequest",
            Self::Reject => "Reject",
            Self::SequenceReset => "SequenceReset",
            Self::Logout => "Logout",
            Self::ExecutionReport => "ExecutionReport",
            Self::OrderCancelReject => "OrderCancelReject",
            Self::Logon => "Logon",
            Self::News => "News",
            Self::NewOrderSingle => "NewOrderSingle",
            Self::OrderCancelRequest => "OrderCancelRequest",
            Self::BusinessMessageReject => "BusinessMessageReject",
            Self::Custom(_) => "Message",
        }
    }

    /// Returns true if this is an administrative message.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(
            self,
            Self::Heartbeat
                | Self::TestRequest
                | Self::ResendRequest
                | Self::Reject
                | Self::SequenceReset
                | Self::Logout
                | Self::Logon
        )
    }

    /// Returns true if this is an application message.
    #[must_use]
    pub fn is_app(&self) -> bool {
        !self.is_admin()
    }
}

impl FromStr for MsgType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_wire(s))
    }
}

impl fmt::Display for MsgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single tag=value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// The field tag number.
    pub tag: u32,
    /// The field value, as received or as it will be sent.
    pub value: String,
}

impl Field {
    /// Creates a new field.
    #[must_use]
    pub fn new(tag: u32, value: impl Into<String>) -> Self {
        Self {
            tag,
            value: value.into(),
        }
    }
}

type Fields = SmallVec<[Field; 16]>;

/// Owned FIX message.
///
/// BeginString and MsgType are kept as dedicated members; BodyLength and
/// CheckSum are computed by [`Message::encode`] and verified by
/// [`Message::decode`]. Remaining fields are split into header and body and
/// keep their insertion order, so repeating groups survive a decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    begin_string: String,
    msg_type: MsgType,
    header: Fields,
    body: Fields,
}

impl Message {
    /// Creates an empty message.
    ///
    /// # Arguments
    /// * `begin_string` - The FIX version string (e.g., "FIX.4.4")
    /// * `msg_type` - The message type
    #[must_use]
    pub fn new(begin_string: impl Into<String>, msg_type: MsgType) -> Self {
        Self {
            begin_string: begin_string.into(),
            msg_type,
            header: SmallVec::new(),
            body: SmallVec::new(),
        }
    }

    /// Returns the BeginString value.
    #[inline]
    #[must_use]
    pub fn begin_string(&self) -> &str {
        &self.begin_string
    }

    /// Returns the message type.
    #[inline]
    #[must_use]
    pub fn msg_type(&self) -> &MsgType {
        &self.msg_type
    }

    /// Returns true if this is an administrative message.
    #[inline]
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.msg_type.is_admin()
    }

    /// Sets a field, replacing the first existing occurrence of `tag`.
    ///
    /// Header tags land in the header, everything else in the body.
    /// BeginString and MsgType update the dedicated members; BodyLength and
    /// CheckSum are ignored because they are computed on encode.
    pub fn set_field(&mut self, tag: u32, value: impl Into<String>) {
        let value = value.into();
        match tag {
            tags::BEGIN_STRING => self.begin_string = value,
            tags::MSG_TYPE => self.msg_type = MsgType::from_wire(&value),
            tags::BODY_LENGTH | tags::CHECK_SUM => {}
            _ => {
                let fields = self.section_mut(tag);
                match fields.iter_mut().find(|f| f.tag == tag) {
                    Some(field) => field.value = value,
                    None => fields.push(Field { tag, value }),
                }
            }
        }
    }

    /// Removes the first occurrence of `tag`, returning its value.
    pub fn remove_field(&mut self, tag: u32) -> Option<String> {
        let fields = self.section_mut(tag);
        let index = fields.iter().position(|f| f.tag == tag)?;
        Some(fields.remove(index).value)
    }

    /// Gets a field value as a string.
    ///
    /// # Arguments
    /// * `tag` - The field tag number
    ///
    /// # Returns
    /// The first value carried for `tag`, or `None` if absent.
    #[must_use]
    pub fn get_field_str(&self, tag: u32) -> Option<&str> {
        match tag {
            tags::BEGIN_STRING => Some(&self.begin_string),
            tags::MSG_TYPE => Some(self.msg_type.as_str()),
            _ => self
                .header
                .iter()
                .chain(self.body.iter())
                .find(|f| f.tag == tag)
                .map(|f| f.value.as_str()),
        }
    }

    /// Gets a field value parsed as `T`, or `None` if absent or unparsable.
    #[must_use]
    pub fn get_field_as<T: FromStr>(&self, tag: u32) -> Option<T> {
        self.get_field_str(tag).and_then(|v| v.parse().ok())
    }

    /// Returns true if the message carries `tag`.
    #[must_use]
    pub fn has_field(&self, tag: u32) -> bool {
        self.get_field_str(tag).is_some()
    }

    /// Returns MsgSeqNum (tag 34) when present and numeric.
    #[must_use]
    pub fn seq_num(&self) -> Option<u64> {
        self.get_field_as(tags::MSG_SEQ_NUM)
    }

    /// Returns an iterator over the header fields.
    pub fn header_fields(&self) -> impl Iterator<Item = &Field> {
        self.header.iter()
    }

    /// Returns an iterator over the body fields.
    pub fn body_fields(&self) -> impl Iterator<Item = &Field> {
        self.body.iter()
    }

    /// Encodes the message in tag=value format.
    ///
    /// Prepends BeginString and BodyLength, emits MsgType first in the body,
    /// then header and body fields, and appends CheckSum.
    #[must_use]
    pub fn encode(&self) -> BytesMut {
        let mut body = BytesMut::with_capacity(256);
        put_field(&mut body, tags::MSG_TYPE, self.msg_type.as_str().as_bytes());
        for field in self.header.iter().chain(self.body.iter()) {
            put_field(&mut body, field.tag, field.value.as_bytes());
        }

        let mut len_buf = itoa::Buffer::new();
        let body_len = len_buf.format(body.len());

        let mut out = BytesMut::with_capacity(body.len() + self.begin_string.len() + 24);
        put_field(&mut out, tags::BEGIN_STRING, self.begin_string.as_bytes());
        put_field(&mut out, tags::BODY_LENGTH, body_len.as_bytes());
        out.put_slice(&body);

        let sum = checksum::format(checksum::calculate(&out));
        put_field(&mut out, tags::CHECK_SUM, &sum);
        out
    }

    /// Decodes one complete frame, validating the checksum.
    ///
    /// # Errors
    /// Returns `DecodeError` if the frame is malformed.
    pub fn decode(input: &[u8]) -> Result<Self, DecodeError> {
        Self::decode_with(input, true)
    }

    /// Decodes one complete frame.
    ///
    /// BeginString, BodyLength and MsgType must be the first three fields and
    /// BodyLength must match the frame. The checksum is only compared when
    /// `validate_checksum` is set.
    ///
    /// # Errors
    /// Returns `DecodeError` if the frame is malformed.
    pub fn decode_with(input: &[u8], validate_checksum: bool) -> Result<Self, DecodeError> {
        let mut cursor = FieldCursor::new(input);

        let (tag, value) = cursor.next_field()?.ok_or(DecodeError::Incomplete)?;
        if tag != tags::BEGIN_STRING {
            return Err(DecodeError::InvalidBeginString);
        }
        let begin_string = utf8(tag, value)?;

        let (tag, value) = cursor
            .next_field()?
            .ok_or(DecodeError::MissingBodyLength)?;
        if tag != tags::BODY_LENGTH {
            return Err(DecodeError::MissingBodyLength);
        }
        let raw_len = utf8(tag, value)?;
        let declared: usize = raw_len
            .parse()
            .map_err(|_| DecodeError::MalformedBodyLength(raw_len.to_string()))?;

        let body_start = cursor.offset();
        let (tag, value) = cursor.next_field()?.ok_or(DecodeError::MissingMsgType)?;
        if tag != tags::MSG_TYPE {
            return Err(DecodeError::MissingMsgType);
        }
        let mut message = Self::new(begin_string, MsgType::from_wire(utf8(tag, value)?));

        loop {
            let field_start = cursor.offset();
            let Some((tag, value)) = cursor.next_field()? else {
                return Err(DecodeError::MissingChecksum);
            };

            if tag == tags::CHECK_SUM {
                let actual = field_start - body_start;
                if actual != declared {
                    return Err(DecodeError::InvalidBodyLength { declared, actual });
                }
                if validate_checksum {
                    let declared = checksum::parse(value).ok_or_else(|| {
                        DecodeError::InvalidChecksum(String::from_utf8_lossy(value).into_owned())
                    })?;
                    let calculated = checksum::calculate(&input[..field_start]);
                    if calculated != declared {
                        return Err(DecodeError::ChecksumMismatch {
                            calculated,
                            declared,
                        });
                    }
                }
                return Ok(message);
            }

            let field = Field::new(tag, utf8(tag, value)?);
            if tags::is_header(tag) {
                message.header.push(field);
            } else {
                message.body.push(field);
            }
        }
    }

    fn section_mut(&mut self, tag: u32) -> &mut Fields {
        if tags::is_header(tag) {
            &mut self.header
        } else {
            &mut self.body
        }
    }
}

/// Renders the encoded message with `|` in place of SOH.
impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&printable(&self.encode()))
    }
}

/// Renders a raw frame for logs, replacing SOH with `|`.
#[must_use]
pub fn printable(frame: &[u8]) -> String {
    String::from_utf8_lossy(frame).replace(char::from(SOH), "|")
}

fn put_field(buf: &mut BytesMut, tag: u32, value: &[u8]) {
    let mut tag_buf = itoa::Buffer::new();
    buf.put_slice(tag_buf.format(tag).as_bytes());
    buf.put_u8(b'=');
    buf.put_slice(value);
    buf.put_u8(SOH);
}

fn utf8(tag: u32, value: &[u8]) -> Result<&str, DecodeError> {
    std::str::from_utf8(value).map_err(|_| DecodeError::InvalidUtf8 { tag })
}

/// Walks `tag=value<SOH>` fields of a frame.
struct FieldCursor<'a> {
    input: &'a [u8],
    offset: usize,
}

impl<'a> FieldCursor<'a> {
    const fn new(input: &'a [u8]) -> Self {
        Self { input, offset: 0 }
    }

    const fn offset(&self) -> usize {
        self.offset
    }

    fn next_field(&mut self) -> Result<Option<(u32, &'a [u8])>, DecodeError> {
        if self.offset >= self.input.len() {
            return Ok(None);
        }
        let remaining = &self.input[self.offset..];

        let eq_pos = memchr(b'=', remaining).ok_or(DecodeError::Incomplete)?;
        let tag = parse_tag(&remaining[..eq_pos]).ok_or_else(|| {
            DecodeError::InvalidTag(String::from_utf8_lossy(&remaining[..eq_pos]).into_owned())
        })?;

        let value_start = eq_pos + 1;
        let soh_pos = memchr(SOH, &remaining[value_start..]).ok_or(DecodeError::Incomplete)?;
        let value = &remaining[value_start..value_start + soh_pos];

        self.offset += value_start + soh_pos + 1;
        Ok(Some((tag, value)))
    }
}

fn parse_tag(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() || bytes.len() > 10 {
        return None;
    }
    bytes.iter().try_fold(0u32, |acc, &b| {
        if b.is_ascii_digit() {
            acc.checked_mul(10)?.checked_add(u32::from(b - b'0'))
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn execution_report() -> Message {
        let mut msg = Message::new("FIX.4.4", MsgType::ExecutionReport);
        msg.set_field(tags::SENDER_COMP_ID, "BROKER");
        msg.set_field(tags::TARGET_COMP_ID, "CLIENT");
        msg.set_field(tags::MSG_SEQ_NUM, "7");
        msg.set_field(tags::CL_ORD_ID, "A1");
        msg.set_field(tags::EXEC_TYPE, "0");
        msg.set_field(tags::LAST_PX, "101.5");
        msg
    }

    #[test]
    fn test_msg_type_from_wire() {
        assert_eq!(MsgType::from_wire("8"), MsgType::ExecutionReport);
        assert_eq!(MsgType::from_wire("A"), MsgType::Logon);
        assert_eq!("5".parse::<MsgType>().unwrap(), MsgType::Logout);
        assert_eq!(MsgType::from_wire("XX"), MsgType::Custom("XX".to_string()));
        assert_eq!(MsgType::from_wire("XX").as_str(), "XX");
    }

    #[test]
    fn test_msg_type_names() {
        assert_eq!(MsgType::ExecutionReport.name(), "ExecutionReport");
        assert_eq!(MsgType::Custom("U1".to_string()).name(), "Message");
        assert!(MsgType::Logon.is_admin());
        assert!(MsgType::ExecutionReport.is_app());
    }

    #[test]
    fn test_set_field_splits_header_and_body() {
        let msg = execution_report();
        assert_eq!(msg.header_fields().count(), 3);
        assert_eq!(msg.body_fields().count(), 3);
        assert_eq!(msg.seq_num(), Some(7));
        assert_eq!(msg.get_field_str(tags::MSG_TYPE), Some("8"));
    }

    #[test]
    fn test_set_field_replaces() {
        let mut msg = execution_report();
        msg.set_field(tags::CL_ORD_ID, "B2");
        assert_eq!(msg.get_field_str(tags::CL_ORD_ID), Some("B2"));
        assert_eq!(msg.body_fields().filter(|f| f.tag == 11).count(), 1);
        assert_eq!(msg.remove_field(tags::CL_ORD_ID), Some("B2".to_string()));
        assert!(!msg.has_field(tags::CL_ORD_ID));
    }

    #[test]
    fn test_encode_layout() {
        let mut msg = Message::new("FIX.4.4", MsgType::Heartbeat);
        msg.set_field(tags::SENDER_COMP_ID, "S");
        let encoded = msg.encode();
        assert_eq!(&encoded[..], b"8=FIX.4.4\x019=10\x0135=0\x0149=S\x0110=205\x01");
    }

    #[test]
    fn test_decode_encoded_message() {
        let original = execution_report();
        let decoded = Message::decode(&original.encode()).unwrap();
        assert_eq!(decoded.msg_type(), &MsgType::ExecutionReport);
        assert_eq!(decoded.get_field_str(tags::CL_ORD_ID), Some("A1"));
        assert_eq!(decoded.get_field_str(tags::SENDER_COMP_ID), Some("BROKER"));
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_decode_checksum_mismatch() {
        let frame = b"8=FIX.4.4\x019=10\x0135=0\x0149=S\x0110=000\x01";
        assert!(matches!(
            Message::decode(frame),
            Err(DecodeError::ChecksumMismatch { declared: 0, .. })
        ));
        assert!(Message::decode_with(frame, false).is_ok());
    }

    #[test]
    fn test_decode_body_length_mismatch() {
        let frame = b"8=FIX.4.4\x019=12\x0135=0\x0149=S\x0110=205\x01";
        assert_eq!(
            Message::decode_with(frame, false),
            Err(DecodeError::InvalidBodyLength {
                declared: 12,
                actual: 10
            })
        );
    }

    #[test]
    fn test_decode_field_order() {
        assert_eq!(
            Message::decode(b"9=5\x018=FIX.4.4\x01"),
            Err(DecodeError::InvalidBeginString)
        );
        assert_eq!(
            Message::decode(b"8=FIX.4.4\x0135=0\x01"),
            Err(DecodeError::MissingBodyLength)
        );
        assert_eq!(
            Message::decode(b"8=FIX.4.4\x019=5\x0149=S\x01"),
            Err(DecodeError::MissingMsgType)
        );
        assert_eq!(
            Message::decode(b"8=FIX.4.4\x019=5\x0135=0\x01"),
            Err(DecodeError::MissingChecksum)
        );
    }

    #[test]
    fn test_decode_invalid_tag() {
        assert!(matches!(
            Message::decode(b"8=FIX.4.4\x019=5\x0135=0\x01x=1\x01"),
            Err(DecodeError::InvalidTag(_))
        ));
    }

    #[test]
    fn test_display_uses_pipes() {
        let mut msg = Message::new("FIX.4.4", MsgType::Heartbeat);
        msg.set_field(tags::SENDER_COMP_ID, "S");
        assert_eq!(msg.to_string(), "8=FIX.4.4|9=10|35=0|49=S|10=205|");
    }

    #[test]
    fn test_parse_tag() {
        assert_eq!(parse_tag(b"35"), Some(35));
        assert_eq!(parse_tag(b""), None);
        assert_eq!(parse_tag(b"3a"), None);
        assert_eq!(parse_tag(b"99999999999"), None);
    }
}
