/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Message construction and parsing.

use fixgate_core::{DecodeError, Message, MsgType};

use crate::error::SettingsError;
use crate::settings::{self, SessionSettings};

/// Builds outbound messages and parses inbound frames.
pub trait MessageFactory: Send + Sync {
    /// Creates an empty message of the given type.
    fn create(&self, begin_string: &str, msg_type: MsgType) -> Message;

    /// Parses one complete frame.
    ///
    /// # Errors
    /// Returns [`DecodeError`] if the frame is malformed.
    fn parse(&self, frame: &[u8]) -> Result<Message, DecodeError>;
}

/// Factory producing plain [`Message`] values.
#[derive(Debug, Clone, Copy)]
pub struct DefaultMessageFactory {
    validate_checksum: bool,
}

impl DefaultMessageFactory {
    /// Creates a factory that validates checksums.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            validate_checksum: true,
        }
    }

    /// Sets whether inbound checksums are verified.
    #[must_use]
    pub const fn with_checksum_validation(mut self, validate: bool) -> Self {
        self.validate_checksum = validate;
        self
    }

    /// Creates a factory honouring the `ValidateChecksum` setting.
    ///
    /// # Errors
    /// Returns [`SettingsError::InvalidValue`] if the flag is not `Y` or `N`.
    pub fn from_settings(settings: &SessionSettings) -> Result<Self, SettingsError> {
        let validate = settings
            .get_bool(settings::VALIDATE_CHECKSUM)?
            .unwrap_or(true);
        Ok(Self::new().with_checksum_validation(validate))
    }
}

impl Default for DefaultMessageFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageFactory for DefaultMessageFactory {
    fn create(&self, begin_string: &str, msg_type: MsgType) -> Message {
        Message::new(begin_string, msg_type)
    }

    fn parse(&self, frame: &[u8]) -> Result<Message, DecodeError> {
        Message::decode_with(frame, self.validate_checksum)
    }
}
