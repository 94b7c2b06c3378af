/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Session settings file.
//!
//! Reads the QuickFIX-style INI layout:
//!
//! ```text
//! [DEFAULT]
//! FileStorePath=store
//! HeartBtInt=30
//!
//! [SESSION]
//! BeginString=FIX.4.4
//! SenderCompID=CLIENT
//! TargetCompID=BROKER
//! SocketConnectHost=127.0.0.1
//! SocketConnectPort=9876
//! ```
//!
//! Values in `[DEFAULT]` apply to every session unless the session overrides
//! them. Lines starting with `#` or `;` are comments.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use fixgate_core::SessionId;

use crate::error::SettingsError;

/// BeginString key.
pub const BEGIN_STRING: &str = "BeginString";
/// SenderCompID key.
pub const SENDER_COMP_ID: &str = "SenderCompID";
/// TargetCompID key.
pub const TARGET_COMP_ID: &str = "TargetCompID";
/// SessionQualifier key.
pub const SESSION_QUALIFIER: &str = "SessionQualifier";
/// SocketConnectHost key.
pub const SOCKET_CONNECT_HOST: &str = "SocketConnectHost";
/// SocketConnectPort key.
pub const SOCKET_CONNECT_PORT: &str = "SocketConnectPort";
/// HeartBtInt key, in seconds.
pub const HEART_BT_INT: &str = "HeartBtInt";
/// ReconnectInterval key, in seconds.
pub const RECONNECT_INTERVAL: &str = "ReconnectInterval";
/// ConnectTimeout key, in seconds.
pub const CONNECT_TIMEOUT: &str = "ConnectTimeout";
/// LogonTimeout key, in seconds.
pub const LOGON_TIMEOUT: &str = "LogonTimeout";
/// LogoutTimeout key, in seconds.
pub const LOGOUT_TIMEOUT: &str = "LogoutTimeout";
/// ResetOnLogon key (Y/N).
pub const RESET_ON_LOGON: &str = "ResetOnLogon";
/// ValidateChecksum key (Y/N).
pub const VALIDATE_CHECKSUM: &str = "ValidateChecksum";
/// MaxMessageSize key, in bytes.
pub const MAX_MESSAGE_SIZE: &str = "MaxMessageSize";
/// DefaultApplVerID key, sent on Logon for FIXT sessions.
pub const DEFAULT_APPL_VER_ID: &str = "DefaultApplVerID";
/// FileStorePath key.
pub const FILE_STORE_PATH: &str = "FileStorePath";
/// FileLogPath key.
pub const FILE_LOG_PATH: &str = "FileLogPath";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Default,
    Session,
}

/// Parsed settings file.
///
/// Only the first `[SESSION]` is served by the accessors; further sections
/// are parsed and counted but otherwise ignored.
#[derive(Debug, Clone, Default)]
pub struct SessionSettings {
    defaults: HashMap<String, String>,
    sessions: Vec<HashMap<String, String>>,
}

impl SessionSettings {
    /// Loads settings from a file.
    ///
    /// # Errors
    /// Returns [`SettingsError::Io`] if the file cannot be read, or any parse
    /// error from [`SessionSettings::parse`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parses settings text.
    ///
    /// # Errors
    /// Returns [`SettingsError::Parse`] for malformed lines and
    /// [`SettingsError::MissingSession`] when no session is defined.
    pub fn parse(text: &str) -> Result<Self, SettingsError> {
        let mut settings = Self::default();
        let mut section = None;

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                section = match name.trim().to_ascii_uppercase().as_str() {
                    "DEFAULT" => Some(Section::Default),
                    "SESSION" => {
                        settings.sessions.push(HashMap::new());
                        Some(Section::Session)
                    }
                    other => {
                        return Err(SettingsError::Parse {
                            line: index + 1,
                            reason: format!("unknown section [{other}]"),
                        });
                    }
                };
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(SettingsError::Parse {
                    line: index + 1,
                    reason: format!("expected Key=Value, got '{line}'"),
                });
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(SettingsError::Parse {
                    line: index + 1,
                    reason: "empty key".to_string(),
                });
            }

            let target = match section {
                Some(Section::Default) => &mut settings.defaults,
                Some(Section::Session) => match settings.sessions.last_mut() {
                    Some(map) => map,
                    None => &mut settings.defaults,
                },
                None => {
                    return Err(SettingsError::Parse {
                        line: index + 1,
                        reason: "setting outside of a section".to_string(),
                    });
                }
            };
            target.insert(key.to_string(), value.trim().to_string());
        }

        if settings.sessions.is_empty() {
            return Err(SettingsError::MissingSession);
        }
        Ok(settings)
    }

    /// Number of `[SESSION]` sections in the file.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Looks up a key in the first session, falling back to `[DEFAULT]`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.sessions
            .first()
            .and_then(|session| session.get(key))
            .or_else(|| self.defaults.get(key))
            .map(String::as_str)
    }

    /// Looks up a key that must be present and non-empty.
    ///
    /// # Errors
    /// Returns [`SettingsError::MissingKey`] otherwise.
    pub fn require(&self, key: &str) -> Result<&str, SettingsError> {
        self.get(key)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| SettingsError::MissingKey(key.to_string()))
    }

    /// Parses an optional value.
    ///
    /// # Errors
    /// Returns [`SettingsError::InvalidValue`] if present but unparseable.
    pub fn get_parsed<T: FromStr>(&self, key: &str) -> Result<Option<T>, SettingsError> {
        self.get(key)
            .map(|value| {
                value.parse().map_err(|_| SettingsError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                })
            })
            .transpose()
    }

    /// Parses an optional `Y`/`N` flag.
    ///
    /// # Errors
    /// Returns [`SettingsError::InvalidValue`] for anything else.
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, SettingsError> {
        match self.get(key) {
            None => Ok(None),
            Some("Y" | "y") => Ok(Some(true)),
            Some("N" | "n") => Ok(Some(false)),
            Some(other) => Err(SettingsError::InvalidValue {
                key: key.to_string(),
                value: other.to_string(),
            }),
        }
    }

    /// Builds the identity of the first session.
    ///
    /// # Errors
    /// Returns [`SettingsError::MissingKey`] if a CompID or the BeginString is absent.
    pub fn session_id(&self) -> Result<SessionId, SettingsError> {
        let id = SessionId::new(
            self.require(BEGIN_STRING)?,
            self.require(SENDER_COMP_ID)?,
            self.require(TARGET_COMP_ID)?,
        );
        Ok(match self.get(SESSION_QUALIFIER).filter(|q| !q.is_empty()) {
            Some(qualifier) => id.with_qualifier(qualifier),
            None => id,
        })
    }
}

impl FromStr for SessionSettings {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
# sample
[DEFAULT]
HeartBtInt=30
FileStorePath=store
ResetOnLogon=N

[SESSION]
BeginString=FIX.4.4
SenderCompID=CLIENT
TargetCompID=BROKER
SocketConnectHost = 127.0.0.1
SocketConnectPort=9876
ResetOnLogon=Y

[SESSION]
BeginString=FIX.4.2
SenderCompID=OTHER
TargetCompID=BROKER
";

    #[test]
    fn test_session_overrides_defaults() {
        let settings = SessionSettings::parse(SAMPLE).unwrap();
        assert_eq!(settings.session_count(), 2);
        assert_eq!(settings.get(HEART_BT_INT), Some("30"));
        assert_eq!(settings.get(SOCKET_CONNECT_HOST), Some("127.0.0.1"));
        assert_eq!(settings.get_bool(RESET_ON_LOGON).unwrap(), Some(true));
        assert_eq!(settings.get_parsed::<u16>(SOCKET_CONNECT_PORT).unwrap(), Some(9876));
        assert_eq!(settings.get("Missing"), None);
    }

    #[test]
    fn test_first_session_identity() {
        let settings = SessionSettings::parse(SAMPLE).unwrap();
        let id = settings.session_id().unwrap();
        assert_eq!(id.to_string(), "FIX.4.4:CLIENT->BROKER");
    }

    #[test]
    fn test_missing_session() {
        let err = SessionSettings::parse("[DEFAULT]\nHeartBtInt=30\n").unwrap_err();
        assert!(matches!(err, SettingsError::MissingSession));
    }

    #[test]
    fn test_malformed_lines() {
        let err = SessionSettings::parse("HeartBtInt=30\n[SESSION]\n").unwrap_err();
        assert!(matches!(err, SettingsError::Parse { line: 1, .. }));

        let err = SessionSettings::parse("[SESSION]\nnot a setting\n").unwrap_err();
        assert!(matches!(err, SettingsError::Parse { line: 2, .. }));

        let err = SessionSettings::parse("[ACCEPTOR]\n").unwrap_err();
        assert!(matches!(err, SettingsError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_invalid_values() {
        let settings =
            SessionSettings::parse("[SESSION]\nHeartBtInt=soon\nResetOnLogon=maybe\n").unwrap();
        assert!(settings.get_parsed::<u64>(HEART_BT_INT).is_err());
        assert!(settings.get_bool(RESET_ON_LOGON).is_err());
        assert!(matches!(
            settings.require(SENDER_COMP_ID),
            Err(SettingsError::MissingKey(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let settings = SessionSettings::load(file.path()).unwrap();
        assert_eq!(settings.get(TARGET_COMP_ID), Some("BROKER"));

        let err = SessionSettings::load("/nonexistent/initiator.cfg").unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
    }
}
