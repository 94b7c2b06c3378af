/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Typed session configuration.
//!
//! [`SessionConfig`] is the validated form of a [`SessionSettings`] file and
//! is what the session task actually reads.

use std::time::Duration;

use fixgate_core::SessionId;

use crate::error::SettingsError;
use crate::settings::{self, SessionSettings};

/// Configuration for the initiator's session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Session identity.
    pub session_id: SessionId,
    /// Counterparty host.
    pub connect_host: String,
    /// Counterparty port.
    pub connect_port: u16,
    /// Heartbeat interval advertised in Logon (tag 108).
    pub heartbeat_interval: Duration,
    /// Delay between connection attempts.
    pub reconnect_interval: Duration,
    /// Bound on a single TCP connect.
    pub connect_timeout: Duration,
    /// How long to wait for the Logon reply.
    pub logon_timeout: Duration,
    /// How long to wait for the Logout reply.
    pub logout_timeout: Duration,
    /// Whether to reset sequence numbers on logon.
    pub reset_on_logon: bool,
    /// Maximum inbound frame size in bytes.
    pub max_message_size: usize,
    /// DefaultApplVerID (tag 1137) sent on Logon, for FIXT sessions.
    pub default_appl_ver_id: Option<String>,
}

impl SessionConfig {
    /// Creates a configuration with default timers.
    ///
    /// # Arguments
    /// * `session_id` - Session identity
    /// * `connect_host` - Counterparty host
    /// * `connect_port` - Counterparty port
    #[must_use]
    pub fn new(session_id: SessionId, connect_host: impl Into<String>, connect_port: u16) -> Self {
        Self {
            session_id,
            connect_host: connect_host.into(),
            connect_port,
            heartbeat_interval: Duration::from_secs(30),
            reconnect_interval: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(30),
            logon_timeout: Duration::from_secs(10),
            logout_timeout: Duration::from_secs(2),
            reset_on_logon: false,
            max_message_size: 1024 * 1024,
            default_appl_ver_id: None,
        }
    }

    /// Builds the configuration from the first session of a settings file.
    ///
    /// # Errors
    /// Returns a [`SettingsError`] when an identity or socket key is missing,
    /// or when a value is malformed.
    pub fn from_settings(settings: &SessionSettings) -> Result<Self, SettingsError> {
        let session_id = settings.session_id()?;
        let host = settings.require(settings::SOCKET_CONNECT_HOST)?;
        let port = settings
            .get_parsed::<u16>(settings::SOCKET_CONNECT_PORT)?
            .ok_or_else(|| SettingsError::MissingKey(settings::SOCKET_CONNECT_PORT.to_string()))?;

        let mut config = Self::new(session_id, host, port);
        // HeartBtInt=0 disables heartbeats.
        if let Some(secs) = settings.get_parsed::<u64>(settings::HEART_BT_INT)? {
            config.heartbeat_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = settings.get_parsed::<u64>(settings::RECONNECT_INTERVAL)? {
            config.reconnect_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = settings.get_parsed::<u64>(settings::CONNECT_TIMEOUT)? {
            config.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = settings.get_parsed::<u64>(settings::LOGON_TIMEOUT)? {
            config.logon_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = settings.get_parsed::<u64>(settings::LOGOUT_TIMEOUT)? {
            config.logout_timeout = Duration::from_secs(secs);
        }
        if let Some(reset) = settings.get_bool(settings::RESET_ON_LOGON)? {
            config.reset_on_logon = reset;
        }
        if let Some(size) = settings.get_parsed::<usize>(settings::MAX_MESSAGE_SIZE)? {
            config.max_message_size = size;
        }
        config.default_appl_ver_id = settings
            .get(settings::DEFAULT_APPL_VER_ID)
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        Ok(config)
    }

    /// Sets the heartbeat interval.
    #[must_use]
    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    /// Sets the logout timeout.
    #[must_use]
    pub fn with_logout_timeout(mut self, timeout: Duration) -> Self {
        self.logout_timeout = timeout;
        self
    }

    /// Sets whether to reset sequence numbers on logon.
    #[must_use]
    pub const fn with_reset_on_logon(mut self, reset: bool) -> Self {
        self.reset_on_logon = reset;
        self
    }

    /// Returns `host:port`.
    #[must_use]
    pub fn connect_addr(&self) -> String {
        format!("{}:{}", self.connect_host, self.connect_port)
    }
}
