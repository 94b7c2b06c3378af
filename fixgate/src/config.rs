/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Process-level configuration.
//!
//! Session parameters live in the settings file; this only says where that
//! file is and how the process reacts to signals.

use std::env;
use std::path::PathBuf;

/// Settings file read when nothing else is configured.
pub const DEFAULT_SETTINGS_PATH: &str = "initiator.cfg";

/// Environment variable overriding the settings file path.
pub const SETTINGS_PATH_ENV: &str = "FIXGATE_CONFIG";

/// Configuration of the [`crate::InitiatorController`].
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Path of the QuickFIX-style settings file.
    pub settings_path: PathBuf,
    /// Whether `start()` installs Ctrl+C and SIGTERM listeners.
    pub install_signal_handlers: bool,
}

impl ControllerConfig {
    /// Creates a configuration reading `settings_path`, with signal listeners enabled.
    #[must_use]
    pub fn new(settings_path: impl Into<PathBuf>) -> Self {
        Self {
            settings_path: settings_path.into(),
            install_signal_handlers: true,
        }
    }

    /// Reads the settings path from `FIXGATE_CONFIG`, defaulting to `initiator.cfg`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(
            env::var(SETTINGS_PATH_ENV)
                .ok()
                .filter(|path| !path.is_empty())
                .unwrap_or_else(|| DEFAULT_SETTINGS_PATH.to_string()),
        )
    }

    /// Enables or disables the signal listeners.
    #[must_use]
    pub const fn with_signal_handlers(mut self, install: bool) -> Self {
        self.install_signal_handlers = install;
        self
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SETTINGS_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ControllerConfig::default();
        assert_eq!(config.settings_path, PathBuf::from("initiator.cfg"));
        assert!(config.install_signal_handlers);
        assert!(!config.with_signal_handlers(false).install_signal_handlers);
    }
}
