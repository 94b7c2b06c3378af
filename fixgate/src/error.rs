/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Startup errors.

use fixgate_engine::{EngineError, SettingsError};
use thiserror::Error;

/// Fatal errors raised while starting the initiator.
///
/// Shutdown never produces one of these: stop failures are logged and
/// dropped by the controller.
#[derive(Debug, Error)]
pub enum InitiatorError {
    /// The settings file is missing, unreadable or incomplete.
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),

    /// The engine could not be built or refused to start.
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err: InitiatorError = SettingsError::MissingKey("FileLogPath".to_string()).into();
        assert_eq!(
            err.to_string(),
            "settings error: missing required setting: FileLogPath"
        );
    }
}
