/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Per-session audit logs.
//!
//! The engine reports every frame it sends or receives and every session
//! event (connects, logons, timeouts) to a [`Log`]. Write failures are
//! reported through `tracing` and never interrupt the session.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use fixgate_core::SessionId;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::error::{LogError, SettingsError};
use crate::settings::{self, SessionSettings};

/// Audit sink for one session.
pub trait Log: Send + Sync {
    /// Records an inbound frame, already rendered with `|` separators.
    fn on_incoming(&self, message: &str);

    /// Records an outbound frame, already rendered with `|` separators.
    fn on_outgoing(&self, message: &str);

    /// Records a session event.
    fn on_event(&self, text: &str);
}

/// Creates the log for a session.
pub trait LogFactory: Send + Sync {
    /// Opens the log for `session_id`.
    ///
    /// # Errors
    /// Returns [`LogError`] if the backing files cannot be opened.
    fn create(&self, session_id: &SessionId) -> Result<Arc<dyn Log>, LogError>;
}

/// Appends to `<session>.messages.log` and `<session>.event.log`.
#[derive(Debug)]
pub struct FileLog {
    messages: Mutex<File>,
    events: Mutex<File>,
    messages_path: PathBuf,
    events_path: PathBuf,
}

impl FileLog {
    /// Opens (appending) the log files for `session_id` under `dir`.
    ///
    /// # Errors
    /// Returns [`LogError`] if the directory or either file cannot be opened.
    pub fn open(dir: impl AsRef<Path>, session_id: &SessionId) -> Result<Self, LogError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|source| LogError {
            path: dir.to_path_buf(),
            source,
        })?;
        let stem = session_id.file_stem();
        let messages_path = dir.join(format!("{stem}.messages.log"));
        let events_path = dir.join(format!("{stem}.event.log"));
        Ok(Self {
            messages: Mutex::new(open_append(&messages_path)?),
            events: Mutex::new(open_append(&events_path)?),
            messages_path,
            events_path,
        })
    }

    // Blocking and unbuffered: one append-mode write per line, on disk when
    // the call returns. Unlike `FileStore`, nothing here is awaited.
    fn append(file: &Mutex<File>, path: &Path, text: &str) {
        let line = format!("{} : {}\n", Utc::now().format("%Y%m%d-%H:%M:%S%.3f"), text);
        if let Err(err) = file.lock().write_all(line.as_bytes()) {
            warn!(path = %path.display(), error = %err, "failed to write audit log");
        }
    }
}

impl Log for FileLog {
    fn on_incoming(&self, message: &str) {
        Self::append(&self.messages, &self.messages_path, message);
    }

    fn on_outgoing(&self, message: &str) {
        Self::append(&self.messages, &self.messages_path, message);
    }

    fn on_event(&self, text: &str) {
        Self::append(&self.events, &self.events_path, text);
    }
}

/// Opens a [`FileLog`] per session under a fixed directory.
#[derive(Debug, Clone)]
pub struct FileLogFactory {
    dir: PathBuf,
}

impl FileLogFactory {
    /// Creates a factory rooted at `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Creates a factory rooted at the `FileLogPath` setting.
    ///
    /// # Errors
    /// Returns [`SettingsError::MissingKey`] if `FileLogPath` is not set.
    pub fn from_settings(settings: &SessionSettings) -> Result<Self, SettingsError> {
        Ok(Self::new(settings.require(settings::FILE_LOG_PATH)?))
    }
}

impl LogFactory for FileLogFactory {
    fn create(&self, session_id: &SessionId) -> Result<Arc<dyn Log>, LogError> {
        Ok(Arc::new(FileLog::open(&self.dir, session_id)?))
    }
}

/// Sends the audit trail to `tracing`.
#[derive(Debug, Clone)]
pub struct ScreenLog {
    session: String,
}

impl Log for ScreenLog {
    fn on_incoming(&self, message: &str) {
        debug!(session = %self.session, "<- {message}");
    }

    fn on_outgoing(&self, message: &str) {
        debug!(session = %self.session, "-> {message}");
    }

    fn on_event(&self, text: &str) {
        info!(session = %self.session, "{text}");
    }
}

/// Creates a [`ScreenLog`] per session.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScreenLogFactory;

impl LogFactory for ScreenLogFactory {
    fn create(&self, session_id: &SessionId) -> Result<Arc<dyn Log>, LogError> {
        Ok(Arc::new(ScreenLog {
            session: session_id.to_string(),
        }))
    }
}

fn open_append(path: &Path) -> Result<File, LogError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LogError {
            path: path.to_path_buf(),
            source,
        })
}
