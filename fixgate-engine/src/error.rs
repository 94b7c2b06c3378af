/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Error types for the engine.

use std::path::PathBuf;

use fixgate_core::DecodeError;
use thiserror::Error;

use crate::codec::CodecError;

/// Errors raised while loading or interpreting session settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("failed to read settings file {path}: {source}")]
    Io {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A line could not be parsed.
    #[error("settings line {line}: {reason}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// The file defines no `[SESSION]` section.
    #[error("no [SESSION] section defined")]
    MissingSession,

    /// A required key is absent.
    #[error("missing required setting: {0}")]
    MissingKey(String),

    /// A key holds a value of the wrong shape.
    #[error("invalid value for {key}: {value}")]
    InvalidValue {
        /// Setting name.
        key: String,
        /// Offending value.
        value: String,
    },
}

/// Errors raised by message stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing a store file failed.
    #[error("store i/o error at {path}: {source}")]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A store file holds unreadable content.
    #[error("corrupted store file {path}: {reason}")]
    Corrupted {
        /// File being read.
        path: PathBuf,
        /// What could not be parsed.
        reason: String,
    },
}

/// Errors raised while opening audit logs.
#[derive(Debug, Error)]
#[error("log i/o error at {path}: {source}")]
pub struct LogError {
    /// File being opened.
    pub path: PathBuf,
    /// Underlying I/O error.
    #[source]
    pub source: std::io::Error,
}

/// Top-level engine error.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Settings error.
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),

    /// Store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Log error.
    #[error("log error: {0}")]
    Log(#[from] LogError),

    /// Framing error on the connection.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Message decode error.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The initiator has been stopped.
    #[error("initiator is stopped")]
    Stopped,

    /// The connection task failed or did not finish in time.
    #[error("session task failed: {0}")]
    Task(String),
}
