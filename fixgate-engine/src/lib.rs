/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # fixgate Engine
//!
//! Session engine used by the fixgate initiator.
//!
//! This crate provides:
//! - **Application callbacks**: the [`Application`] trait driven by the engine
//! - **Settings**: [`SessionSettings`] loaded from a QuickFIX-style file and
//!   the typed [`SessionConfig`]
//! - **Persistence**: [`MessageStore`] with memory and file backends
//! - **Audit logs**: [`Log`] with file and screen backends
//! - **Transport**: [`FixCodec`] framing and the [`SocketInitiator`]

pub mod application;
pub mod codec;
pub mod config;
pub mod error;
pub mod factory;
pub mod heartbeat;
pub mod initiator;
pub mod log;
mod session;
pub mod settings;
pub mod store;

pub use application::Application;
pub use codec::{CodecError, FixCodec};
pub use config::SessionConfig;
pub use error::{EngineError, LogError, SettingsError, StoreError};
pub use factory::{DefaultMessageFactory, MessageFactory};
pub use fixgate_core::SessionId;
pub use initiator::{Initiator, InitiatorParts, SocketInitiator};
pub use log::{FileLogFactory, Log, LogFactory, ScreenLogFactory};
pub use settings::SessionSettings;
pub use store::{
    FileStore, FileStoreFactory, MemoryStore, MemoryStoreFactory, MessageStore,
    MessageStoreFactory,
};
