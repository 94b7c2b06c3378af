/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # fixgate
//!
//! A single-session FIX initiator.
//!
//! The crate ties the engine collaborator to three pieces of its own:
//! - [`controller::InitiatorController`]: start once, stop once, from any number
//!   of shutdown triggers
//! - [`app::FixApp`]: logs every session lifecycle callback and forwards
//!   application messages to the cracker
//! - [`cracker`]: classifies inbound messages by type and routes them to a
//!   [`cracker::MessageHandler`]
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use fixgate::{ControllerConfig, InitiatorController, ShutdownTrigger, SocketEngine};
//!
//! let controller = InitiatorController::new(ControllerConfig::from_env(), SocketEngine);
//! controller.start().await?;
//! controller.wait_for_shutdown().await;
//! controller.shutdown(ShutdownTrigger::Exit).await;
//! ```

pub mod app;
pub mod config;
pub mod controller;
pub mod cracker;
pub mod error;
pub mod logging;
pub mod shutdown;

#[cfg(test)]
pub(crate) mod testing;

pub use app::FixApp;
pub use config::ControllerConfig;
pub use controller::{ControllerState, EngineFactory, InitiatorController, SocketEngine};
pub use cracker::{Cracked, ExecutionReportLogger, InboundMessage, MessageHandler, crack};
pub use error::InitiatorError;
pub use shutdown::{ShutdownSignal, ShutdownTrigger};
