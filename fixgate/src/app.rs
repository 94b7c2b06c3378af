/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Session lifecycle handler.
//!
//! [`FixApp`] is the [`Application`] the engine drives. Every callback is
//! observational: it logs what happened and, for application messages, hands
//! the message to the cracker.

use async_trait::async_trait;
use fixgate_core::{Message, SessionId};
use fixgate_engine::Application;
use tracing::{info, trace};

use crate::cracker::{ExecutionReportLogger, MessageHandler, crack};

/// Logs session events and cracks inbound application messages.
#[derive(Debug, Default, Clone)]
pub struct FixApp<H = ExecutionReportLogger> {
    handler: H,
}

impl FixApp {
    /// Creates the application with the execution report logger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<H: MessageHandler> FixApp<H> {
    /// Creates the application with a custom handler.
    #[must_use]
    pub fn with_handler(handler: H) -> Self {
        Self { handler }
    }

    /// The handler receiving cracked messages.
    #[must_use]
    pub fn handler(&self) -> &H {
        &self.handler
    }
}

#[async_trait]
impl<H: MessageHandler> Application for FixApp<H> {
    async fn on_create(&self, session_id: &SessionId) {
        info!("[OnCreate] {session_id}");
    }

    async fn on_logon(&self, session_id: &SessionId) {
        info!("[OnLogon] {session_id}");
    }

    async fn on_logout(&self, session_id: &SessionId) {
        info!("[OnLogout] {session_id}");
    }

    async fn to_admin(&self, message: &mut Message, session_id: &SessionId) {
        trace!(session = %session_id, "[ToAdmin] {message}");
    }

    async fn from_admin(&self, message: &Message, _session_id: &SessionId) {
        info!("[FromAdmin] {message}");
    }

    async fn to_app(&self, message: &mut Message, session_id: &SessionId) {
        trace!(session = %session_id, "[ToApp] {message}");
    }

    async fn from_app(&self, message: &Message, session_id: &SessionId) {
        info!("[FromApp] {} :: {message}", message.msg_type().name());
        crack(&self.handler, message, session_id);
    }
}
