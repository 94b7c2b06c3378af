/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Application callbacks.
//!
//! The engine invokes these from its connection task, one at a time and in
//! transport order, for the lifetime of a session.

use async_trait::async_trait;
use fixgate_core::{Message, SessionId};

/// Receives session lifecycle events and messages from the engine.
#[async_trait]
pub trait Application: Send + Sync {
    /// Called once when the session is created, before any connection attempt.
    async fn on_create(&self, session_id: &SessionId);

    /// Called when the counterparty acknowledges our Logon.
    async fn on_logon(&self, session_id: &SessionId);

    /// Called when a logged-on session ends, whatever the cause.
    async fn on_logout(&self, session_id: &SessionId);

    /// Called before an admin message is sent. The message may be modified.
    async fn to_admin(&self, message: &mut Message, session_id: &SessionId);

    /// Called when an admin message is received.
    #[allow(clippy::wrong_self_convention)]
    async fn from_admin(&self, message: &Message, session_id: &SessionId);

    /// Called before an application message is sent. The message may be modified.
    async fn to_app(&self, message: &mut Message, session_id: &SessionId);

    /// Called when an application message is received.
    #[allow(clippy::wrong_self_convention)]
    async fn from_app(&self, message: &Message, session_id: &SessionId);
}
