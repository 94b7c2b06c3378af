/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Socket initiator.
//!
//! [`SocketInitiator`] owns one session and a background task that connects
//! to the counterparty, runs the session, and reconnects after
//! `ReconnectInterval` until stopped.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fixgate_core::{Message, SessionId};
use parking_lot::Mutex;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::application::Application;
use crate::config::SessionConfig;
use crate::error::EngineError;
use crate::factory::MessageFactory;
use crate::log::LogFactory;
use crate::session::Session;
use crate::settings::SessionSettings;
use crate::store::MessageStoreFactory;

/// Lifecycle of an engine that initiates sessions.
#[async_trait]
pub trait Initiator: Send + Sync {
    /// Creates the session and starts connecting in the background.
    ///
    /// # Errors
    /// Returns `EngineError` if the store or log cannot be opened.
    async fn start(&self) -> Result<(), EngineError>;

    /// Logs out, waits for the session task to finish, and stops reconnecting.
    ///
    /// # Errors
    /// Returns `EngineError` if the session task failed or overran the
    /// logout timeout.
    async fn stop(&self) -> Result<(), EngineError>;
}

/// Collaborators an initiator is built from.
#[derive(Clone)]
pub struct InitiatorParts {
    /// Callback target.
    pub application: Arc<dyn Application>,
    /// Store factory.
    pub store_factory: Arc<dyn MessageStoreFactory>,
    /// Parsed settings file.
    pub settings: SessionSettings,
    /// Audit log factory.
    pub log_factory: Arc<dyn LogFactory>,
    /// Message factory.
    pub message_factory: Arc<dyn MessageFactory>,
}

/// Initiator connecting over TCP.
pub struct SocketInitiator {
    config: Arc<SessionConfig>,
    application: Arc<dyn Application>,
    store_factory: Arc<dyn MessageStoreFactory>,
    log_factory: Arc<dyn LogFactory>,
    message_factory: Arc<dyn MessageFactory>,
    shutdown: CancellationToken,
    outbound_tx: mpsc::UnboundedSender<Message>,
    outbound_rx: Mutex<Option<mpsc::UnboundedReceiver<Message>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SocketInitiator {
    /// Creates an initiator for the first session in `parts.settings`.
    ///
    /// # Errors
    /// Returns [`EngineError::Settings`] if the session cannot be configured.
    pub fn new(parts: InitiatorParts) -> Result<Self, EngineError> {
        let config = SessionConfig::from_settings(&parts.settings)?;
        if parts.settings.session_count() > 1 {
            warn!(
                sessions = parts.settings.session_count(),
                "only the first [SESSION] is used"
            );
        }
        Ok(Self::with_config(
            config,
            parts.application,
            parts.store_factory,
            parts.log_factory,
            parts.message_factory,
        ))
    }

    /// Creates an initiator from an already typed configuration.
    #[must_use]
    pub fn with_config(
        config: SessionConfig,
        application: Arc<dyn Application>,
        store_factory: Arc<dyn MessageStoreFactory>,
        log_factory: Arc<dyn LogFactory>,
        message_factory: Arc<dyn MessageFactory>,
    ) -> Self {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        Self {
            config: Arc::new(config),
            application,
            store_factory,
            log_factory,
            message_factory,
            shutdown: CancellationToken::new(),
            outbound_tx,
            outbound_rx: Mutex::new(Some(outbound_rx)),
            task: Mutex::new(None),
        }
    }

    /// Identity of the managed session.
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.config.session_id
    }

    /// Returns true between `start()` and `stop()`.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.lock().is_some() && !self.shutdown.is_cancelled()
    }

    /// Queues an application message. It is sent once the session is logged on.
    ///
    /// # Errors
    /// Returns [`EngineError::Stopped`] after `stop()`.
    pub fn send(&self, message: Message) -> Result<(), EngineError> {
        if self.shutdown.is_cancelled() {
            return Err(EngineError::Stopped);
        }
        self.outbound_tx
            .send(message)
            .map_err(|_| EngineError::Stopped)
    }
}

#[async_trait]
impl Initiator for SocketInitiator {
    async fn start(&self) -> Result<(), EngineError> {
        if self.shutdown.is_cancelled() {
            return Err(EngineError::Stopped);
        }
        let Some(outbound) = self.outbound_rx.lock().take() else {
            debug!(session = %self.session_id(), "initiator already started");
            return Ok(());
        };

        let session_id = self.session_id().clone();
        let store = self.store_factory.create(&session_id)?;
        let log = self.log_factory.create(&session_id)?;
        self.application.on_create(&session_id).await;
        log.on_event("Created session");

        let session = Session::new(
            Arc::clone(&self.config),
            Arc::clone(&self.application),
            store,
            log,
            Arc::clone(&self.message_factory),
        );
        let handle = tokio::spawn(connection_loop(
            session,
            outbound,
            Arc::clone(&self.config),
            self.shutdown.clone(),
        ));
        *self.task.lock() = Some(handle);
        info!(session = %session_id, addr = %self.config.connect_addr(), "initiator started");
        Ok(())
    }

    async fn stop(&self) -> Result<(), EngineError> {
        self.shutdown.cancel();
        let Some(handle) = self.task.lock().take() else {
            return Ok(());
        };

        let abort = handle.abort_handle();
        let grace = self.config.logout_timeout.saturating_add(Duration::from_secs(1));
        match tokio::time::timeout(grace, handle).await {
            Ok(Ok(())) => {
                info!(session = %self.session_id(), "initiator stopped");
                Ok(())
            }
            Ok(Err(err)) => Err(EngineError::Task(err.to_string())),
            Err(_) => {
                abort.abort();
                Err(EngineError::Task(format!(
                    "session did not finish within {grace:?}"
                )))
            }
        }
    }
}

async fn connection_loop(
    mut session: Session,
    mut outbound: mpsc::UnboundedReceiver<Message>,
    config: Arc<SessionConfig>,
    shutdown: CancellationToken,
) {
    let addr = config.connect_addr();
    while !shutdown.is_cancelled() {
        session.log_event(&format!("Connecting to {addr}"));
        let connect = tokio::select! {
            () = shutdown.cancelled() => break,
            result = tokio::time::timeout(config.connect_timeout, TcpStream::connect(&addr)) => result,
        };

        match connect {
            Ok(Ok(stream)) => {
                if let Err(err) = stream.set_nodelay(true) {
                    debug!(error = %err, "failed to set TCP_NODELAY");
                }
                session.log_event(&format!("Connected to {addr}"));
                if let Err(err) = session.run(stream, &mut outbound, &shutdown).await {
                    warn!(session = %session.session_id(), error = %err, "session ended with error");
                }
            }
            Ok(Err(err)) => {
                warn!(session = %session.session_id(), %addr, error = %err, "connection failed");
                session.log_event(&format!("Connection to {addr} failed: {err}"));
            }
            Err(_) => {
                warn!(session = %session.session_id(), %addr, "connection attempt timed out");
                session.log_event(&format!("Connection to {addr} timed out"));
            }
        }

        tokio::select! {
            () = shutdown.cancelled() => break,
            () = tokio::time::sleep(config.reconnect_interval) => {}
        }
    }
    session.log_event("Session task finished");
}
