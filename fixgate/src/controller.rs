/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Initiator controller.
//!
//! The controller owns the single initiator of the process. It moves through
//! `Unstarted -> Running -> Stopped` exactly once:
//!
//! - [`InitiatorController::start`] builds the engine from the settings file
//!   and starts it; calling it again is a no-op.
//! - Every shutdown trigger funnels into one [`ShutdownSignal`]; one task
//!   awaits it and runs the stop path, which calls the engine's `stop()` at
//!   most once and swallows whatever it returns, panics included.

use std::fmt;
use std::sync::Arc;

use fixgate_engine::{
    DefaultMessageFactory, EngineError, FileLogFactory, FileStoreFactory, Initiator,
    InitiatorParts, SessionSettings, SocketInitiator,
};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::app::FixApp;
use crate::config::ControllerConfig;
use crate::error::InitiatorError;
use crate::shutdown::{self, ShutdownSignal, ShutdownTrigger};

/// Builds the engine the controller runs.
pub trait EngineFactory: Send + Sync + 'static {
    /// Creates an initiator bound to `parts`.
    ///
    /// # Errors
    /// Returns `EngineError` if the initiator cannot be configured.
    fn create(&self, parts: InitiatorParts) -> Result<Arc<dyn Initiator>, EngineError>;
}

/// Creates a [`SocketInitiator`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SocketEngine;

impl EngineFactory for SocketEngine {
    fn create(&self, parts: InitiatorParts) -> Result<Arc<dyn Initiator>, EngineError> {
        Ok(Arc::new(SocketInitiator::new(parts)?))
    }
}

/// Observable controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// `start()` has not succeeded yet.
    Unstarted,
    /// The engine has been started.
    Running,
    /// The stop path has run. Terminal.
    Stopped,
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unstarted => "unstarted",
            Self::Running => "running",
            Self::Stopped => "stopped",
        })
    }
}

enum Slot {
    Unstarted,
    Running(Arc<dyn Initiator>),
    Stopped,
}

impl Slot {
    const fn state(&self) -> ControllerState {
        match self {
            Self::Unstarted => ControllerState::Unstarted,
            Self::Running(_) => ControllerState::Running,
            Self::Stopped => ControllerState::Stopped,
        }
    }
}

/// Owns the process's single initiator.
pub struct InitiatorController<F: EngineFactory = SocketEngine> {
    config: ControllerConfig,
    engine: F,
    slot: Mutex<Slot>,
    shutdown: ShutdownSignal,
    stopped: CancellationToken,
}

impl<F: EngineFactory> InitiatorController<F> {
    /// Creates an unstarted controller.
    ///
    /// # Arguments
    /// * `config` - Settings path and signal handling
    /// * `engine` - Factory for the engine to run
    #[must_use]
    pub fn new(config: ControllerConfig, engine: F) -> Arc<Self> {
        Arc::new(Self {
            config,
            engine,
            slot: Mutex::new(Slot::Unstarted),
            shutdown: ShutdownSignal::new(),
            stopped: CancellationToken::new(),
        })
    }

    /// Loads the settings, builds the engine and starts it.
    ///
    /// Returns once the engine has been told to run. A second call while
    /// running, or any call after stop, returns `Ok(())` without doing
    /// anything. If the engine's own `start()` fails the controller stays
    /// `Running`, so a later shutdown still reaches the engine's `stop()`.
    ///
    /// # Errors
    /// Returns [`InitiatorError`] if the settings cannot be loaded, a
    /// collaborator cannot be built, or the engine fails to start.
    pub async fn start(self: &Arc<Self>) -> Result<(), InitiatorError> {
        let mut slot = self.slot.lock().await;
        match *slot {
            Slot::Unstarted => {}
            Slot::Running(_) => {
                debug!("initiator already running");
                return Ok(());
            }
            Slot::Stopped => {
                warn!("initiator already stopped, not restarting");
                return Ok(());
            }
        }

        let path = &self.config.settings_path;
        info!(settings = %path.display(), "starting initiator");
        let settings = SessionSettings::load(path)?;
        let parts = InitiatorParts {
            application: Arc::new(FixApp::new()),
            store_factory: Arc::new(FileStoreFactory::from_settings(&settings)?),
            log_factory: Arc::new(FileLogFactory::from_settings(&settings)?),
            message_factory: Arc::new(DefaultMessageFactory::from_settings(&settings)?),
            settings,
        };
        let initiator = self.engine.create(parts)?;

        if self.config.install_signal_handlers {
            let _listeners = shutdown::spawn_signal_listeners(&self.shutdown);
        }
        self.spawn_shutdown_task();

        *slot = Slot::Running(Arc::clone(&initiator));
        initiator.start().await?;
        Ok(())
    }

    /// Requests shutdown from `trigger` and waits for the stop path to finish.
    ///
    /// Returns immediately if the controller was never started.
    pub async fn shutdown(&self, trigger: ShutdownTrigger) {
        if self.shutdown.trigger(trigger) {
            info!(%trigger, "shutdown requested");
        }
        if self.state().await == ControllerState::Unstarted {
            return;
        }
        self.stopped.cancelled().await;
    }

    /// Waits until the stop path has finished and returns the first trigger.
    pub async fn wait_for_shutdown(&self) -> Option<ShutdownTrigger> {
        self.stopped.cancelled().await;
        self.shutdown.cause()
    }

    /// Current state.
    pub async fn state(&self) -> ControllerState {
        self.slot.lock().await.state()
    }

    /// Returns true while the engine is running.
    pub async fn is_running(&self) -> bool {
        self.state().await == ControllerState::Running
    }

    /// The signal every shutdown trigger fires.
    #[must_use]
    pub fn shutdown_signal(&self) -> &ShutdownSignal {
        &self.shutdown
    }

    fn spawn_shutdown_task(self: &Arc<Self>) {
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            let trigger = controller.shutdown.triggered().await;
            debug!(%trigger, "running stop path");
            controller.stop_internal().await;
        });
    }

    /// Stops the engine if it is running. Never fails and never panics.
    async fn stop_internal(&self) {
        let initiator = {
            let mut slot = self.slot.lock().await;
            match std::mem::replace(&mut *slot, Slot::Stopped) {
                Slot::Running(initiator) => initiator,
                other => {
                    *slot = other;
                    return;
                }
            }
        };

        match tokio::spawn(async move { initiator.stop().await }).await {
            Ok(Ok(())) => info!("initiator stopped"),
            Ok(Err(err)) => warn!(error = %err, "initiator stop failed, ignoring"),
            Err(err) => error!(error = %err, "initiator stop panicked, ignoring"),
        }
        self.stopped.cancel();
    }
}
