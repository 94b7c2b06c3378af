/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Shutdown funnel.
//!
//! Every termination source (Ctrl+C, SIGTERM, an explicit exit request)
//! triggers the same [`ShutdownSignal`]. The first trigger is remembered and
//! wins; later ones are no-ops. A single task owned by the controller waits
//! on the signal and runs the stop path.

use std::fmt;
use std::sync::{Arc, OnceLock};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Where a shutdown request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShutdownTrigger {
    /// Interactive interrupt (Ctrl+C / SIGINT).
    Interrupt,
    /// Termination request (SIGTERM).
    Terminate,
    /// The process is exiting on its own.
    Exit,
}

impl fmt::Display for ShutdownTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Interrupt => "interrupt",
            Self::Terminate => "terminate",
            Self::Exit => "exit",
        })
    }
}

/// One-shot shutdown request shared by every trigger.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    token: CancellationToken,
    cause: Arc<OnceLock<ShutdownTrigger>>,
}

impl ShutdownSignal {
    /// Creates an untriggered signal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests shutdown. Returns true only for the first trigger.
    pub fn trigger(&self, cause: ShutdownTrigger) -> bool {
        let first = self.cause.set(cause).is_ok();
        self.token.cancel();
        first
    }

    /// Returns true once any trigger has fired.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// The trigger that fired first, if any.
    #[must_use]
    pub fn cause(&self) -> Option<ShutdownTrigger> {
        self.cause.get().copied()
    }

    /// Waits for the first trigger and returns it.
    pub async fn triggered(&self) -> ShutdownTrigger {
        self.token.cancelled().await;
        self.cause().unwrap_or(ShutdownTrigger::Exit)
    }
}

/// Spawns one listener per OS termination source.
///
/// Each listener triggers `signal` when its source fires and exits quietly
/// once the signal has been triggered by anything else.
pub fn spawn_signal_listeners(signal: &ShutdownSignal) -> Vec<JoinHandle<()>> {
    let mut listeners = Vec::with_capacity(2);

    let interrupt = signal.clone();
    listeners.push(tokio::spawn(async move {
        tokio::select! {
            () = interrupt.token.cancelled() => {}
            result = tokio::signal::ctrl_c() => match result {
                Ok(()) => {
                    info!("interrupt received, shutting down");
                    interrupt.trigger(ShutdownTrigger::Interrupt);
                }
                Err(err) => warn!(error = %err, "cannot listen for interrupt"),
            },
        }
    }));

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal as unix_signal};

        let terminate = signal.clone();
        listeners.push(tokio::spawn(async move {
            let mut stream = match unix_signal(SignalKind::terminate()) {
                Ok(stream) => stream,
                Err(err) => {
                    warn!(error = %err, "cannot listen for SIGTERM");
                    return;
                }
            };
            tokio::select! {
                () = terminate.token.cancelled() => {}
                Some(()) = stream.recv() => {
                    info!("SIGTERM received, shutting down");
                    terminate.trigger(ShutdownTrigger::Terminate);
                }
            }
        }));
    }

    listeners
}
