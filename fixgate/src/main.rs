/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! fixgate initiator binary.
//!
//! Reads the settings file named by `FIXGATE_CONFIG` (default
//! `initiator.cfg`), connects to the configured counterparty and runs until
//! interrupted.

use fixgate::logging::init_logging;
use fixgate::{ControllerConfig, InitiatorController, ShutdownTrigger, SocketEngine};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = ControllerConfig::from_env();
    info!(settings = %config.settings_path.display(), "fixgate initiator");
    let controller = InitiatorController::new(config, SocketEngine);

    if let Err(err) = controller.start().await {
        error!(error = %err, "failed to start initiator");
        controller.shutdown(ShutdownTrigger::Exit).await;
        return Err(err.into());
    }

    let cause = controller.wait_for_shutdown().await;
    info!(cause = ?cause, "initiator shut down");

    controller.shutdown(ShutdownTrigger::Exit).await;
    Ok(())
}
