//! GNSS activation and deactivation sequences.

use std::sync::Arc;
use tracing::{error, info};

use super::{FuncMode, Modem};
use crate::error::Result;
use crate::telemetry::GnssEventHandler;

/// Starts a single-fix GNSS session delivering to `handler`.
///
/// Sequence: init, GNSS on, fix interval 0, fix retry 0, handler
/// registration, start. A failure after init deinitializes the modem.
///
/// # Errors
///
/// Returns the `LoggerError::Modem` of the first failing step.
pub fn activate<M: Modem + ?Sized>(modem: &mut M, handler: Arc<dyn GnssEventHandler>) -> Result<()> {
    info!("Activating GNSS");

    if let Err(e) = modem.init() {
        error!("Failed to initialize modem library ({})", e);
        return Err(e);
    }

    if let Err(e) = configure(modem, handler) {
        if let Err(deinit_err) = modem.deinit() {
            error!("Failed to deinitialize modem library ({})", deinit_err);
        }
        return Err(e);
    }

    info!("GNSS activated");
    Ok(())
}

fn configure<M: Modem + ?Sized>(modem: &mut M, handler: Arc<dyn GnssEventHandler>) -> Result<()> {
    modem
        .set_func_mode(FuncMode::ActivateGnss)
        .inspect_err(|e| error!("Failed to activate GNSS ({})", e))?;

    // Single fix, no time limit
    modem
        .set_gnss_fix_interval(0)
        .inspect_err(|e| error!("Failed to set GNSS fix interval ({})", e))?;
    modem
        .set_gnss_fix_retry(0)
        .inspect_err(|e| error!("Failed to set GNSS fix retry ({})", e))?;

    modem
        .register_gnss_handler(handler)
        .inspect_err(|e| error!("Failed to register GNSS handler ({})", e))?;

    modem
        .start_gnss()
        .inspect_err(|e| error!("Failed to start GNSS ({})", e))?;

    Ok(())
}

/// Stops the receiver and shuts the modem down. Failures are logged only.
pub fn deactivate<M: Modem + ?Sized>(modem: &mut M) {
    if let Err(e) = modem.stop_gnss() {
        error!("Failed to stop GNSS ({})", e);
    }

    match modem.deinit() {
        Ok(()) => info!("GNSS deactivated"),
        Err(e) => error!("Failed to deinitialize modem library ({})", e),
    }
}
