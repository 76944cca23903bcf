//! LTE activation and deactivation sequences.

use std::sync::Arc;
use tracing::{error, info};

use super::{FuncMode, Modem};
use crate::config::LteConfig;
use crate::error::Result;
use crate::telemetry::LteEventHandler;

/// Brings the LTE link up and routes its events to `handler`.
///
/// Sequence: init, power off, PSM request, eDRX request, handler
/// registration, LTE on. If any step after init fails the modem is
/// deinitialized again and the step's error is returned.
///
/// # Errors
///
/// Returns the `LoggerError::Modem` of the first failing step.
pub fn activate<M: Modem + ?Sized>(
    modem: &mut M,
    config: &LteConfig,
    handler: Arc<dyn LteEventHandler>,
) -> Result<()> {
    info!("Activating LTE");

    if let Err(e) = modem.init() {
        error!("Failed to initialize modem library ({})", e);
        return Err(e);
    }

    if let Err(e) = configure(modem, config, handler) {
        deactivate(modem);
        return Err(e);
    }

    info!("LTE activated");
    Ok(())
}

fn configure<M: Modem + ?Sized>(
    modem: &mut M,
    config: &LteConfig,
    handler: Arc<dyn LteEventHandler>,
) -> Result<()> {
    modem
        .set_func_mode(FuncMode::PowerOff)
        .inspect_err(|e| error!("Failed to power off modem ({})", e))?;

    modem
        .request_psm(config.use_psm)
        .inspect_err(|e| error!("Failed to set PSM request ({})", e))?;

    modem
        .request_edrx(config.use_edrx)
        .inspect_err(|e| error!("Failed to set eDRX request ({})", e))?;

    modem
        .register_lte_handler(handler)
        .inspect_err(|e| error!("Failed to register LTE handler ({})", e))?;

    modem
        .set_func_mode(FuncMode::ActivateLte)
        .inspect_err(|e| error!("Failed to activate LTE ({})", e))?;

    Ok(())
}

/// Shuts the modem down. Failures are logged only.
pub fn deactivate<M: Modem + ?Sized>(modem: &mut M) {
    match modem.deinit() {
        Ok(()) => info!("LTE deactivated"),
        Err(e) => error!("Failed to deinitialize modem library ({})", e),
    }
}
