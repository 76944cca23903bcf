//! # Simulated Modem
//!
//! A [`Modem`] that replays a scripted attach sequence and a single GNSS fix
//! from background threads, standing in for modem hardware on a host.
//!
//! ## LTE script
//!
//! Once LTE is switched on, one event per configured delay:
//!
//! 1. RRC connected
//! 2. Registration searching
//! 3. Registered home (or roaming)
//! 4. Network mode LTE-M
//! 5. Serving cell
//! 6. PSM parameters, granted only if PSM was requested
//! 7. eDRX parameters, granted only if eDRX was requested
//!
//! Deliveries run on their own threads and never wait for the consumer.

use chrono::{Datelike, Timelike, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::{FuncMode, Modem};
use crate::config::SimulatorConfig;
use crate::error::{LoggerError, Result};
use crate::telemetry::frame::NetworkMode;
use crate::telemetry::gnss::{PvtDateTime, PvtSolution};
use crate::telemetry::lte::{CellInfo, EdrxConfig, PsmConfig, RegistrationStatus, RrcMode};
use crate::telemetry::{GnssEvent, GnssEventHandler, LteEvent, LteEventHandler};

/// Cell reported by the script
const SIM_CELL: CellInfo = CellInfo { id: 0x0123_ABCD, tac: 0x1A2B };

/// PSM values granted by the simulated network
const SIM_PSM_GRANTED: PsmConfig = PsmConfig { tau: 3_240, active_time: 60 };

/// PSM values reported when PSM is not in use
const SIM_PSM_REJECTED: PsmConfig = PsmConfig { tau: -1, active_time: -1 };

/// eDRX values granted by the simulated network
const SIM_EDRX_GRANTED: EdrxConfig = EdrxConfig {
    mode: NetworkMode::LteM,
    edrx: 81.92,
    ptw: 2.56,
};

/// Granularity of cancellation checks while pausing
const CANCEL_POLL: Duration = Duration::from_millis(10);

/// Background delivery thread with its cancel flag
struct Worker {
    cancel: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl Worker {
    fn spawn<F>(name: &str, run: F) -> Result<Self>
    where
        F: FnOnce(Arc<AtomicBool>) + Send + 'static,
    {
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || run(flag))?;
        Ok(Self { cancel, handle })
    }

    fn stop(self) {
        self.cancel.store(true, Ordering::SeqCst);
        if self.handle.join().is_err() {
            warn!("Simulated event thread panicked");
        }
    }
}

/// Sleeps for `delay` unless cancelled first. Returns `false` on cancel.
fn pause(cancel: &AtomicBool, delay: Duration) -> bool {
    let deadline = Instant::now() + delay;
    loop {
        if cancel.load(Ordering::SeqCst) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep(CANCEL_POLL.min(deadline - now));
    }
}

/// Host-side modem replaying scripted events.
pub struct SimulatedModem {
    config: SimulatorConfig,
    initialized: bool,
    func_mode: FuncMode,
    psm_requested: bool,
    edrx_requested: bool,
    lte_handler: Option<Arc<dyn LteEventHandler>>,
    gnss_handler: Option<Arc<dyn GnssEventHandler>>,
    lte_worker: Option<Worker>,
    gnss_worker: Option<Worker>,
}

impl SimulatedModem {
    pub fn new(config: SimulatorConfig) -> Self {
        Self {
            config,
            initialized: false,
            func_mode: FuncMode::PowerOff,
            psm_requested: false,
            edrx_requested: false,
            lte_handler: None,
            gnss_handler: None,
            lte_worker: None,
            gnss_worker: None,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn func_mode(&self) -> FuncMode {
        self.func_mode
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(LoggerError::Modem("modem library not initialized".to_string()))
        }
    }

    fn stop_workers(&mut self) {
        if let Some(worker) = self.lte_worker.take() {
            worker.stop();
        }
        if let Some(worker) = self.gnss_worker.take() {
            worker.stop();
        }
    }

    fn lte_script(&self) -> Vec<LteEvent> {
        let registration = if self.config.roaming {
            RegistrationStatus::RegisteredRoaming
        } else {
            RegistrationStatus::RegisteredHome
        };

        let psm = if self.psm_requested { SIM_PSM_GRANTED } else { SIM_PSM_REJECTED };
        let edrx = if self.edrx_requested {
            SIM_EDRX_GRANTED
        } else {
            EdrxConfig { mode: NetworkMode::None, edrx: 0.0, ptw: 0.0 }
        };

        vec![
            LteEvent::RrcUpdate(RrcMode::Connected),
            LteEvent::Registration(RegistrationStatus::Searching),
            LteEvent::Registration(registration),
            LteEvent::ModeUpdate(NetworkMode::LteM),
            LteEvent::CellUpdate(SIM_CELL),
            LteEvent::PsmUpdate(psm),
            LteEvent::EdrxUpdate(edrx),
        ]
    }

    fn start_lte_script(&mut self) -> Result<()> {
        let Some(handler) = self.lte_handler.clone() else {
            debug!("LTE on without handler, no events delivered");
            return Ok(());
        };

        if let Some(worker) = self.lte_worker.take() {
            worker.stop();
        }

        let script = self.lte_script();
        let delay = self.config.event_delay();
        self.lte_worker = Some(Worker::spawn("sim-lte", move |cancel| {
            for event in script {
                if !pause(&cancel, delay) {
                    return;
                }
                handler.handle_lte_event(&event);
            }
        })?);
        Ok(())
    }

    fn current_fix(&self) -> PvtSolution {
        let now = Utc::now();
        PvtSolution {
            latitude: self.config.latitude,
            longitude: self.config.longitude,
            datetime: PvtDateTime {
                year: u16::try_from(now.year()).unwrap_or_default(),
                month: now.month() as u8,
                day: now.day() as u8,
                hour: now.hour() as u8,
                minute: now.minute() as u8,
                seconds: now.second() as u8,
                // Leap seconds report 1000+
                ms: now.timestamp_subsec_millis().min(999) as u16,
            },
            fix_valid: true,
        }
    }
}

impl Modem for SimulatedModem {
    fn init(&mut self) -> Result<()> {
        if self.initialized {
            return Err(LoggerError::Modem("modem library already initialized".to_string()));
        }
        self.initialized = true;
        debug!("Simulated modem initialized");
        Ok(())
    }

    fn deinit(&mut self) -> Result<()> {
        self.ensure_initialized()?;
        self.stop_workers();
        self.lte_handler = None;
        self.gnss_handler = None;
        self.func_mode = FuncMode::PowerOff;
        self.initialized = false;
        debug!("Simulated modem deinitialized");
        Ok(())
    }

    fn set_func_mode(&mut self, mode: FuncMode) -> Result<()> {
        self.ensure_initialized()?;
        if mode == self.func_mode {
            return Ok(());
        }

        self.func_mode = mode;
        match mode {
            FuncMode::ActivateLte => self.start_lte_script(),
            FuncMode::PowerOff | FuncMode::ActivateGnss => {
                if let Some(worker) = self.lte_worker.take() {
                    worker.stop();
                }
                Ok(())
            }
        }
    }

    fn request_psm(&mut self, enable: bool) -> Result<()> {
        self.ensure_initialized()?;
        self.psm_requested = enable;
        Ok(())
    }

    fn request_edrx(&mut self, enable: bool) -> Result<()> {
        self.ensure_initialized()?;
        self.edrx_requested = enable;
        Ok(())
    }

    fn register_lte_handler(&mut self, handler: Arc<dyn LteEventHandler>) -> Result<()> {
        self.ensure_initialized()?;
        self.lte_handler = Some(handler);
        Ok(())
    }

    fn set_gnss_fix_interval(&mut self, _seconds: u16) -> Result<()> {
        self.ensure_initialized()
    }

    fn set_gnss_fix_retry(&mut self, _seconds: u16) -> Result<()> {
        self.ensure_initialized()
    }

    fn register_gnss_handler(&mut self, handler: Arc<dyn GnssEventHandler>) -> Result<()> {
        self.ensure_initialized()?;
        self.gnss_handler = Some(handler);
        Ok(())
    }

    fn start_gnss(&mut self) -> Result<()> {
        self.ensure_initialized()?;
        if self.func_mode != FuncMode::ActivateGnss {
            return Err(LoggerError::Modem("GNSS not activated".to_string()));
        }
        let Some(handler) = self.gnss_handler.clone() else {
            return Err(LoggerError::Modem("no GNSS handler registered".to_string()));
        };

        if let Some(worker) = self.gnss_worker.take() {
            worker.stop();
        }

        let fix = self.current_fix();
        let delay = self.config.event_delay();
        self.gnss_worker = Some(Worker::spawn("sim-gnss", move |cancel| {
            if pause(&cancel, delay) {
                handler.handle_gnss_event(&GnssEvent::Pvt(Ok(fix)));
            }
        })?);
        Ok(())
    }

    fn stop_gnss(&mut self) -> Result<()> {
        self.ensure_initialized()?;
        if let Some(worker) = self.gnss_worker.take() {
            worker.stop();
        }
        Ok(())
    }
}

impl Drop for SimulatedModem {
    fn drop(&mut self) {
        self.stop_workers();
    }
}
