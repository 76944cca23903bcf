//! # LTE Telemetry Normalizer
//!
//! Turns link-controller events into an [`LteFrame`] and availability
//! signals.
//!
//! ## Event Handling
//!
//! | Event | Frame section | Data mailbox | Connection gate |
//! |-------|---------------|--------------|-----------------|
//! | RRC update | - | - | - |
//! | Registration status | - | - | open / close |
//! | Mode update | `mode` | signaled | - |
//! | Cell update | `cell` | signaled | - |
//! | PSM update | `psm` | signaled | - |
//! | eDRX update | `edrx` | signaled | - |
//!
//! Rejected readings (negative cell ID, negative TAU, eDRX mode none, ...)
//! still signal the data mailbox: the consumer receives the section marked
//! invalid and zero-filled.
//!
//! ## Locking
//!
//! The data mailbox lock is always taken before the frame lock. Section
//! values are computed before either lock is taken and logging happens after
//! both are released.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{info, warn};

use super::frame::{CellSection, EdrxSection, LteFrame, ModeSection, NetworkMode, PsmSection};
use super::units::{split_active_time, split_edrx, split_ptw, split_tau};
use crate::error::Result;
use crate::sync::{ConnectionGate, Mailbox};

/// Radio Resource Control connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RrcMode {
    Connected,
    Idle,
}

/// Network registration status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStatus {
    NotRegistered,
    RegisteredHome,
    Searching,
    RegistrationDenied,
    Unknown,
    RegisteredRoaming,
    RegisteredEmergency,
    UiccFailure,
}

impl RegistrationStatus {
    /// Whether the status allows data traffic.
    pub fn is_connected(&self) -> bool {
        matches!(
            self,
            RegistrationStatus::RegisteredHome | RegistrationStatus::RegisteredRoaming
        )
    }
}

/// Serving cell as reported by the modem. Negative values mean unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellInfo {
    pub id: i32,
    pub tac: i32,
}

/// PSM parameters in seconds. Negative values mean rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PsmConfig {
    pub tau: i32,
    pub active_time: i32,
}

/// eDRX parameters in fractional seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdrxConfig {
    pub mode: NetworkMode,
    pub edrx: f32,
    pub ptw: f32,
}

/// Link-controller notifications.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LteEvent {
    RrcUpdate(RrcMode),
    Registration(RegistrationStatus),
    ModeUpdate(NetworkMode),
    CellUpdate(CellInfo),
    PsmUpdate(PsmConfig),
    EdrxUpdate(EdrxConfig),
}

/// Receiver of LTE events, registered with the modem.
///
/// Implementations are called from the modem's event context and must return
/// quickly without blocking.
pub trait LteEventHandler: Send + Sync {
    fn handle_lte_event(&self, event: &LteEvent);
}

/// Resident LTE frame plus its data mailbox and connection gate.
#[derive(Debug, Default)]
pub struct LteNormalizer {
    gate: ConnectionGate,
    data: Mailbox<LteFrame>,
    frame: Mutex<LteFrame>,
}

impl LteNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Network availability gate, driven by registration events.
    pub fn gate(&self) -> &ConnectionGate {
        &self.gate
    }

    /// Non-blocking check for a network connection.
    pub fn conn_available(&self) -> bool {
        self.gate.is_available()
    }

    /// Blocks until the network is available or `timeout` elapses.
    pub fn wait_conn(&self, timeout: Duration) -> Result<()> {
        if !self.gate.is_available() {
            info!("Waiting for LTE connection");
        }
        self.gate.wait(timeout)
    }

    /// Non-blocking check for unread LTE data.
    pub fn data_available(&self) -> bool {
        self.data.is_available()
    }

    /// Blocks until unread LTE data exists or `timeout` elapses.
    pub fn wait_data(&self, timeout: Duration) -> Result<()> {
        if !self.data.is_available() {
            info!("Waiting for LTE data updates");
        }
        self.data.wait(timeout)
    }

    /// Returns a copy of the frame and marks the data as read.
    pub fn read(&self) -> LteFrame {
        self.data.take()
    }

    /// Returns a copy of the resident frame without touching availability.
    pub fn frame(&self) -> LteFrame {
        *self.lock_frame()
    }

    fn lock_frame(&self) -> MutexGuard<'_, LteFrame> {
        self.frame.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // Availability lock first (inside signal_with), frame lock second.
    fn update<F>(&self, apply: F)
    where
        F: FnOnce(&mut LteFrame),
    {
        self.data.signal_with(|| {
            let mut frame = self.lock_frame();
            apply(&mut frame);
            *frame
        });
    }

    fn on_rrc(&self, mode: RrcMode) {
        match mode {
            RrcMode::Connected => info!("Entered RRC connected mode"),
            RrcMode::Idle => info!("Entered RRC idle mode"),
        }
    }

    fn on_registration(&self, status: RegistrationStatus) {
        if status.is_connected() {
            self.gate.open();
        } else {
            self.gate.close();
        }

        match status {
            RegistrationStatus::Searching => info!("Searching for LTE network"),
            RegistrationStatus::RegisteredHome => info!("Connected to LTE home network"),
            RegistrationStatus::RegisteredRoaming => info!("Connected to LTE roaming network"),
            RegistrationStatus::RegisteredEmergency => warn!("Connected to LTE emergency network"),
            RegistrationStatus::NotRegistered => warn!("Not connected to LTE network"),
            RegistrationStatus::Unknown => warn!("LTE network connection status unknown"),
            RegistrationStatus::RegistrationDenied => warn!("LTE network connection denied"),
            RegistrationStatus::UiccFailure => {
                warn!("LTE network connection failed due to UICC error")
            }
        }
    }

    fn on_mode(&self, mode: NetworkMode) {
        let section = mode_section(mode);
        self.update(|frame| frame.mode = section);

        match mode {
            NetworkMode::None => warn!("No active network mode"),
            _ => info!("Switched to {} network mode", mode),
        }
    }

    fn on_cell(&self, cell: CellInfo) {
        let section = cell_section(cell);
        self.update(|frame| frame.cell = section);

        if section.valid {
            info!("Cell parameters obtained: ID: {}, TAC: {}", section.id, section.tac);
        } else {
            warn!("Cell parameters unknown");
        }
    }

    fn on_psm(&self, psm: PsmConfig) {
        let section = psm_section(psm);
        self.update(|frame| frame.psm = section);

        if section.valid {
            let (tau, at) = (section.tau, section.at);
            info!(
                "PSM parameters granted: TAU: {}d:{}h:{}m:{}s, AT: {}h:{}m:{}s",
                tau.day, tau.hour, tau.min, tau.sec, at.hour, at.min, at.sec
            );
        } else {
            warn!("PSM parameters rejected");
        }
    }

    fn on_edrx(&self, edrx: EdrxConfig) {
        let section = edrx_section(edrx);
        self.update(|frame| frame.edrx = section);

        if section.valid {
            let (cycle, ptw) = (section.edrx, section.ptw);
            info!(
                "eDRX parameters granted: Mode: {}, eDRX: {}h:{}m:{}.{:03}s, PTW: {}.{:03}s",
                section.mode, cycle.hour, cycle.min, cycle.sec, cycle.msec, ptw.sec, ptw.msec
            );
        } else {
            warn!("eDRX parameters rejected");
        }
    }
}

impl LteEventHandler for LteNormalizer {
    fn handle_lte_event(&self, event: &LteEvent) {
        match *event {
            LteEvent::RrcUpdate(mode) => self.on_rrc(mode),
            LteEvent::Registration(status) => self.on_registration(status),
            LteEvent::ModeUpdate(mode) => self.on_mode(mode),
            LteEvent::CellUpdate(cell) => self.on_cell(cell),
            LteEvent::PsmUpdate(psm) => self.on_psm(psm),
            LteEvent::EdrxUpdate(edrx) => self.on_edrx(edrx),
        }
    }
}

/// Mode section for a reported network mode.
pub fn mode_section(mode: NetworkMode) -> ModeSection {
    ModeSection {
        valid: mode != NetworkMode::None,
        mode,
    }
}

/// Cell section; unknown (negative) parameters yield an invalid, zeroed
/// section.
pub fn cell_section(cell: CellInfo) -> CellSection {
    if cell.id < 0 || cell.tac < 0 {
        return CellSection::default();
    }

    CellSection {
        valid: true,
        id: cell.id,
        tac: cell.tac,
    }
}

/// PSM section; rejected (negative) parameters yield an invalid, zeroed
/// section.
pub fn psm_section(psm: PsmConfig) -> PsmSection {
    if psm.tau < 0 || psm.active_time < 0 {
        return PsmSection::default();
    }

    PsmSection {
        valid: true,
        tau: split_tau(psm.tau),
        at: split_active_time(psm.active_time),
    }
}

/// eDRX section; mode none yields an invalid, zeroed section.
pub fn edrx_section(edrx: EdrxConfig) -> EdrxSection {
    if edrx.mode == NetworkMode::None {
        return EdrxSection::default();
    }

    EdrxSection {
        valid: true,
        mode: edrx.mode,
        edrx: split_edrx(edrx.edrx),
        ptw: split_ptw(edrx.ptw),
    }
}
