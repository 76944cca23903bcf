//! # Application Loop
//!
//! Drives one logging cycle after another in the configured mode.
//!
//! | Mode | Cycle |
//! |------|-------|
//! | dummy | encode dummy frame, connect LTE, upload, disconnect |
//! | lte | connect LTE, upload every update until a data wait times out, disconnect |
//! | gnss | get one fix, stop GNSS, connect LTE, upload, disconnect |
//!
//! Blocking waits on the normalizers run on the blocking thread pool so the
//! runtime keeps serving the transport. Shutdown is observed while sleeping
//! and while a cycle runs; an interrupted cycle's modem session is shut down
//! before the loop returns.

use std::future::Future;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::{AppMode, Config};
use crate::error::Result;
use crate::modem::{self, Modem};
use crate::rest::Transport;
use crate::telemetry::encoder::encode;
use crate::telemetry::{
    DummyFrame, GnssEventHandler, GnssNormalizer, LteEventHandler, LteNormalizer,
};

/// Runs a blocking wait on the blocking thread pool.
async fn wait_blocking<F>(wait: F) -> Result<()>
where
    F: FnOnce() -> Result<()> + Send + 'static,
{
    tokio::task::spawn_blocking(wait)
        .await
        .map_err(std::io::Error::from)?
}

/// Modem session a cycle currently holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Session {
    Lte,
    Gnss,
}

/// Logging application over a modem and an upload transport.
pub struct App<M, T> {
    config: Config,
    modem: M,
    transport: T,
    lte: Arc<LteNormalizer>,
    gnss: Arc<GnssNormalizer>,
    session: Option<Session>,
}

impl<M: Modem, T: Transport> App<M, T> {
    pub fn new(config: Config, modem: M, transport: T) -> Self {
        Self {
            config,
            modem,
            transport,
            lte: Arc::new(LteNormalizer::new()),
            gnss: Arc::new(GnssNormalizer::new()),
            session: None,
        }
    }

    pub fn mode(&self) -> AppMode {
        self.config.app.mode
    }

    pub fn modem(&self) -> &M {
        &self.modem
    }

    pub fn lte(&self) -> &Arc<LteNormalizer> {
        &self.lte
    }

    pub fn gnss(&self) -> &Arc<GnssNormalizer> {
        &self.gnss
    }

    /// Sleep, run a cycle, repeat until `shutdown` resolves
    ///
    /// Shutdown interrupts both the sleep and a running cycle. An
    /// interrupted cycle has its modem session deactivated before this
    /// returns.
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!("Starting {:?} logging loop", self.config.app.mode);

        loop {
            let sleep_time = self.config.app.sleep_time();
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(sleep_time) => {}
            }

            let outcome = tokio::select! {
                biased;
                _ = &mut shutdown => None,
                result = self.run_cycle() => Some(result),
            };

            match outcome {
                Some(Ok(uploaded)) => info!("Cycle complete, {} frame(s) uploaded", uploaded),
                Some(Err(e)) => warn!("Cycle failed: {}", e),
                None => {
                    info!("Cycle interrupted by shutdown");
                    self.release();
                    break;
                }
            }
        }

        info!("Logging loop stopped");
    }

    /// Runs one cycle of the configured mode
    ///
    /// # Returns
    ///
    /// * `Result<usize>` - Number of frames uploaded
    ///
    /// # Errors
    ///
    /// Returns the first failure of the cycle. Whatever the cycle activated
    /// has been deactivated again by then.
    pub async fn run_cycle(&mut self) -> Result<usize> {
        match self.config.app.mode {
            AppMode::Dummy => self.dummy_cycle().await,
            AppMode::Lte => self.lte_cycle().await,
            AppMode::Gnss => self.gnss_cycle().await,
        }
    }

    async fn dummy_cycle(&mut self) -> Result<usize> {
        let frame = DummyFrame::read();
        let payload = encode(&frame, self.config.dummy.buf_size)?;

        self.connect_lte().await?;
        let result = self.transport.post(&self.config.dummy.upload_url, &payload).await;
        self.disconnect_lte();

        result.map(|()| 1)
    }

    async fn lte_cycle(&mut self) -> Result<usize> {
        self.connect_lte().await?;
        let result = self.upload_lte_updates().await;
        self.disconnect_lte();
        result
    }

    /// Uploads LTE frames until no update arrives within the data timeout
    ///
    /// A frame that fails to encode or upload is logged and skipped; later
    /// updates of the same session are still uploaded.
    async fn upload_lte_updates(&self) -> Result<usize> {
        let timeout = self.config.lte.data_timeout();
        let mut uploaded = 0;

        loop {
            let lte = Arc::clone(&self.lte);
            if let Err(e) = wait_blocking(move || lte.wait_data(timeout)).await {
                if e.is_timeout() {
                    info!("No LTE data updates within {:?}", timeout);
                    return Ok(uploaded);
                }
                return Err(e);
            }

            let frame = self.lte.read();
            let Ok(payload) = encode(&frame, self.config.lte.buf_size) else {
                continue;
            };

            match self.transport.post(&self.config.lte.upload_url, &payload).await {
                Ok(()) => uploaded += 1,
                Err(e) => warn!("Failed to upload LTE data ({})", e),
            }
        }
    }

    async fn gnss_cycle(&mut self) -> Result<usize> {
        let handler: Arc<dyn GnssEventHandler> = self.gnss.clone();
        modem::gnss::activate(&mut self.modem, handler)?;
        self.session = Some(Session::Gnss);

        let gnss = Arc::clone(&self.gnss);
        let timeout = self.config.gnss.data_timeout();
        let fix = wait_blocking(move || gnss.wait_data(timeout))
            .await
            .map(|()| self.gnss.read());

        self.stop_gnss();

        let frame = fix.inspect_err(|e| error!("Failed to get GNSS fix ({})", e))?;
        let payload = encode(&frame, self.config.gnss.buf_size)?;

        self.connect_lte().await?;
        let result = self.transport.post(&self.config.gnss.upload_url, &payload).await;
        self.disconnect_lte();

        result.map(|()| 1)
    }

    /// Activates LTE and waits for network registration
    async fn connect_lte(&mut self) -> Result<()> {
        let handler: Arc<dyn LteEventHandler> = self.lte.clone();
        modem::lte::activate(&mut self.modem, &self.config.lte, handler)?;
        self.session = Some(Session::Lte);

        let lte = Arc::clone(&self.lte);
        let timeout = self.config.lte.conn_timeout();
        if let Err(e) = wait_blocking(move || lte.wait_conn(timeout)).await {
            error!("Failed to connect to LTE network ({})", e);
            self.disconnect_lte();
            return Err(e);
        }

        info!("Connected to LTE network");
        Ok(())
    }

    /// Deactivates LTE. The gate is closed since a shut down modem sends no
    /// deregistration event.
    fn disconnect_lte(&mut self) {
        modem::lte::deactivate(&mut self.modem);
        self.lte.gate().close();
        self.session = None;
    }

    fn stop_gnss(&mut self) {
        modem::gnss::deactivate(&mut self.modem);
        self.session = None;
    }

    /// Deactivates the session an interrupted cycle left behind
    fn release(&mut self) {
        match self.session {
            Some(Session::Lte) => self.disconnect_lte(),
            Some(Session::Gnss) => self.stop_gnss(),
            None => {}
        }
    }
}
