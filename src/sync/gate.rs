//! # Connection Gate
//!
//! Tracks whether the LTE network is usable. The payload of the underlying
//! mailbox is its own availability, so there is no separate take step:
//! consumers only check or wait.

use std::time::Duration;

use super::mailbox::Mailbox;
use crate::error::Result;

/// Network availability flag with a bounded wait.
#[derive(Debug)]
pub struct ConnectionGate {
    inner: Mailbox<bool>,
}

impl Default for ConnectionGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionGate {
    /// Creates a closed gate.
    pub fn new() -> Self {
        Self {
            inner: Mailbox::new(false),
        }
    }

    /// Marks the connection available and wakes waiters.
    ///
    /// Returns `true` if the gate was closed before.
    pub fn open(&self) -> bool {
        self.inner.signal(true)
    }

    /// Marks the connection unavailable.
    ///
    /// Returns `true` if the gate was open before.
    pub fn close(&self) -> bool {
        self.inner.clear()
    }

    /// Non-blocking snapshot.
    pub fn is_available(&self) -> bool {
        self.inner.is_available()
    }

    /// Blocks until the gate opens or `timeout` elapses.
    pub fn wait(&self, timeout: Duration) -> Result<()> {
        self.inner.wait(timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_gate_starts_closed() {
        let gate = ConnectionGate::new();
        assert!(!gate.is_available());
        assert!(gate.wait(Duration::from_millis(10)).unwrap_err().is_timeout());
    }

    #[test]
    fn test_open_is_idempotent() {
        let gate = ConnectionGate::new();
        assert!(gate.open(), "first open is a transition");
        assert!(!gate.open(), "second open is not");
        assert!(gate.is_available());
    }

    #[test]
    fn test_close_after_open() {
        let gate = ConnectionGate::new();
        gate.open();
        assert!(gate.close());
        assert!(!gate.close());
        assert!(!gate.is_available());
    }

    #[test]
    fn test_close_then_reopen() {
        let gate = ConnectionGate::new();
        gate.open();
        gate.close();
        assert!(gate.wait(Duration::from_millis(10)).unwrap_err().is_timeout());

        assert!(gate.open(), "reopening a closed gate is a transition");
        assert!(gate.wait(Duration::from_millis(10)).is_ok());
    }

    #[test]
    fn test_wait_does_not_consume_availability() {
        let gate = ConnectionGate::new();
        gate.open();
        assert!(gate.wait(Duration::from_millis(10)).is_ok());
        assert!(gate.wait(Duration::from_millis(10)).is_ok());
        assert!(gate.is_available());
    }

    #[test]
    fn test_open_from_other_thread_wakes_waiter() {
        let gate = Arc::new(ConnectionGate::new());
        let opener = {
            let gate = Arc::clone(&gate);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                gate.open();
            })
        };

        assert!(gate.wait(Duration::from_secs(5)).is_ok());
        opener.join().unwrap();
    }
}
