//! # Mailbox
//!
//! Single-slot, overwrite-on-signal handoff between an asynchronous producer
//! and a blocking consumer.
//!
//! A mailbox behaves like a queue of capacity one where a new value replaces
//! the pending one instead of waiting behind it. Producers call
//! [`Mailbox::signal`] from any context; the critical section only covers the
//! slot and flag update, so a producer is never held up by a consumer. A
//! consumer calls [`Mailbox::wait`] with a bound and then [`Mailbox::take`].
//!
//! ## Usage
//!
//! ```
//! use cellular_logger::sync::Mailbox;
//! use std::time::Duration;
//!
//! let mailbox = Mailbox::new(0u32);
//! mailbox.signal(7);
//! mailbox.signal(8); // overwrites, nothing is queued
//!
//! mailbox.wait(Duration::from_millis(10))?;
//! assert_eq!(mailbox.take(), 8);
//! assert!(!mailbox.is_available());
//! # Ok::<(), cellular_logger::error::LoggerError>(())
//! ```

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::error::{LoggerError, Result};

#[derive(Debug)]
struct Slot<T> {
    value: T,
    available: bool,
}

/// Single-slot synchronization object.
///
/// `available` is true exactly when the slot holds a value that has not been
/// retrieved by [`take`](Mailbox::take) yet.
#[derive(Debug)]
pub struct Mailbox<T> {
    slot: Mutex<Slot<T>>,
    signaled: Condvar,
}

impl<T: Default> Default for Mailbox<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Mailbox<T> {
    /// Creates an empty mailbox whose slot initially holds `initial`.
    pub fn new(initial: T) -> Self {
        Self {
            slot: Mutex::new(Slot {
                value: initial,
                available: false,
            }),
            signaled: Condvar::new(),
        }
    }

    // The slot is consistent after every statement, so a poisoned lock is safe to reuse.
    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores `value` and marks the mailbox available, waking any waiter.
    ///
    /// A pending value is overwritten. Returns `true` if the mailbox was not
    /// available before this call.
    pub fn signal(&self, value: T) -> bool {
        self.signal_with(|| value)
    }

    /// Like [`signal`](Mailbox::signal), but `produce` runs while the
    /// availability lock is held.
    ///
    /// Callers that guard their own content with a second lock take it inside
    /// `produce`, which fixes the order availability → content.
    pub fn signal_with<F>(&self, produce: F) -> bool
    where
        F: FnOnce() -> T,
    {
        let mut slot = self.lock();
        let was_available = slot.available;
        slot.value = produce();
        slot.available = true;
        drop(slot);

        self.signaled.notify_all();
        !was_available
    }

    /// Non-blocking snapshot of the availability flag.
    pub fn is_available(&self) -> bool {
        self.lock().available
    }

    /// Blocks until the mailbox is available or `timeout` elapses.
    ///
    /// Returns immediately when a value is already pending. On expiry the
    /// state is left untouched and [`LoggerError::Timeout`] is returned.
    pub fn wait(&self, timeout: Duration) -> Result<()> {
        let slot = self.lock();
        let (slot, _) = self
            .signaled
            .wait_timeout_while(slot, timeout, |slot| !slot.available)
            .unwrap_or_else(PoisonError::into_inner);

        if slot.available {
            Ok(())
        } else {
            Err(LoggerError::Timeout(timeout))
        }
    }

    /// Marks the mailbox unavailable without touching the slot.
    ///
    /// Returns `true` if a value was pending.
    pub fn clear(&self) -> bool {
        let mut slot = self.lock();
        std::mem::replace(&mut slot.available, false)
    }
}

impl<T: Clone> Mailbox<T> {
    /// Returns a copy of the slot and clears availability in the same
    /// critical section.
    ///
    /// Callers are expected to have seen the mailbox available. Without a
    /// pending signal this returns the last written (or initial) value.
    pub fn take(&self) -> T {
        let mut slot = self.lock();
        slot.available = false;
        slot.value.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_new_mailbox_is_empty() {
        let mailbox = Mailbox::new(5u8);
        assert!(!mailbox.is_available());
    }

    #[test]
    fn test_signal_then_wait_does_not_block() {
        let mailbox = Mailbox::new(0u32);
        assert!(mailbox.signal(42));

        let start = Instant::now();
        assert!(mailbox.wait(Duration::from_secs(5)).is_ok());
        assert!(start.elapsed() < Duration::from_secs(1));

        // Still available until taken
        assert!(mailbox.is_available());
        assert_eq!(mailbox.take(), 42);
        assert!(!mailbox.is_available());
    }

    #[test]
    fn test_signal_overwrites_pending_value() {
        let mailbox = Mailbox::new(0u32);
        assert!(mailbox.signal(1));
        assert!(!mailbox.signal(2), "second signal should find the mailbox available");
        assert!(!mailbox.signal(3));

        assert_eq!(mailbox.take(), 3);
        assert!(!mailbox.is_available());
    }

    #[test]
    fn test_wait_times_out_without_signal() {
        let mailbox = Mailbox::new(0u32);
        let timeout = Duration::from_millis(50);

        let start = Instant::now();
        let result = mailbox.wait(timeout);
        let elapsed = start.elapsed();

        match result {
            Err(LoggerError::Timeout(d)) => assert_eq!(d, timeout),
            other => panic!("Expected timeout, got: {:?}", other),
        }
        assert!(elapsed >= timeout, "returned early after {:?}", elapsed);
        assert!(!mailbox.is_available());
    }

    #[test]
    fn test_timeout_leaves_state_unchanged() {
        let mailbox = Mailbox::new(9u32);
        mailbox.signal(11);
        mailbox.take();

        assert!(mailbox.wait(Duration::from_millis(10)).is_err());
        assert!(!mailbox.is_available());
        // Slot still holds the last written value
        assert_eq!(mailbox.take(), 11);
    }

    #[test]
    fn test_take_without_signal_returns_initial_value() {
        let mailbox = Mailbox::new(String::from("initial"));
        assert_eq!(mailbox.take(), "initial");
        assert!(!mailbox.is_available());
    }

    #[test]
    fn test_take_without_new_signal_returns_stale_value() {
        let mailbox = Mailbox::new(0u32);
        mailbox.signal(5);
        assert_eq!(mailbox.take(), 5);
        assert_eq!(mailbox.take(), 5);
    }

    #[test]
    fn test_signal_wakes_blocked_waiter() {
        let mailbox = Arc::new(Mailbox::new(0u32));

        let producer = {
            let mailbox = Arc::clone(&mailbox);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                mailbox.signal(77);
            })
        };

        assert!(mailbox.wait(Duration::from_secs(5)).is_ok());
        assert_eq!(mailbox.take(), 77);
        producer.join().unwrap();
    }

    #[test]
    fn test_signal_with_runs_under_lock() {
        let mailbox = Mailbox::new(Vec::<u8>::new());
        let content = Mutex::new(vec![1u8, 2]);

        mailbox.signal_with(|| {
            let mut content = content.lock().unwrap();
            content.push(3);
            content.clone()
        });

        assert_eq!(mailbox.take(), vec![1, 2, 3]);
    }

    #[test]
    fn test_clear_keeps_slot() {
        let mailbox = Mailbox::new(0u32);
        mailbox.signal(4);
        assert!(mailbox.clear());
        assert!(!mailbox.clear());
        assert!(!mailbox.is_available());
        assert_eq!(mailbox.take(), 4);
    }

    #[test]
    fn test_concurrent_signals_keep_final_value() {
        let mailbox = Arc::new(Mailbox::new(0u32));

        let producer = {
            let mailbox = Arc::clone(&mailbox);
            thread::spawn(move || {
                for i in 1..=1000 {
                    mailbox.signal(i);
                }
            })
        };

        let mut last_seen = 0;
        while !producer.is_finished() {
            if mailbox.is_available() {
                let value = mailbox.take();
                assert!(value >= last_seen, "values must not go backwards");
                last_seen = value;
            }
        }
        producer.join().unwrap();

        // The last signal happened after every take we performed or was taken
        // itself; either way it is never lost.
        if mailbox.is_available() {
            assert_eq!(mailbox.take(), 1000);
        } else {
            assert_eq!(last_seen, 1000);
        }
    }
}
