//! # Synchronization Module
//!
//! Handoff primitives between radio-stack callbacks and application threads.
//!
//! This module handles:
//! - Single-slot, most-recent-wins mailboxes with a bounded wait
//! - The LTE connection availability gate

pub mod gate;
pub mod mailbox;

pub use gate::ConnectionGate;
pub use mailbox::Mailbox;
