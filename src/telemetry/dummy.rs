//! # Dummy Frames
//!
//! A constant frame used to exercise the upload path without any radio
//! data behind it.

use serde::Serialize;

/// Fixed payload of four text fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DummyFrame {
    pub field1: &'static str,
    pub field2: &'static str,
    pub field3: &'static str,
    pub field4: &'static str,
}

const DUMMY_FRAME: DummyFrame = DummyFrame {
    field1: "First field of dummy data frame with 256 bytes",
    field2: "Second field of dummy data frame of length 256 bytes",
    field3: "Third field of dummy data frame containing 256 bytes",
    field4: "Fourth field of dummy data frame which contains 256 bytes",
};

impl DummyFrame {
    /// Returns a copy of the constant dummy frame.
    pub fn read() -> Self {
        DUMMY_FRAME
    }
}
