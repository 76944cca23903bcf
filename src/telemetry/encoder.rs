//! # Frame Encoder
//!
//! Encodes telemetry frames as compact JSON for upload.
//!
//! The upload buffers on the device side have a fixed size, so every encode
//! call carries a capacity. A frame whose text plus terminator does not fit
//! is rejected instead of being truncated.

use serde::Serialize;
use tracing::{debug, error};

use crate::error::{LoggerError, Result};

/// Encode a frame into a JSON string bounded by `capacity` bytes
///
/// # Arguments
///
/// * `frame` - Frame snapshot to encode
/// * `capacity` - Output buffer size in bytes, including the terminator
///
/// # Returns
///
/// * `Result<String>` - Encoded JSON text
///
/// # Errors
///
/// Returns `LoggerError::Encode` if the encoded frame does not fit, or
/// `LoggerError::Json` if serialization fails.
///
/// # Examples
///
/// ```
/// use cellular_logger::telemetry::encoder::encode;
/// use cellular_logger::telemetry::frame::LteFrame;
///
/// let json = encode(&LteFrame::default(), 512)?;
/// assert!(json.starts_with("{\"mode\":{\"valid\":false,\"mode\":\"\"}"));
/// # Ok::<(), cellular_logger::error::LoggerError>(())
/// ```
pub fn encode<T: Serialize>(frame: &T, capacity: usize) -> Result<String> {
    let json = serde_json::to_string(frame).map_err(|e| {
        error!("Failed to encode data frame into JSON format ({})", e);
        LoggerError::Json(e)
    })?;

    // Room for the terminator the device-side buffer reserves
    if json.len() + 1 > capacity {
        error!(
            "Failed to encode data frame into JSON format ({} bytes exceed buffer of {})",
            json.len(),
            capacity
        );
        return Err(LoggerError::Encode {
            len: json.len(),
            capacity,
        });
    }

    debug!("Encoded data frame ({} bytes)", json.len());
    Ok(json)
}
