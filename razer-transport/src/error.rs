//! Transport error types

use thiserror::Error;

/// Errors reported by the USB transfer layer
///
/// A transfer that completed with a byte count is never an error here, even
/// if the count is short. Length policy belongs to the protocol layer.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Transfer timed out")]
    Timeout,

    #[error("Device disconnected")]
    Disconnected,

    #[error("Endpoint stalled")]
    Stall,

    #[error("Transfer failed with status {0}")]
    Status(i32),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// Map a negative kernel-style status code to a transport error
    ///
    /// Accepts either sign, so `-ETIMEDOUT` and `ETIMEDOUT` both map to
    /// [`TransportError::Timeout`].
    pub fn from_errno(code: i32) -> Self {
        match code.checked_abs().unwrap_or(i32::MAX) {
            libc::ETIMEDOUT => TransportError::Timeout,
            libc::ENODEV | libc::ESHUTDOWN => TransportError::Disconnected,
            libc::EPIPE => TransportError::Stall,
            _ => TransportError::Status(code),
        }
    }

    /// Whether the device is gone and further transfers are pointless
    pub fn is_disconnect(&self) -> bool {
        matches!(self, TransportError::Disconnected)
    }
}
