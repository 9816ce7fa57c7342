//! Transfer capability for Razer-style report protocol peripherals
//!
//! The protocol layer never talks to the operating system directly. It is
//! handed something that implements [`UsbTransport`]:
//!
//! - a libusb/usbfs backend owned by the application
//! - a kernel-side shim
//! - [`mock::MockTransport`] in tests (`mock` feature)
//!
//! Implementations only move bytes. They report how many bytes moved and
//! leave length and content validation to the caller.

pub mod error;
pub mod types;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::TransportError;
pub use types::{request, request_type, ControlSetup, Direction};

use std::time::Duration;

/// The USB transfer capability injected into the protocol layer
///
/// Calls are blocking. The caller owns per-device serialization; an
/// implementation does not need to lock around a write/read pair.
pub trait UsbTransport: Send + Sync {
    /// Issue one control transfer on the default pipe
    ///
    /// For host-to-device transfers `data` holds the payload; for
    /// device-to-host transfers it receives the reply. `data.len()` is the
    /// wLength of the setup stage.
    ///
    /// # Returns
    /// Number of bytes actually transferred
    fn control_transfer(
        &self,
        setup: ControlSetup,
        data: &mut [u8],
        timeout: Duration,
    ) -> Result<usize, TransportError>;

    /// Issue one bulk transfer on `endpoint` (bit 7 selects IN)
    ///
    /// The transferred count is reported even when the transfer fails, since
    /// a timed-out bulk transfer may have moved part of the buffer.
    fn bulk_transfer(
        &self,
        endpoint: u8,
        data: &mut [u8],
        timeout: Duration,
    ) -> (usize, Result<(), TransportError>);
}

impl<T: UsbTransport + ?Sized> UsbTransport for &T {
    fn control_transfer(
        &self,
        setup: ControlSetup,
        data: &mut [u8],
        timeout: Duration,
    ) -> Result<usize, TransportError> {
        (**self).control_transfer(setup, data, timeout)
    }

    fn bulk_transfer(
        &self,
        endpoint: u8,
        data: &mut [u8],
        timeout: Duration,
    ) -> (usize, Result<(), TransportError>) {
        (**self).bulk_transfer(endpoint, data, timeout)
    }
}

impl<T: UsbTransport + ?Sized> UsbTransport for std::sync::Arc<T> {
    fn control_transfer(
        &self,
        setup: ControlSetup,
        data: &mut [u8],
        timeout: Duration,
    ) -> Result<usize, TransportError> {
        (**self).control_transfer(setup, data, timeout)
    }

    fn bulk_transfer(
        &self,
        endpoint: u8,
        data: &mut [u8],
        timeout: Duration,
    ) -> (usize, Result<(), TransportError>) {
        (**self).bulk_transfer(endpoint, data, timeout)
    }
}

/// Type alias for a shared transport
pub type BoxedTransport = std::sync::Arc<dyn UsbTransport>;
