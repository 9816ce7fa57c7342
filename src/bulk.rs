//! Bulk endpoint traffic for the headset family
//!
//! These devices don't speak the report protocol. Framing is the caller's
//! business; this module only moves bytes over the two bulk endpoints.

use razer_transport::UsbTransport;
use tracing::{debug, warn};

use crate::error::ProtocolError;
use crate::protocol::bulk;
use crate::scratch::ScratchBuffer;

/// Send `data` to the bulk OUT endpoint
///
/// # Returns
/// Bytes transferred (also on failure) and the transfer status
pub fn bulk_send<T: UsbTransport + ?Sized>(
    transport: &T,
    data: &[u8],
) -> (usize, Result<(), ProtocolError>) {
    let mut scratch = match ScratchBuffer::duplicate(data) {
        Ok(scratch) => scratch,
        Err(e) => {
            warn!("Bulk OUT buffer allocation failed: {}", e);
            return (0, Err(e));
        }
    };

    let (transferred, status) =
        transport.bulk_transfer(bulk::OUT_ENDPOINT, scratch.as_mut_slice(), bulk::TIMEOUT);
    match status {
        Ok(()) => {
            debug!("Bulk OUT: {} of {} bytes", transferred, data.len());
            (transferred, Ok(()))
        }
        Err(e) => {
            warn!("Bulk OUT transfer failed: {}", e);
            (transferred, Err(ProtocolError::Transport(e)))
        }
    }
}

/// Read from the bulk IN endpoint into `buffer`
///
/// # Returns
/// Bytes received (also on failure) and the transfer status
pub fn bulk_receive<T: UsbTransport + ?Sized>(
    transport: &T,
    buffer: &mut [u8],
) -> (usize, Result<(), ProtocolError>) {
    let (transferred, status) = transport.bulk_transfer(bulk::IN_ENDPOINT, buffer, bulk::TIMEOUT);
    match status {
        Ok(()) => {
            debug!("Bulk IN: {} bytes", transferred);
            (transferred, Ok(()))
        }
        Err(e) => {
            warn!("Bulk IN transfer failed: {}", e);
            (transferred, Err(ProtocolError::Transport(e)))
        }
    }
}
