//! Request/response exchange over control transfers
//!
//! The device has no per-transaction addressing: the SET_REPORT write selects
//! what the following GET_REPORT read returns. The read is therefore issued
//! even when the write reported an error, since some firmware answers the
//! read regardless of how the write completed.
//!
//! ```text
//!   host                               device
//!    | -- SET_REPORT (request, idx) -->  |
//!    |        pacing delay               |
//!    | -- GET_REPORT (resp_idx) ------>  |
//!    | <------------- 90 bytes --------  |
//! ```

use razer_transport::{ControlSetup, UsbTransport};
use tracing::{debug, warn};
use zerocopy::{FromZeros, IntoBytes};

use crate::control::{send_control_message, Pacing};
use crate::error::ProtocolError;
use crate::protocol::control;
use crate::report::{transaction, Report, ARGUMENTS_LEN, REPORT_LEN};
use crate::scratch::ScratchBuffer;

/// Tag for replies dumped by [`Report::log_erroneous`]
const DRIVER_NAME: &str = env!("CARGO_PKG_NAME");

/// Send `request` and read back the device's reply
///
/// A zero transaction id on `request` is replaced with `0xFF` in place
/// before anything is sent.
///
/// # Errors
/// - [`ProtocolError::Allocation`] if the reply buffer cannot be reserved
/// - [`ProtocolError::Transport`] if the read transfer fails
/// - [`ProtocolError::ShortRead`] if the reply is not exactly one report;
///   the reply is carried in the error
/// - [`ProtocolError::MalformedResponse`] if the reply's `data_size`
///   exceeds the argument capacity; the carried reply has `data_size`
///   clamped to capacity
///
/// The caller must hold the device's lock for the whole call.
pub fn exchange<T: UsbTransport + ?Sized>(
    transport: &T,
    request_index: u16,
    request: &mut Report,
    response_index: u16,
    pacing: Pacing,
) -> Result<Report, ProtocolError> {
    if request.transaction_id == 0x00 {
        warn!(
            "Transaction id 0x00 is invalid, sending 0x{:02X} instead",
            transaction::FALLBACK
        );
        request.transaction_id = transaction::FALLBACK;
    }

    let mut scratch = ScratchBuffer::zeroed(REPORT_LEN)?;

    // Write phase. Its outcome does not gate the read.
    if let Err(e) = send_control_message(transport, request, request_index, pacing) {
        debug!(
            "Request 0x{:02X}/0x{:02X} write failed ({}), reading response anyway",
            request.command_class, request.command_id, e
        );
    }

    let setup = ControlSetup::get_report(control::REPORT_VALUE, response_index);
    let read = transport.control_transfer(setup, scratch.as_mut_slice(), control::TIMEOUT);

    let mut response = Report::new_zeroed();
    response.as_mut_bytes().copy_from_slice(scratch.as_slice());
    drop(scratch);

    let shape = match read {
        Ok(len) if len == REPORT_LEN => {
            debug!("GET_REPORT {}: {:?}", setup, response);
            Ok(())
        }
        Ok(len) => {
            warn!("Invalid USB response. USB Report length: {}", len);
            Err(len)
        }
        Err(e) => {
            warn!("GET_REPORT {} failed: {}", setup, e);
            return Err(ProtocolError::Transport(e));
        }
    };

    if response.data_size as usize > ARGUMENTS_LEN {
        let declared = response.data_size;
        warn!(
            "Field data_size {} in response is bigger than arguments",
            declared
        );
        response.data_size = ARGUMENTS_LEN as u8;
        response.log_erroneous(DRIVER_NAME, "Malformed response");
        return Err(ProtocolError::MalformedResponse {
            data_size: declared,
            response: Box::new(response),
        });
    }

    match shape {
        Ok(()) => Ok(response),
        Err(actual) => {
            response.log_erroneous(DRIVER_NAME, "Invalid report length");
            Err(ProtocolError::ShortRead {
                expected: REPORT_LEN,
                actual,
                response: Box::new(response),
            })
        }
    }
}
