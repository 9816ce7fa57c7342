//! Per-device session
//!
//! Pairs a transport with its [`ProtocolConfig`] and serializes all traffic
//! to the device. A SET_REPORT selects what the next GET_REPORT returns, so
//! two exchanges must never interleave on one device.

use parking_lot::Mutex;
use razer_transport::UsbTransport;
use tracing::{debug, warn};

use crate::bulk;
use crate::checksum::apply_checksum;
use crate::config::ProtocolConfig;
use crate::control::{send_control_message, Pacing};
use crate::error::ProtocolError;
use crate::exchange;
use crate::lighting::{self, Rgb};
use crate::report::{Report, ARGUMENTS_LEN};

/// One device and the lock that owns its control pipe
pub struct DeviceSession<T: UsbTransport> {
    transport: T,
    config: ProtocolConfig,
    /// Held for the whole of each operation
    io_lock: Mutex<()>,
}

impl<T: UsbTransport> DeviceSession<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ProtocolConfig::default())
    }

    pub fn with_config(transport: T, config: ProtocolConfig) -> Self {
        Self {
            transport,
            config,
            io_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn pacing(&self) -> Pacing {
        self.config.pacing()
    }

    /// Build a checksummed request with the configured transaction id
    ///
    /// Returns `Err` if `args` doesn't fit in the argument array.
    pub fn build_request(
        &self,
        command_class: u8,
        command_id: u8,
        args: &[u8],
    ) -> Result<Report, ProtocolError> {
        if args.len() > ARGUMENTS_LEN {
            warn!(
                "Request 0x{:02X}/0x{:02X}: {} argument bytes exceed capacity",
                command_class,
                command_id,
                args.len()
            );
            return Err(ProtocolError::InvalidArgument(format!(
                "{} argument bytes exceed capacity ({ARGUMENTS_LEN})",
                args.len()
            )));
        }
        let mut report =
            Report::new(command_class, command_id, args.len() as u8).with_arguments(args);
        report.transaction_id = self.config.transaction_id;
        apply_checksum(&mut report);
        Ok(report)
    }

    /// Run one request/response exchange with the configured indices
    pub fn exchange(&self, request: &mut Report) -> Result<Report, ProtocolError> {
        let _guard = self.io_lock.lock();
        exchange::exchange(
            &self.transport,
            self.config.request_index,
            request,
            self.config.response_index,
            self.pacing(),
        )
    }

    /// Write a report without reading a reply
    pub fn send(&self, report: &Report) -> Result<(), ProtocolError> {
        let _guard = self.io_lock.lock();
        send_control_message(&self.transport, report, self.config.request_index, self.pacing())
    }

    /// Build, checksum and exchange a command in one step
    pub fn query(
        &self,
        command_class: u8,
        command_id: u8,
        args: &[u8],
    ) -> Result<Report, ProtocolError> {
        let mut request = self.build_request(command_class, command_id, args)?;
        debug!(
            "Query 0x{:02X}/0x{:02X} ({} arg bytes)",
            command_class,
            command_id,
            request.data_size
        );
        self.exchange(&mut request)
    }

    pub fn send_lighting_frame(
        &self,
        channel: u8,
        count: u8,
        color_data: &[u8],
    ) -> Result<(), ProtocolError> {
        let _guard = self.io_lock.lock();
        lighting::send_lighting_frame(&self.transport, channel, count, color_data)
    }

    pub fn send_lighting_colors(&self, channel: u8, colors: &[Rgb]) -> Result<(), ProtocolError> {
        let _guard = self.io_lock.lock();
        lighting::send_lighting_colors(&self.transport, channel, colors)
    }

    pub fn bulk_send(&self, data: &[u8]) -> (usize, Result<(), ProtocolError>) {
        let _guard = self.io_lock.lock();
        bulk::bulk_send(&self.transport, data)
    }

    pub fn bulk_receive(&self, buffer: &mut [u8]) -> (usize, Result<(), ProtocolError>) {
        let _guard = self.io_lock.lock();
        bulk::bulk_receive(&self.transport, buffer)
    }
}
