//! The 90-byte control-transfer report
//!
//! Wire layout (all single bytes unless noted):
//!
//! ```text
//!  0      status
//!  1      transaction_id
//!  2..4   remaining_packets   (big-endian u16)
//!  4      protocol_type
//!  5      data_size
//!  6      command_class
//!  7      command_id
//!  8..88  arguments           (80 bytes)
//!  88     checksum            (XOR of bytes 2..88)
//!  89     reserved
//! ```

use std::fmt;

use tracing::warn;
use zerocopy::{FromBytes, FromZeros, Immutable, IntoBytes, KnownLayout};

/// Total size of one report on the wire
pub const REPORT_LEN: usize = 90;
/// Capacity of the argument payload
pub const ARGUMENTS_LEN: usize = 80;
/// Offset of the checksum byte
pub const CHECKSUM_OFFSET: usize = 88;
/// Number of argument bytes printed by the diagnostic formatter
const DIAGNOSTIC_ARGS: usize = 16;

/// Transaction id helpers
///
/// The byte is split into a 3-bit device selector (high bits) and a 5-bit
/// id. `0x00` is never valid on the wire.
pub mod transaction {
    /// Substituted for a zero transaction id before transmission
    pub const FALLBACK: u8 = 0xFF;

    /// Compose a transaction id from device selector and id
    pub fn compose(device: u8, id: u8) -> u8 {
        ((device & 0x07) << 5) | (id & 0x1F)
    }

    /// Device selector (high 3 bits)
    pub fn device(transaction_id: u8) -> u8 {
        transaction_id >> 5
    }

    /// Id part (low 5 bits)
    pub fn id(transaction_id: u8) -> u8 {
        transaction_id & 0x1F
    }
}

/// Device-reported result code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Request not yet processed (always the value sent by the host)
    New,
    Busy,
    Successful,
    Failure,
    Timeout,
    NotSupported,
    Unknown(u8),
}

impl From<u8> for Status {
    fn from(value: u8) -> Self {
        match value {
            0x00 => Status::New,
            0x01 => Status::Busy,
            0x02 => Status::Successful,
            0x03 => Status::Failure,
            0x04 => Status::Timeout,
            0x05 => Status::NotSupported,
            other => Status::Unknown(other),
        }
    }
}

impl From<Status> for u8 {
    fn from(status: Status) -> Self {
        match status {
            Status::New => 0x00,
            Status::Busy => 0x01,
            Status::Successful => 0x02,
            Status::Failure => 0x03,
            Status::Timeout => 0x04,
            Status::NotSupported => 0x05,
            Status::Unknown(other) => other,
        }
    }
}

/// One protocol transaction
///
/// Constructed fresh per request; nothing about it outlives the exchange.
/// `data_size` is public so callers can build requests freely, which also
/// means a reply may carry a value larger than [`ARGUMENTS_LEN`].
/// [`Report::arguments_used`] never reads past the array regardless.
#[derive(Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct Report {
    pub status: u8,
    pub transaction_id: u8,
    remaining_packets: [u8; 2],
    pub protocol_type: u8,
    pub data_size: u8,
    pub command_class: u8,
    pub command_id: u8,
    pub arguments: [u8; ARGUMENTS_LEN],
    pub checksum: u8,
    pub reserved: u8,
}

const _: () = assert!(std::mem::size_of::<Report>() == REPORT_LEN);

impl Report {
    /// Zeroed report with class, id and data size set
    pub fn new(command_class: u8, command_id: u8, data_size: u8) -> Self {
        let mut report = Self::empty();
        report.command_class = command_class;
        report.command_id = command_id;
        report.data_size = data_size;
        report
    }

    /// Fully zeroed report
    pub fn empty() -> Self {
        Self::new_zeroed()
    }

    /// Parse a report from exactly [`REPORT_LEN`] bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        Self::read_from_bytes(bytes).ok()
    }

    /// Serialized form
    pub fn to_bytes(&self) -> [u8; REPORT_LEN] {
        let mut out = [0u8; REPORT_LEN];
        out.copy_from_slice(self.as_bytes());
        out
    }

    /// Builder form of [`Report::set_arguments`]
    pub fn with_arguments(mut self, args: &[u8]) -> Self {
        self.set_arguments(args);
        self
    }

    /// Copy `args` into the start of the argument array
    ///
    /// Bytes past [`ARGUMENTS_LEN`] are dropped. `data_size` is left alone.
    ///
    /// # Returns
    /// Number of bytes copied
    pub fn set_arguments(&mut self, args: &[u8]) -> usize {
        let len = args.len().min(ARGUMENTS_LEN);
        self.arguments[..len].copy_from_slice(&args[..len]);
        len
    }

    /// The argument bytes covered by `data_size`, capped at capacity
    pub fn arguments_used(&self) -> &[u8] {
        let len = (self.data_size as usize).min(ARGUMENTS_LEN);
        &self.arguments[..len]
    }

    pub fn remaining_packets(&self) -> u16 {
        u16::from_be_bytes(self.remaining_packets)
    }

    pub fn set_remaining_packets(&mut self, remaining: u16) {
        self.remaining_packets = remaining.to_be_bytes();
    }

    pub fn status(&self) -> Status {
        Status::from(self.status)
    }

    /// Whether the command id has the device-to-host bit set
    pub fn is_query(&self) -> bool {
        self.command_id & 0x80 != 0
    }

    /// Emit this report as a warning tagged with the driver name
    pub fn log_erroneous(&self, driver: &str, message: &str) {
        warn!("{}", self.erroneous_message(driver, message));
    }

    /// Text logged by [`Report::log_erroneous`]
    pub fn erroneous_message(&self, driver: &str, message: &str) -> String {
        format!("{driver}: {message}. {self}")
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "status: {:02x} transaction_id: {:02x} remaining_packets: {:02x} \
             protocol_type: {:02x} data_size: {:02x}, command_class: {:02x}, \
             command_id: {:02x} params: ",
            self.status,
            self.transaction_id,
            self.remaining_packets(),
            self.protocol_type,
            self.data_size,
            self.command_class,
            self.command_id,
        )?;
        for b in &self.arguments[..DIAGNOSTIC_ARGS] {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Report")
            .field("status", &self.status())
            .field("transaction_id", &format_args!("0x{:02X}", self.transaction_id))
            .field("remaining_packets", &self.remaining_packets())
            .field("protocol_type", &self.protocol_type)
            .field("data_size", &self.data_size)
            .field("command_class", &format_args!("0x{:02X}", self.command_class))
            .field("command_id", &format_args!("0x{:02X}", self.command_id))
            .field("arguments", &format_args!("{:02X?}", self.arguments_used()))
            .field("checksum", &format_args!("0x{:02X}", self.checksum))
            .finish()
    }
}

/// Clamp without panicking on an inverted range (upper bound wins)
pub fn clamp_u8(value: u8, min: u8, max: u8) -> u8 {
    if value > max {
        max
    } else if value < min {
        min
    } else {
        value
    }
}

/// Clamp without panicking on an inverted range (upper bound wins)
pub fn clamp_u16(value: u16, min: u16, max: u16) -> u16 {
    if value > max {
        max
    } else if value < min {
        min
    } else {
        value
    }
}
