//! Fire-and-forget control transfers
//!
//! One SET_REPORT per call, followed by a mandatory settle delay.

use std::ops::RangeInclusive;
use std::time::Duration;

use rand::Rng;
use razer_transport::{ControlSetup, TransportError, UsbTransport};
use tracing::{debug, warn};
use zerocopy::IntoBytes;

use crate::error::ProtocolError;
use crate::protocol::{control, timing};
use crate::report::Report;
use crate::scratch::ScratchBuffer;

/// Settle delay applied after every report write
///
/// The actual delay is drawn uniformly from `[min, max]`. An inverted range
/// collapses to `min`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub min: Duration,
    pub max: Duration,
}

impl Pacing {
    /// No delay at all
    pub const NONE: Pacing = Pacing {
        min: Duration::ZERO,
        max: Duration::ZERO,
    };

    pub fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    /// Pacing from microsecond bounds
    pub fn from_micros(min_us: u64, max_us: u64) -> Self {
        Self::new(Duration::from_micros(min_us), Duration::from_micros(max_us))
    }

    fn range_us(&self) -> RangeInclusive<u64> {
        let min = self.min.as_micros() as u64;
        let max = (self.max.as_micros() as u64).max(min);
        min..=max
    }

    /// Pick the delay for one transfer
    pub fn sample(&self) -> Duration {
        let range = self.range_us();
        if range.start() == range.end() {
            return Duration::from_micros(*range.start());
        }
        Duration::from_micros(rand::thread_rng().gen_range(range))
    }

    /// Block the calling thread for one sampled delay
    pub fn wait(&self) {
        let delay = self.sample();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::from_micros(timing::WAIT_MIN_US, timing::WAIT_MAX_US)
    }
}

/// Check a completed write against the length the caller asked for
pub(crate) fn check_write(
    result: Result<usize, TransportError>,
    expected: usize,
) -> Result<(), ProtocolError> {
    match result {
        Ok(len) if len == expected => Ok(()),
        Ok(len) => {
            warn!(
                "Device data transfer failed: wrote {} of {} bytes",
                len, expected
            );
            Err(ProtocolError::ShortWrite {
                expected,
                actual: len,
            })
        }
        Err(e) => {
            warn!("Device data transfer failed: {}", e);
            Err(ProtocolError::Transport(e))
        }
    }
}

/// Write one report with SET_REPORT at `report_index`
///
/// The report is copied into a scratch buffer for the transfer. The pacing
/// delay runs after the transfer whether or not it succeeded.
pub fn send_control_message<T: UsbTransport + ?Sized>(
    transport: &T,
    report: &Report,
    report_index: u16,
    pacing: Pacing,
) -> Result<(), ProtocolError> {
    send_raw(
        transport,
        report.as_bytes(),
        control::REPORT_VALUE,
        report_index,
        pacing,
    )
}

/// Write `size` bytes of `data` with explicit wValue/wIndex
///
/// For older devices whose reports don't follow the 90-byte layout.
pub fn send_control_message_legacy<T: UsbTransport + ?Sized>(
    transport: &T,
    data: &[u8],
    value: u16,
    index: u16,
    size: usize,
    pacing: Pacing,
) -> Result<(), ProtocolError> {
    let payload = data.get(..size).ok_or_else(|| {
        warn!(
            "Legacy control message: size {} exceeds payload of {} bytes",
            size,
            data.len()
        );
        ProtocolError::InvalidArgument(format!(
            "size {size} exceeds payload length {}",
            data.len()
        ))
    })?;
    send_raw(transport, payload, value, index, pacing)
}

fn send_raw<T: UsbTransport + ?Sized>(
    transport: &T,
    payload: &[u8],
    value: u16,
    index: u16,
    pacing: Pacing,
) -> Result<(), ProtocolError> {
    let mut scratch = ScratchBuffer::duplicate(payload)?;
    let setup = ControlSetup::set_report(value, index);
    debug!("SET_REPORT {}: {:02X?}", setup, &payload[..payload.len().min(8)]);

    let result = transport.control_transfer(setup, scratch.as_mut_slice(), control::TIMEOUT);
    pacing.wait();
    drop(scratch);

    check_write(result, payload.len())
}
