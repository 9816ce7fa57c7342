//! Addressable-LED (ARGB) frames
//!
//! A separate 320-byte record pushed with a single SET_REPORT at index 1.
//! Channels 0-4 use report id 0x04, channels 5 and up use 0x84.

use razer_transport::{ControlSetup, UsbTransport};
use tracing::{debug, warn};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::control::check_write;
use crate::error::ProtocolError;
use crate::protocol::{control, lighting};
use crate::scratch::ScratchBuffer;

/// Size of a lighting frame on the wire
pub const FRAME_LEN: usize = 5 + lighting::COLOR_CAPACITY;

/// One LED color as it appears on the wire
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, IntoBytes, FromBytes, KnownLayout, Immutable,
)]
#[repr(C)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);
}

/// Lighting frame for one channel
///
/// Fields are private so the capacity check in [`LightingFrame::new`] cannot
/// be bypassed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct LightingFrame {
    report_id: u8,
    channel_primary: u8,
    channel_secondary: u8,
    _pad: u8,
    last_index: u8,
    color_data: [u8; lighting::COLOR_CAPACITY],
}

const _: () = assert!(std::mem::size_of::<LightingFrame>() == FRAME_LEN);

impl LightingFrame {
    /// Build a frame for `count` LEDs from packed RGB triplets
    ///
    /// Returns `Err` if `count` is zero, if `count` LEDs don't fit in one
    /// frame, or if `color_data` holds fewer than `count * 3` bytes.
    pub fn new(channel: u8, count: u8, color_data: &[u8]) -> Result<Self, ProtocolError> {
        let len = count as usize * 3;
        if count == 0 {
            warn!("Lighting frame for channel {} has no LEDs", channel);
            return Err(ProtocolError::InvalidArgument(
                "LED count must be at least 1".into(),
            ));
        }
        if len > lighting::COLOR_CAPACITY {
            warn!("Lighting frame size too big: {} LEDs", count);
            return Err(ProtocolError::InvalidArgument(format!(
                "{count} LEDs exceed frame capacity ({})",
                lighting::MAX_LEDS
            )));
        }
        if color_data.len() < len {
            warn!(
                "Lighting frame needs {} color bytes, got {}",
                len,
                color_data.len()
            );
            return Err(ProtocolError::InvalidArgument(format!(
                "{count} LEDs need {len} color bytes, got {}",
                color_data.len()
            )));
        }

        let report_id = if channel < lighting::CHANNEL_SPLIT {
            lighting::REPORT_ID_LOW
        } else {
            lighting::REPORT_ID_HIGH
        };

        let mut frame = Self {
            report_id,
            channel_primary: channel,
            channel_secondary: channel,
            _pad: 0,
            last_index: count - 1,
            color_data: [0; lighting::COLOR_CAPACITY],
        };
        frame.color_data[..len].copy_from_slice(&color_data[..len]);
        Ok(frame)
    }

    /// Build a frame from typed colors
    pub fn from_colors(channel: u8, colors: &[Rgb]) -> Result<Self, ProtocolError> {
        let count = u8::try_from(colors.len()).map_err(|_| {
            ProtocolError::InvalidArgument(format!(
                "{} LEDs exceed frame capacity ({})",
                colors.len(),
                lighting::MAX_LEDS
            ))
        })?;
        Self::new(channel, count, colors.as_bytes())
    }

    pub fn report_id(&self) -> u8 {
        self.report_id
    }

    pub fn channel(&self) -> u8 {
        self.channel_primary
    }

    pub fn last_index(&self) -> u8 {
        self.last_index
    }

    pub fn led_count(&self) -> usize {
        self.last_index as usize + 1
    }

    /// The RGB bytes in use
    pub fn colors(&self) -> &[u8] {
        &self.color_data[..self.led_count() * 3]
    }
}

/// Build and send one lighting frame
///
/// Argument errors are returned before anything touches the transport.
pub fn send_lighting_frame<T: UsbTransport + ?Sized>(
    transport: &T,
    channel: u8,
    count: u8,
    color_data: &[u8],
) -> Result<(), ProtocolError> {
    let frame = LightingFrame::new(channel, count, color_data)?;
    send_frame(transport, &frame)
}

/// Typed form of [`send_lighting_frame`]
pub fn send_lighting_colors<T: UsbTransport + ?Sized>(
    transport: &T,
    channel: u8,
    colors: &[Rgb],
) -> Result<(), ProtocolError> {
    let frame = LightingFrame::from_colors(channel, colors)?;
    send_frame(transport, &frame)
}

/// Send an already-built frame
pub fn send_frame<T: UsbTransport + ?Sized>(
    transport: &T,
    frame: &LightingFrame,
) -> Result<(), ProtocolError> {
    let mut scratch = ScratchBuffer::duplicate(frame.as_bytes())?;
    let setup = ControlSetup::set_report(control::REPORT_VALUE, lighting::INDEX);
    debug!(
        "Lighting frame ch={} id=0x{:02X} leds={}",
        frame.channel(),
        frame.report_id(),
        frame.led_count()
    );

    let result = transport.control_transfer(setup, scratch.as_mut_slice(), control::TIMEOUT);
    drop(scratch);

    if let Ok(len) = result {
        if len != frame.led_count() {
            debug!(
                "Lighting frame transferred {} bytes for {} LEDs",
                len,
                frame.led_count()
            );
        }
    }
    check_write(result, FRAME_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use razer_transport::mock::{MockTransport, Reply};
    use razer_transport::TransportError;

    fn colors(count: usize) -> Vec<u8> {
        (0..count * 3).map(|i| i as u8).collect()
    }

    #[test]
    fn test_report_id_by_channel() {
        let low = LightingFrame::new(4, 10, &colors(10)).unwrap();
        assert_eq!(low.report_id(), 0x04);
        let high = LightingFrame::new(5, 10, &colors(10)).unwrap();
        assert_eq!(high.report_id(), 0x84);
        assert_eq!(LightingFrame::new(0, 1, &colors(1)).unwrap().report_id(), 0x04);
    }

    #[test]
    fn test_frame_layout() {
        let frame = LightingFrame::new(2, 3, &colors(3)).unwrap();
        let bytes = frame.as_bytes();
        assert_eq!(bytes.len(), FRAME_LEN);
        assert_eq!(&bytes[..5], &[0x04, 2, 2, 0, 2]);
        assert_eq!(&bytes[5..14], &[0, 1, 2, 3, 4, 5, 6, 7, 8]);
        assert!(bytes[14..].iter().all(|&b| b == 0));
        assert_eq!(frame.colors().len(), 9);
    }

    #[test]
    fn test_capacity_limit() {
        assert!(LightingFrame::new(0, lighting::MAX_LEDS as u8, &colors(lighting::MAX_LEDS)).is_ok());
        let err = LightingFrame::new(0, lighting::MAX_LEDS as u8 + 1, &colors(255)).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidArgument(_)));
    }

    #[test]
    fn test_short_color_data_rejected() {
        let err = LightingFrame::new(0, 4, &colors(3)).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidArgument(_)));
    }

    #[test]
    fn test_zero_count_rejected() {
        assert!(matches!(
            LightingFrame::new(0, 0, &[]),
            Err(ProtocolError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_send_uses_index_one() {
        let mock = MockTransport::new();
        send_lighting_frame(&mock, 6, 2, &[255, 0, 0, 0, 255, 0]).unwrap();

        let t = mock.last_transfer().unwrap();
        let setup = t.setup().unwrap();
        assert_eq!(setup.request_type, 0x21);
        assert_eq!(setup.request, 0x09);
        assert_eq!(setup.value, 0x300);
        assert_eq!(setup.index, 0x01);
        assert_eq!(t.data.len(), FRAME_LEN);
        assert_eq!(&t.data[..8], &[0x84, 6, 6, 0, 1, 255, 0, 0]);
    }

    #[test]
    fn test_oversized_payload_never_reaches_transport() {
        let mock = MockTransport::new();
        let err = send_lighting_frame(&mock, 0, 200, &colors(200)).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidArgument(_)));
        assert_eq!(mock.transfer_count(), 0);
    }

    #[test]
    fn test_short_transfer_is_short_write() {
        let mock = MockTransport::new();
        mock.queue_out(Reply::Transferred(10));
        let err = send_lighting_frame(&mock, 0, 10, &colors(10)).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::ShortWrite {
                expected: FRAME_LEN,
                actual: 10
            }
        ));
    }

    #[test]
    fn test_transport_failure() {
        let mock = MockTransport::new();
        mock.queue_out(Reply::Fail(TransportError::Timeout));
        let err = send_lighting_frame(&mock, 0, 1, &[1, 2, 3]).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::Transport(TransportError::Timeout)
        ));
    }

    #[test]
    fn test_typed_colors() {
        let mock = MockTransport::new();
        send_lighting_colors(&mock, 1, &[Rgb::WHITE, Rgb::new(1, 2, 3)]).unwrap();
        let t = mock.last_transfer().unwrap();
        assert_eq!(&t.data[4..11], &[1, 255, 255, 255, 1, 2, 3]);

        let too_many = vec![Rgb::BLACK; 300];
        assert!(matches!(
            send_lighting_colors(&mock, 1, &too_many),
            Err(ProtocolError::InvalidArgument(_))
        ));
        assert_eq!(mock.transfer_count(), 1);
    }
}
