//! Wire constants for the report, lighting and bulk protocols

use std::time::Duration;

/// Control transfer parameters shared by report and lighting traffic
pub mod control {
    use super::Duration;

    /// wValue for SET_REPORT/GET_REPORT (feature report, id 0)
    pub const REPORT_VALUE: u16 = 0x300;
    /// Timeout for a single control transfer
    pub const TIMEOUT: Duration = Duration::from_millis(5000);
    /// Report index used by most keyboards and mice
    pub const DEFAULT_INDEX: u16 = 0x02;
}

/// Delay between consecutive control transfers
///
/// The firmware drops or corrupts state when control transfers arrive
/// back-to-back.
pub mod timing {
    /// Default lower bound (µs)
    pub const WAIT_MIN_US: u64 = 600;
    /// Default upper bound (µs)
    pub const WAIT_MAX_US: u64 = 800;
}

/// Bulk endpoints for the headset family
pub mod bulk {
    use super::Duration;

    pub const OUT_ENDPOINT: u8 = 0x06;
    pub const IN_ENDPOINT: u8 = 0x86;
    pub const TIMEOUT: Duration = Duration::from_millis(1000);
}

/// Addressable-LED frame constants
pub mod lighting {
    /// Control transfer index for lighting frames
    pub const INDEX: u16 = 0x01;
    /// Report id for channels below [`CHANNEL_SPLIT`]
    pub const REPORT_ID_LOW: u8 = 0x04;
    /// Report id for channels at or above [`CHANNEL_SPLIT`]
    pub const REPORT_ID_HIGH: u8 = 0x84;
    /// First channel that uses [`REPORT_ID_HIGH`]
    pub const CHANNEL_SPLIT: u8 = 5;
    /// Color payload capacity in bytes (105 RGB triplets)
    pub const COLOR_CAPACITY: usize = 315;
    /// Maximum LEDs in one frame
    pub const MAX_LEDS: usize = COLOR_CAPACITY / 3;
}
