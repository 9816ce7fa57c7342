//! Host-side report protocol for Razer-style USB peripherals
//!
//! Keyboards, mice and lighting controllers in this family are driven with
//! 90-byte reports over control transfers:
//!
//! - fire-and-forget writes ([`send_control_message`])
//! - write-then-read exchanges ([`exchange`])
//! - addressable-LED frames ([`send_lighting_frame`])
//! - raw bulk traffic for headsets ([`bulk_send`], [`bulk_receive`])
//!
//! The USB capability is injected through [`razer_transport::UsbTransport`].
//! Free functions here hold no locks; [`DeviceSession`] serializes traffic
//! to one device.

pub mod bulk;
pub mod checksum;
pub mod config;
pub mod control;
pub mod error;
pub mod exchange;
pub mod lighting;
pub mod protocol;
pub mod report;
pub mod session;

mod scratch;

pub use bulk::{bulk_receive, bulk_send};
pub use checksum::{apply_checksum, compute_checksum, verify_checksum};
pub use config::ProtocolConfig;
pub use control::{send_control_message, send_control_message_legacy, Pacing};
pub use error::{ConfigError, ProtocolError};
pub use exchange::exchange;
pub use lighting::{send_lighting_colors, send_lighting_frame, LightingFrame, Rgb};
pub use report::{clamp_u16, clamp_u8, transaction, Report, Status};
pub use session::DeviceSession;

pub use razer_transport::{TransportError, UsbTransport};
