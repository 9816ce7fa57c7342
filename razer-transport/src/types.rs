//! Common types for the transfer layer

use std::fmt;

/// HID class request codes (bRequest)
pub mod request {
    /// HID GET_REPORT
    pub const GET_REPORT: u8 = 0x01;
    /// HID SET_REPORT
    pub const SET_REPORT: u8 = 0x09;
}

/// bmRequestType values used by the report protocol
pub mod request_type {
    /// Direction bit: device-to-host
    pub const DIR_IN: u8 = 0x80;
    /// Class request addressed to an interface
    pub const CLASS_INTERFACE: u8 = 0x21;
    /// Class | interface | host-to-device
    pub const CLASS_INTERFACE_OUT: u8 = CLASS_INTERFACE;
    /// Class | interface | device-to-host
    pub const CLASS_INTERFACE_IN: u8 = CLASS_INTERFACE | DIR_IN;
}

/// Transfer direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Host-to-device
    Out,
    /// Device-to-host
    In,
}

impl Direction {
    /// Direction encoded in bit 7 of a bmRequestType or endpoint address
    pub fn from_bit7(byte: u8) -> Self {
        if byte & request_type::DIR_IN != 0 {
            Direction::In
        } else {
            Direction::Out
        }
    }
}

/// Setup stage of a control transfer (wLength is the buffer length)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlSetup {
    pub request_type: u8,
    pub request: u8,
    pub value: u16,
    pub index: u16,
}

impl ControlSetup {
    /// Class/interface SET_REPORT (host-to-device)
    pub fn set_report(value: u16, index: u16) -> Self {
        Self {
            request_type: request_type::CLASS_INTERFACE_OUT,
            request: request::SET_REPORT,
            value,
            index,
        }
    }

    /// Class/interface GET_REPORT (device-to-host)
    pub fn get_report(value: u16, index: u16) -> Self {
        Self {
            request_type: request_type::CLASS_INTERFACE_IN,
            request: request::GET_REPORT,
            value,
            index,
        }
    }

    pub fn direction(&self) -> Direction {
        Direction::from_bit7(self.request_type)
    }
}

impl fmt::Display for ControlSetup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bmRequestType=0x{:02X} bRequest=0x{:02X} wValue=0x{:04X} wIndex=0x{:04X}",
            self.request_type, self.request, self.value, self.index
        )
    }
}
