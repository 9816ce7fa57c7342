//! Protocol and configuration error types

use std::collections::TryReserveError;

use razer_transport::TransportError;
use thiserror::Error;

use crate::report::Report;

/// Errors from report, lighting and bulk operations
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Scratch buffer could not be reserved
    #[error("Scratch buffer allocation failed: {0}")]
    Allocation(#[from] TryReserveError),

    /// Transfer layer error
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Short write: expected {expected} bytes, transferred {actual}")]
    ShortWrite { expected: usize, actual: usize },

    /// Reply length mismatch; the reply as received is kept
    #[error("Short read: expected {expected} bytes, received {actual}")]
    ShortRead {
        expected: usize,
        actual: usize,
        response: Box<Report>,
    },

    /// Reply declared more argument bytes than the report holds
    ///
    /// `data_size` is the declared value; the carried response has already
    /// been clamped.
    #[error("Malformed response: data_size {data_size} exceeds argument capacity")]
    MalformedResponse { data_size: u8, response: Box<Report> },

    /// Caller-supplied value rejected before any transfer
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl ProtocolError {
    /// The reply carried by a shape error, if any
    pub fn response(&self) -> Option<&Report> {
        match self {
            ProtocolError::ShortRead { response, .. }
            | ProtocolError::MalformedResponse { response, .. } => Some(response),
            _ => None,
        }
    }

    /// Take ownership of the carried reply
    pub fn into_response(self) -> Option<Report> {
        match self {
            ProtocolError::ShortRead { response, .. }
            | ProtocolError::MalformedResponse { response, .. } => Some(*response),
            _ => None,
        }
    }
}

/// Errors loading or validating a [`crate::ProtocolConfig`]
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
