use thiserror::Error;
use core::result::Result as CoreResult;

use crate::burst::BurstState;

pub type Result<T> = CoreResult<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Could not open serial device {port}: {source}")]
    Connection {
        port: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("Serial transport failed: {0}")]
    Transport(#[from] std::io::Error),
    #[error("Protocol violation: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("Cannot {operation} while controller is {state}")]
    IllegalState {
        operation: &'static str,
        state: BurstState,
    },
    #[error("Invalid burst configuration: {0}")]
    InvalidConfig(&'static str),
}

/// Reply from the breakout board did not match what the command expects
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ProtocolError {
    #[error("No acknowledgment for {command:?} within timeout")]
    MissingAck { command: String },
    #[error("No reply to {command:?} within timeout")]
    MissingReply { command: String },
    #[error("Could not parse frame metadata {0:?}")]
    MalformedMetadata(String),
    #[error("Could not parse pixel data: {0}")]
    MalformedPixelData(&'static str),
    #[error("Recieved a line that is not valid UTF-8")]
    InvalidUtf8,
    #[error("Frame has {actual} pixels, previous frames had {expected}")]
    PixelCountMismatch { expected: usize, actual: usize },
    #[error("Got pixel data after an empty metadata line")]
    UnexpectedPixelData,
}

impl Error {
    pub fn is_protocol(&self) -> bool {
        matches!(self, Error::Protocol(_))
    }
}
