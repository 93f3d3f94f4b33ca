//! Interface error types.

use std::net::SocketAddr;

use sidelobe_codec::OversizedFrame;
use sidelobe_types::InvalidChannel;

/// Errors from a transmit/receive interface.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// Underlying socket or device I/O error.
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// The interface has not been opened.
    #[error("interface {interface} is not open")]
    NotOpen { interface: &'static str },

    /// The interface does not implement an operation.
    #[error("interface {interface} does not support {operation}")]
    Unsupported {
        interface: &'static str,
        operation: &'static str,
    },

    /// No interface is registered under this name.
    #[error("unknown interface: {name}")]
    Unknown { name: String },

    /// A frame could not be composed for the wire.
    #[error(transparent)]
    Framing(#[from] OversizedFrame),

    #[error(transparent)]
    Channel(#[from] InvalidChannel),

    /// The device reported a failure.
    #[error("interface {interface}: {reason}")]
    Device {
        interface: &'static str,
        reason: String,
    },

    #[error("no receive address configured for {interface}")]
    NoReceiveAddress { interface: &'static str },

    #[error("cannot bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
}

impl LinkError {
    pub(crate) fn unsupported(interface: &'static str, operation: &'static str) -> Self {
        Self::Unsupported {
            interface,
            operation,
        }
    }
}
