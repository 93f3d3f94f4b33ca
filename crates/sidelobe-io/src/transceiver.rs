//! Transceiver trait.
//!
//! The [`Transceiver`] trait is the only view the harness and orchestrator
//! have of a radio. Framing is the implementation's business: callers hand
//! over the case bytes and get back whatever the receive path captured.
//!
//! Methods take `&self` so one interface can be shared between the
//! orchestrator thread and a harness poller thread behind an `Arc`.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use sidelobe_types::Channel;

use crate::LinkError;

/// Point-in-time description of an interface, recorded in result sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceStatus {
    pub name: String,
    pub driver: String,
    pub running: bool,
    pub channel: Option<Channel>,
    /// Centre frequency of `channel`, in Hz.
    pub freq_hz: Option<u64>,
    pub tx_gain: Option<u32>,
}

/// Abstraction over a frame transmitter with optional reception.
///
/// Receive support is a capability settled at construction time and
/// reported by [`Transceiver::supports_receive`]. The receive methods
/// default to [`LinkError::Unsupported`].
pub trait Transceiver: Send + Sync {
    /// Registry name.
    fn name(&self) -> &'static str;

    /// Starts the interface. Opening an open interface is a no-op.
    fn open(&self) -> Result<(), LinkError>;

    /// Stops the interface. Closing a closed interface is a no-op.
    fn close(&self) -> Result<(), LinkError>;

    fn is_running(&self) -> bool;

    /// Sends one frame.
    ///
    /// Returns `Ok(false)` when the interface accepted the call but did not
    /// put the frame on the air (for example, because it is not running).
    fn transmit(&self, frame: &[u8]) -> Result<bool, LinkError>;

    fn set_channel(&self, channel: Channel) -> Result<(), LinkError>;

    fn channel(&self) -> Option<Channel>;

    fn status(&self) -> InterfaceStatus;

    fn supports_receive(&self) -> bool {
        false
    }

    /// Enables the receiver.
    fn rx_start(&self) -> Result<(), LinkError> {
        Err(LinkError::unsupported(self.name(), "rx_start"))
    }

    /// Disables the receiver.
    fn rx_stop(&self) -> Result<(), LinkError> {
        Err(LinkError::unsupported(self.name(), "rx_stop"))
    }

    /// Returns the next received frame, or `None` if nothing is waiting.
    ///
    /// Never blocks.
    fn receive_nonblocking(&self) -> Result<Option<Bytes>, LinkError> {
        Err(LinkError::unsupported(self.name(), "receive"))
    }
}
