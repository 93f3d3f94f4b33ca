//! # sidelobe-codec: IEEE 802.15.4 frame codec
//!
//! Turns structural MAC frame fields into wire bytes and back. Generators
//! call [`PacketCodec::encode`]; validity-checking generators also call
//! [`PacketCodec::decode`] to discard encodings the codec itself rejects.
//!
//! ```text
//! ┌────────────┐  encode   ┌───────────────────────────┐
//! │  MacFrame  │ ────────► │ fcf seq addrs payload fcs │
//! │            │ ◄──────── │                           │
//! └────────────┘  decode   └───────────────────────────┘
//!                                     │ phy::with_sync_header / phy::ppdu
//!                                     ▼
//!                          [preamble][A7][len][psdu]
//! ```

pub mod crc;
mod error;
mod frame;
pub mod phy;

use bytes::Bytes;

pub use error::{DecodeError, OversizedFrame};
pub use frame::{Address, BEACON_REQUEST, BROADCAST_PAN, FrameControl, FrameType, MacFrame};

/// Encode/decode service for MAC frames.
///
/// Implementations must be pure: the same frame always encodes to the same
/// bytes.
pub trait PacketCodec: Send + Sync {
    /// Serializes a frame, FCS included.
    fn encode(&self, frame: &MacFrame) -> Bytes;

    /// Parses and validates a frame, FCS included.
    fn decode(&self, bytes: &[u8]) -> Result<MacFrame, DecodeError>;
}

/// The standard 2006-revision MAC codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dot15d4Codec;

impl PacketCodec for Dot15d4Codec {
    fn encode(&self, frame: &MacFrame) -> Bytes {
        frame.to_bytes()
    }

    fn decode(&self, bytes: &[u8]) -> Result<MacFrame, DecodeError> {
        MacFrame::from_bytes(bytes)
    }
}
