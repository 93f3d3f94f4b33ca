//! # sidelobe-io: Transmit/receive interfaces
//!
//! The radio side of a fuzzing run. Everything above this crate talks to a
//! [`Transceiver`] and never to a device:
//!
//! - **`LoopbackTransceiver`**: in-memory echo with pluggable echo faults,
//!   used to exercise harnesses and the orchestrator without hardware
//! - **`UdpTransceiver`**: datagrams to and from an SDR flowgraph
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────┐
//! │  orchestrator  │   harness   │
//! │   (transmit)   │ (receive)   │
//! └───────┬────────┴──────┬──────┘
//!         │  Transceiver  │
//! ┌───────┴───────────────┴──────┐
//! │         sidelobe-io          │
//! │  ┌──────────┐  ┌──────────┐  │
//! │  │ Loopback │  │   UDP    │  │
//! │  └──────────┘  └──────────┘  │
//! └──────────────────────────────┘
//! ```

mod error;
mod loopback;
mod registry;
mod transceiver;
mod udp;

pub use error::LinkError;
pub use loopback::{CorruptEveryNth, EchoFault, LoopbackTransceiver};
pub use registry::{InterfaceOptions, create, names};
pub use transceiver::{InterfaceStatus, Transceiver};
pub use udp::{UdpSettings, UdpTransceiver};

#[cfg(test)]
mod tests;
