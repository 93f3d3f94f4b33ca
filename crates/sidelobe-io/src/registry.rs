//! Interface lookup by name.

use std::net::SocketAddr;
use std::sync::Arc;

use sidelobe_types::Channel;

use crate::{LinkError, LoopbackTransceiver, Transceiver, UdpSettings, UdpTransceiver};

/// Construction-time settings shared by every interface.
#[derive(Debug, Clone)]
pub struct InterfaceOptions {
    pub channel: Channel,
    pub tx_addr: SocketAddr,
    pub rx_bind: Option<SocketAddr>,
    pub generate_phy: bool,
    pub generate_mac: bool,
    pub tx_gain: u32,
}

impl Default for InterfaceOptions {
    fn default() -> Self {
        let udp = UdpSettings::default();
        Self {
            channel: udp.channel,
            tx_addr: udp.tx_addr,
            rx_bind: udp.rx_bind,
            generate_phy: udp.generate_phy,
            generate_mac: udp.generate_mac,
            tx_gain: udp.tx_gain,
        }
    }
}

const NAMES: &[&str] = &["loopback", "udp"];

/// Registered interface names.
pub fn names() -> &'static [&'static str] {
    NAMES
}

/// Builds the interface registered under `name`, tuned to `options.channel`.
///
/// The interface is returned closed.
pub fn create(name: &str, options: &InterfaceOptions) -> Result<Arc<dyn Transceiver>, LinkError> {
    let link: Arc<dyn Transceiver> = match name {
        "loopback" => Arc::new(LoopbackTransceiver::new()),
        "udp" => Arc::new(UdpTransceiver::new(UdpSettings {
            tx_addr: options.tx_addr,
            rx_bind: options.rx_bind,
            generate_phy: options.generate_phy,
            generate_mac: options.generate_mac,
            channel: options.channel,
            tx_gain: options.tx_gain,
        })),
        _ => {
            return Err(LinkError::Unknown {
                name: name.to_string(),
            });
        }
    };
    link.set_channel(options.channel)?;
    Ok(link)
}
