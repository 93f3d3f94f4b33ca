//! UDP datagram interface for an SDR flowgraph.
//!
//! Each transmitted frame becomes one datagram sent to `tx_addr`, where a
//! headerless O-QPSK transmitter puts it on the air unchanged. Depending on
//! the generator in use, the interface composes the layers the case bytes
//! lack:
//!
//! | `generate_phy` | `generate_mac` | On the wire |
//! |---|---|---|
//! | false | false | case bytes as-is |
//! | true | false | preamble, SFD, length, case bytes (FCS already present) |
//! | true | true | preamble, SFD, length + 2, case bytes, FCS |
//! | false | true | unsupported |
//!
//! Reception is available when `rx_bind` is set: datagrams arriving on that
//! address are received frames.

use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::sync::{Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use sidelobe_codec::{crc, phy};
use sidelobe_types::Channel;
use tracing::{debug, info};

use crate::{InterfaceStatus, LinkError, Transceiver};

const NAME: &str = "udp";

/// Largest datagram read from the receive socket.
const MAX_DATAGRAM: usize = 2048;

/// Settings for [`UdpTransceiver`].
#[derive(Debug, Clone)]
pub struct UdpSettings {
    pub tx_addr: SocketAddr,
    pub rx_bind: Option<SocketAddr>,
    pub generate_phy: bool,
    pub generate_mac: bool,
    pub channel: Channel,
    pub tx_gain: u32,
}

impl Default for UdpSettings {
    fn default() -> Self {
        Self {
            tx_addr: SocketAddr::from(([127, 0, 0, 1], 52001)),
            rx_bind: None,
            generate_phy: false,
            generate_mac: false,
            channel: Channel::default(),
            tx_gain: 50,
        }
    }
}

struct Sockets {
    tx: UdpSocket,
    rx: Option<UdpSocket>,
}

struct State {
    sockets: Option<Sockets>,
    receiving: bool,
    channel: Channel,
}

/// UDP transceiver. See the module documentation.
pub struct UdpTransceiver {
    settings: UdpSettings,
    state: Mutex<State>,
}

impl UdpTransceiver {
    pub fn new(settings: UdpSettings) -> Self {
        let channel = settings.channel;
        Self {
            settings,
            state: Mutex::new(State {
                sockets: None,
                receiving: false,
                channel,
            }),
        }
    }

    pub fn settings(&self) -> &UdpSettings {
        &self.settings
    }

    /// Address the receive socket is bound to, once open.
    pub fn local_rx_addr(&self) -> Option<SocketAddr> {
        let state = self.state();
        let rx = state.sockets.as_ref()?.rx.as_ref()?;
        rx.local_addr().ok()
    }

    /// Composes the datagram for one frame.
    pub fn compose(&self, frame: &[u8]) -> Result<Vec<u8>, LinkError> {
        match (self.settings.generate_phy, self.settings.generate_mac) {
            (false, false) => Ok(frame.to_vec()),
            (true, false) => Ok(phy::ppdu(frame)?),
            (true, true) => {
                let mut psdu = frame.to_vec();
                crc::append_fcs(&mut psdu);
                Ok(phy::ppdu(&psdu)?)
            }
            (false, true) => Err(LinkError::unsupported(NAME, "MAC framing without PHY framing")),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for UdpTransceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpTransceiver")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

fn bind(addr: SocketAddr) -> Result<UdpSocket, LinkError> {
    UdpSocket::bind(addr).map_err(|source| LinkError::Bind { addr, source })
}

impl Transceiver for UdpTransceiver {
    fn name(&self) -> &'static str {
        NAME
    }

    fn open(&self) -> Result<(), LinkError> {
        let mut state = self.state();
        if state.sockets.is_some() {
            return Ok(());
        }
        let unspecified = if self.settings.tx_addr.is_ipv4() {
            SocketAddr::from(([0, 0, 0, 0], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };
        let tx = bind(unspecified)?;
        let rx = match self.settings.rx_bind {
            Some(addr) => {
                let socket = bind(addr)?;
                socket.set_nonblocking(true)?;
                Some(socket)
            }
            None => None,
        };
        info!(tx = %self.settings.tx_addr, rx = ?self.settings.rx_bind, "udp interface open");
        state.sockets = Some(Sockets { tx, rx });
        Ok(())
    }

    fn close(&self) -> Result<(), LinkError> {
        let mut state = self.state();
        state.sockets = None;
        state.receiving = false;
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.state().sockets.is_some()
    }

    fn transmit(&self, frame: &[u8]) -> Result<bool, LinkError> {
        let datagram = self.compose(frame)?;
        let state = self.state();
        let Some(sockets) = state.sockets.as_ref() else {
            return Ok(false);
        };
        let sent = sockets.tx.send_to(&datagram, self.settings.tx_addr)?;
        debug!(len = sent, "datagram sent");
        Ok(sent == datagram.len())
    }

    /// Records the channel. Tuning happens in the flowgraph.
    fn set_channel(&self, channel: Channel) -> Result<(), LinkError> {
        self.state().channel = channel;
        Ok(())
    }

    fn channel(&self) -> Option<Channel> {
        Some(self.state().channel)
    }

    fn status(&self) -> InterfaceStatus {
        let state = self.state();
        InterfaceStatus {
            name: NAME.to_string(),
            driver: format!("udp:{}", self.settings.tx_addr),
            running: state.sockets.is_some(),
            channel: Some(state.channel),
            freq_hz: Some(state.channel.frequency_hz()),
            tx_gain: Some(self.settings.tx_gain),
        }
    }

    fn supports_receive(&self) -> bool {
        self.settings.rx_bind.is_some()
    }

    fn rx_start(&self) -> Result<(), LinkError> {
        if self.settings.rx_bind.is_none() {
            return Err(LinkError::NoReceiveAddress { interface: NAME });
        }
        let mut state = self.state();
        if state.sockets.is_none() {
            return Err(LinkError::NotOpen { interface: NAME });
        }
        state.receiving = true;
        Ok(())
    }

    fn rx_stop(&self) -> Result<(), LinkError> {
        self.state().receiving = false;
        Ok(())
    }

    fn receive_nonblocking(&self) -> Result<Option<Bytes>, LinkError> {
        let state = self.state();
        let sockets = state
            .sockets
            .as_ref()
            .ok_or(LinkError::NotOpen { interface: NAME })?;
        let rx = sockets
            .rx
            .as_ref()
            .ok_or(LinkError::NoReceiveAddress { interface: NAME })?;

        let mut buf = [0u8; MAX_DATAGRAM];
        loop {
            match rx.recv_from(&mut buf) {
                // Datagrams that arrive while the receiver is stopped are discarded.
                Ok((_, _)) if !state.receiving => {}
                Ok((len, _)) => return Ok(Some(Bytes::copy_from_slice(&buf[..len]))),
                Err(e) if e.kind() == ErrorKind::WouldBlock => return Ok(None),
                Err(e) => return Err(e.into()),
            }
        }
    }
}
